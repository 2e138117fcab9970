//! BitOS terminal entry point.
//!
//! Reads one line at a time from stdin, runs it through a [`Shell`], and
//! prints the result. The config path comes from the first CLI argument or
//! `BITOS_CONFIG`; without either the defaults apply.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use bitos_terminal::{CLEAR_SENTINEL, JsonFileStore, SessionStore, Shell};
use bitos_types::config::TerminalConfig;

/// ANSI sequence a real terminal understands for "clear and home".
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const BANNER: &str = "\x1b[1;32mBitOS\x1b[0m terminal. Type 'help' for a list of commands, Ctrl-D to quit.";

fn load_config() -> Result<TerminalConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BITOS_CONFIG").ok())
        .map(PathBuf::from);
    match path {
        Some(path) => TerminalConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(TerminalConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = load_config()?;
    log::info!("Starting BitOS as {}@{}", config.user, config.hostname);

    let mut shell = Shell::new(&config);
    let mut store = config.session_file.as_ref().map(JsonFileStore::new);
    if let Some(store) = &store {
        // A corrupt session file should not keep the terminal from starting.
        match store.load() {
            Ok(Some(saved)) => shell.restore(saved),
            Ok(None) => {},
            Err(e) => log::warn!("ignoring saved session: {e}"),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{BANNER}")?;
    loop {
        write!(stdout, "{}", shell.prompt())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }

        let output = shell.execute(&line);
        if output == CLEAR_SENTINEL {
            write!(stdout, "{CLEAR_SCREEN}")?;
        } else if !output.is_empty() {
            writeln!(stdout, "{output}")?;
        }

        if let Some(store) = store.as_mut()
            && let Err(e) = store.save(&shell.snapshot())
        {
            log::warn!("failed to save session: {e}");
        }
    }

    log::info!("BitOS shutting down");
    Ok(())
}
