//! The `execute(line) -> String` facade front ends talk to.

use bitos_types::config::TerminalConfig;
use bitos_types::error::{BitosError, ErrorKind, Result};
use bitos_vfs::path::HOME;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::commands::register_builtins;
use crate::interpreter::{CommandOutput, CommandRegistry, Environment};
use crate::services::{Clock, Latency, NoLatency, RealLatency, SystemClock};
use crate::session::Session;
use crate::store::SavedSession;

/// Simulated uptime at start-up: 3 days, 4 hours, 12 minutes.
const BOOT_OFFSET_SECS: u64 = 3 * 86_400 + 4 * 3_600 + 12 * 60;

/// A terminal: registry, session, and the services commands run against.
pub struct Shell {
    registry: CommandRegistry,
    session: Session,
    clock: Box<dyn Clock>,
    latency: Box<dyn Latency>,
    rng: StdRng,
    hostname: String,
    user: String,
}

impl Shell {
    /// Shell with the real clock and the latency described by `config`.
    pub fn new(config: &TerminalConfig) -> Self {
        let latency: Box<dyn Latency> = if config.latency.enabled {
            Box::new(RealLatency::new(config.latency.scale))
        } else {
            Box::new(NoLatency)
        };
        Self::with_services(
            config,
            Box::new(SystemClock::booted_ago(BOOT_OFFSET_SECS)),
            latency,
        )
    }

    /// Shell with explicit clock and latency services.
    pub fn with_services(
        config: &TerminalConfig,
        clock: Box<dyn Clock>,
        latency: Box<dyn Latency>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry);
        log::info!(
            "shell ready: {} commands, host {}",
            registry.list_commands().len(),
            config.hostname
        );
        Self {
            registry,
            session: Session::new(config.history_limit),
            clock,
            latency,
            rng,
            hostname: config.hostname.clone(),
            user: config.user.clone(),
        }
    }

    /// Run one line and render the result. Never fails: errors come back
    /// as the line a shell would print.
    pub fn execute(&mut self, line: &str) -> String {
        let line = line.trim();
        if line.is_empty() {
            return String::new();
        }
        self.session.push_history(line);
        match self.run(line) {
            Ok(output) => output.render(),
            Err(e) => render_error(&e),
        }
    }

    /// Run one line without recording history or rendering.
    pub fn run(&mut self, line: &str) -> Result<CommandOutput> {
        let (cwd, vfs, history) = self.session.parts();
        let mut env = Environment {
            cwd,
            vfs,
            history,
            clock: self.clock.as_ref(),
            latency: self.latency.as_ref(),
            rng: &mut self.rng,
            hostname: &self.hostname,
            user: &self.user,
            program: String::new(),
        };
        self.registry.execute(line, &mut env)
    }

    /// Prompt in the usual `user@host:dir$ ` form, with home shown as `~`.
    pub fn prompt(&self) -> String {
        let cwd = self.session.cwd().as_str();
        let shown = match cwd.strip_prefix(HOME) {
            Some("") => "~".to_string(),
            Some(rest) if rest.starts_with('/') => format!("~{rest}"),
            _ => cwd.to_string(),
        };
        format!("{}@{}:{shown}$ ", self.user, self.hostname)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SavedSession {
        self.session.snapshot()
    }

    pub fn restore(&mut self, saved: SavedSession) {
        self.session.restore(saved);
    }
}

/// Shell errors print as-is; anything else is flagged as an internal error.
fn render_error(e: &BitosError) -> String {
    match e.kind() {
        ErrorKind::Internal => {
            log::warn!("command failed: {e}");
            format!("Error: {e}")
        },
        _ => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::CLEAR_SENTINEL;
    use crate::testing;

    #[test]
    fn empty_line_is_empty_output() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute(""), "");
        assert_eq!(sh.execute("   "), "");
        assert!(sh.session().history().is_empty());
    }

    #[test]
    fn unknown_command_message() {
        let mut sh = testing::shell();
        let out = sh.execute("bogus");
        assert_eq!(
            out,
            "Command not found: bogus. Type 'help' for a list of available commands."
        );
    }

    #[test]
    fn clear_is_sentinel() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("clear"), CLEAR_SENTINEL);
        assert_eq!(sh.execute("CLS"), "\x1Bc");
    }

    #[test]
    fn walkthrough_scenario() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("pwd"), "/home/user");
        assert_eq!(sh.execute("mkdir demo"), "");
        assert_eq!(sh.execute("cd demo"), "");
        assert_eq!(sh.execute("pwd"), "/home/user/demo");
        sh.execute("touch notes.txt hello");
        assert_eq!(sh.execute("cat notes.txt"), "hello");
        sh.execute("cd ..");
        assert!(sh.execute("ls").contains("demo/"));
    }

    #[test]
    fn errors_render_as_shell_lines() {
        let mut sh = testing::shell();
        assert_eq!(
            sh.execute("cd nowhere"),
            "cd: nowhere: No such file or directory"
        );
        sh.execute("mkdir demo");
        assert_eq!(
            sh.execute("mkdir demo"),
            "mkdir: cannot create directory 'demo': File exists"
        );
    }

    #[test]
    fn internal_errors_are_prefixed() {
        let e = BitosError::Config("broken".into());
        assert_eq!(render_error(&e), "Error: config error: broken");
        let e = BitosError::NotFound("x".into());
        assert_eq!(render_error(&e), "x: No such file or directory");
    }

    #[test]
    fn history_is_recorded_and_shown() {
        let mut sh = testing::shell();
        sh.execute("pwd");
        sh.execute("pwd");
        sh.execute("whoami");
        let out = sh.execute("history");
        assert_eq!(out, "     1  pwd\n     2  whoami\n     3  history");
    }

    #[test]
    fn prompt_abbreviates_home() {
        let mut sh = testing::shell();
        assert_eq!(sh.prompt(), "user@bitos:~$ ");
        sh.execute("cd documents");
        assert_eq!(sh.prompt(), "user@bitos:~/documents$ ");
        sh.execute("cd /etc");
        assert_eq!(sh.prompt(), "user@bitos:/etc$ ");
    }

    #[test]
    fn snapshot_and_restore() {
        let mut sh = testing::shell();
        sh.execute("cd /proc/net");
        let saved = sh.snapshot();
        let mut other = testing::shell();
        other.restore(saved);
        assert_eq!(other.execute("pwd"), "/proc/net");
        assert_eq!(other.session().history()[0], "cd /proc/net");
    }

    #[test]
    fn every_registered_command_has_help_text() {
        let sh = testing::shell();
        for cmd in sh.registry().list_commands() {
            assert!(!cmd.description().is_empty(), "{}", cmd.name());
            assert!(!cmd.usage().is_empty(), "{}", cmd.name());
        }
    }

    #[test]
    fn seeded_shells_are_reproducible() {
        let mut a = testing::shell();
        let mut b = testing::shell();
        assert_eq!(a.execute("ifconfig"), b.execute("ifconfig"));
        assert_eq!(a.execute("ps"), b.execute("ps"));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn command_names() -> Vec<String> {
            testing::shell().registry().completions("")
        }

        fn argument() -> impl Strategy<Value = String> {
            prop_oneof![
                "-?[0-9]{1,20}",
                "[0-9]{1,3}-[0-9]{0,20}",
                "-{1,2}[a-zA-Z]{1,4}",
                "(/|\\.\\./|~/)?[a-z.]{1,8}(/[a-z.]{1,6}){0,2}",
                "\\[[0-9eE.+-]{1,16}\\]",
                "['\"]?[a-z%$,{}]{0,8}['\"]?",
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(512))]

            #[test]
            fn any_line_renders_to_text(
                name in proptest::sample::select(command_names()),
                args in proptest::collection::vec(argument(), 0..5),
            ) {
                let mut sh = testing::shell();
                let line = format!("{name} {}", args.join(" "));
                let _ = sh.execute(&line);
            }

            #[test]
            fn commands_survive_a_rewritten_kernel_log(
                stamp in "[0-9eE.+-]{1,24}|inf|NaN",
                name in proptest::sample::select(command_names()),
                args in proptest::collection::vec(argument(), 0..4),
            ) {
                let mut sh = testing::shell();
                sh.execute("cd /var/log");
                sh.execute(&format!("touch dmesg.log [{stamp}] boom"));
                let _ = sh.execute("dmesg -H");
                let _ = sh.execute(&format!("{name} {}", args.join(" ")));
            }
        }
    }
}
