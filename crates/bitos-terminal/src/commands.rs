//! Built-in commands for the BitOS terminal.
//!
//! Registry-aware built-ins (`help`, `man`, `which`, `history`, `sudo`) are
//! intercepted by the registry itself; everything else lives here or in a
//! per-family module.

use bitos_types::error::{BitosError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, take_quoted};

/// Register every command family into a registry.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(PrintfCmd));
    reg.register(Box::new(ExitCmd));
    reg.register(Box::new(AboutCmd));
    crate::register_file_commands(reg);
    crate::register_network_commands(reg);
    crate::register_system_commands(reg);
    crate::register_kernel_commands(reg);
    crate::register_package_commands(reg);
    crate::register_user_commands(reg);
    crate::register_process_commands(reg);
    crate::register_text_commands(reg);
    crate::register_utility_commands(reg);
}

/// Expand backslash escapes understood by `echo -e` and `printf`.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('e') => out.push('\x1b'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Display a line of text"
    }
    fn usage(&self) -> &str {
        "echo [-n] [-e] [text...]"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut escapes = false;
        let mut rest = args;
        // Leading option words only; `echo -x` prints `-x`.
        while let Some((first, tail)) = rest.split_first() {
            match *first {
                "-e" => escapes = true,
                "-n" | "-E" => {},
                _ => break,
            }
            rest = tail;
        }
        let text = rest.join(" ");
        Ok(CommandOutput::Text(if escapes { unescape(&text) } else { text }))
    }
}

// ---------------------------------------------------------------------------
// printf
// ---------------------------------------------------------------------------

/// Apply a printf-style `format` to `args`. Supports `%s`, `%d`, `%%`.
/// The format is reused while arguments remain.
fn format_printf(format: &str, args: &[&str]) -> std::result::Result<String, String> {
    let format = unescape(format);
    let mut out = String::new();
    let mut next = 0;
    loop {
        let mut chars = format.chars();
        let mut consumed = false;
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('%') => out.push('%'),
                Some('s') => {
                    out.push_str(args.get(next).copied().unwrap_or(""));
                    next += 1;
                    consumed = true;
                },
                Some('d') | Some('i') => {
                    let arg = args.get(next).copied().unwrap_or("0");
                    let value: i64 = arg
                        .parse()
                        .map_err(|_| format!("printf: {arg}: invalid number"))?;
                    out.push_str(&value.to_string());
                    next += 1;
                    consumed = true;
                },
                Some(other) => {
                    return Err(format!("printf: %{other}: invalid conversion specification"));
                },
                None => out.push('%'),
            }
        }
        if !consumed || next >= args.len() {
            return Ok(out);
        }
    }
}

struct PrintfCmd;
impl Command for PrintfCmd {
    fn name(&self) -> &str {
        "printf"
    }
    fn description(&self) -> &str {
        "Format and print data"
    }
    fn usage(&self) -> &str {
        "printf FORMAT [ARGUMENT]..."
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((format, rest)) = take_quoted(args) else {
            return Err(BitosError::usage("printf: usage: printf [-v var] format [arguments]"));
        };
        let text = format_printf(&format, rest).map_err(BitosError::usage)?;
        Ok(if text.is_empty() {
            CommandOutput::None
        } else {
            CommandOutput::Text(text)
        })
    }
}

// ---------------------------------------------------------------------------
// exit / logout
// ---------------------------------------------------------------------------

struct ExitCmd;
impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn aliases(&self) -> &[&str] {
        &["logout"]
    }
    fn description(&self) -> &str {
        "Leave the shell"
    }
    fn usage(&self) -> &str {
        "exit"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(
            "Cannot exit terminal. This is a browser-based simulation.".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// about
// ---------------------------------------------------------------------------

struct AboutCmd;
impl Command for AboutCmd {
    fn name(&self) -> &str {
        "about"
    }
    fn description(&self) -> &str {
        "About this terminal"
    }
    fn usage(&self) -> &str {
        "about"
    }
    fn category(&self) -> &str {
        "help"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(format!(
            "\x1b[1;36mBitOS\x1b[0m {}\n\
             A simulated Linux terminal with an in-memory filesystem.\n\n\
             Host:    {}\n\
             User:    {}\n\n\
             Everything beyond the filesystem is simulated.\n\
             Type \x1b[1;36mhelp\x1b[0m for a list of available commands.",
            env!("CARGO_PKG_VERSION"),
            env.hostname,
            env.user,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn echo_joins_arguments() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("echo hello   world"), "hello world");
        assert_eq!(sh.execute("echo"), "");
        assert_eq!(sh.execute("echo -e a\\tb"), "a\tb");
        assert_eq!(sh.execute("echo -n done"), "done");
        assert_eq!(sh.execute("echo -x"), "-x");
    }

    #[test]
    fn printf_formats_arguments() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("printf \"%s is %d\\n\" answer 42"), "answer is 42\n");
        assert_eq!(sh.execute("printf %s-%s a b c d"), "a-bc-d");
        assert_eq!(sh.execute("printf 100%%"), "100%");
        assert_eq!(sh.execute("printf %d x"), "printf: x: invalid number");
        assert!(sh.execute("printf").starts_with("printf: usage:"));
    }

    #[test]
    fn exit_is_refused() {
        let mut sh = testing::shell();
        let expected = "Cannot exit terminal. This is a browser-based simulation.";
        assert_eq!(sh.execute("exit"), expected);
        assert_eq!(sh.execute("logout"), expected);
    }

    #[test]
    fn about_names_host_and_user() {
        let mut sh = testing::shell();
        let out = sh.execute("about");
        assert!(out.contains("BitOS"));
        assert!(out.contains("User:    user"));
    }

    #[test]
    fn every_family_is_registered() {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        for name in [
            "ls", "ping", "uname", "dmesg", "apt", "whoami", "kill", "sort", "tar", "git",
            "crontab", "echo", "about", "cls", "dir", "vi", "gunzip", "logout",
        ] {
            assert!(reg.resolve(name).is_some(), "{name} is not registered");
        }
    }

    #[test]
    fn unescape_keeps_unknown_sequences() {
        assert_eq!(unescape("a\\nb"), "a\nb");
        assert_eq!(unescape("\\q"), "\\q");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
