//! Command trait, registry, and dispatch logic.
//!
//! A line is split on whitespace; the first token names the command
//! (case-insensitive) and the rest are passed through untouched. There is
//! no quoting, piping, or redirection. Aliases (`dir` for `ls`, `cls` for
//! `clear`, ...) are folded into one lookup table when a command is
//! registered.

use std::collections::HashMap;
use std::time::Duration;

use bitos_types::error::{BitosError, Result};
use bitos_vfs::{CurrentDir, VirtualFileSystem};
use rand::{Rng, RngCore};

use crate::services::{Clock, Latency};

/// What the front end receives to clear the screen.
pub const CLEAR_SENTINEL: &str = "\x1Bc";

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Plain text, possibly multi-line and ANSI-coloured.
    Text(String),
    /// Command produced no visible output.
    None,
    /// Signal to clear the terminal.
    Clear,
}

impl CommandOutput {
    /// Render for a line-oriented front end.
    pub fn render(self) -> String {
        match self {
            CommandOutput::Text(text) => text,
            CommandOutput::None => String::new(),
            CommandOutput::Clear => CLEAR_SENTINEL.to_string(),
        }
    }
}

/// Everything a command may read or mutate while it runs.
pub struct Environment<'a> {
    /// Session working directory.
    pub cwd: &'a mut CurrentDir,
    /// The session's file tree.
    pub vfs: &'a mut VirtualFileSystem,
    /// Session history, oldest first, including the line being run.
    pub history: &'a [String],
    pub clock: &'a dyn Clock,
    pub latency: &'a dyn Latency,
    /// Randomness for simulated addresses and timings.
    pub rng: &'a mut dyn RngCore,
    pub hostname: &'a str,
    pub user: &'a str,
    /// The name the user typed, which may be an alias (`vi` vs `nano`).
    pub program: String,
}

impl Environment<'_> {
    /// Pause for a random duration in `[min_ms, max_ms)`.
    pub fn pause_between(&mut self, min_ms: u64, max_ms: u64) {
        let ms = if max_ms > min_ms {
            self.rng.random_range(min_ms..max_ms)
        } else {
            min_ms
        };
        self.latency.pause(Duration::from_millis(ms));
    }

    /// Read a VFS file relative to the working directory.
    pub fn read_file(&self, target: &str) -> Result<&str> {
        match self.vfs.node(self.cwd, target) {
            Some(bitos_vfs::Node::File(content)) => Ok(content),
            Some(bitos_vfs::Node::Directory(_)) => Err(BitosError::is_a_directory(target)),
            None => Err(BitosError::NotFound(target.to_string())),
        }
    }
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// Other names that dispatch to this command.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[path\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Manual page body shown by `man`. Generated from the description and
    /// usage when absent.
    fn manual(&self) -> Option<&str> {
        None
    }

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// Commands the registry answers itself because they need the registry.
struct Builtin {
    name: &'static str,
    aliases: &'static [&'static str],
    category: &'static str,
    description: &'static str,
    usage: &'static str,
    manual: Option<&'static str>,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "help",
        aliases: &[],
        category: "help",
        description: "Display this help message",
        usage: "help [command]",
        manual: Some(
            "NAME\n    help - display help for built-in commands\n\nSYNOPSIS\n    help [COMMAND]\n\nDESCRIPTION\n    Display helpful information about built-in commands.\n    If COMMAND is specified, gives detailed help on that command.",
        ),
    },
    Builtin {
        name: "man",
        aliases: &["info"],
        category: "help",
        description: "Display manual for a command",
        usage: "man <command>",
        manual: Some(
            "NAME\n    man - an interface to the system reference manuals\n\nSYNOPSIS\n    man COMMAND\n\nDESCRIPTION\n    Display the manual page for COMMAND. Aliases show the page of the\n    command they stand for.",
        ),
    },
    Builtin {
        name: "which",
        aliases: &[],
        category: "help",
        description: "Locate a command",
        usage: "which <command...>",
        manual: None,
    },
    Builtin {
        name: "history",
        aliases: &[],
        category: "shell",
        description: "Show command history",
        usage: "history [n]",
        manual: None,
    },
    Builtin {
        name: "sudo",
        aliases: &[],
        category: "user",
        description: "Execute a command as another user",
        usage: "sudo [-i] <command> [args...]",
        manual: None,
    },
];

/// `help` sections in display order: category key, heading.
const SECTIONS: &[(&str, &str)] = &[
    ("filesystem", "File System Commands"),
    ("network", "Network Commands"),
    ("system", "System Commands"),
    ("kernel", "Kernel Debugging"),
    ("package", "Package Management"),
    ("user", "User Management"),
    ("process", "Process Management"),
    ("utility", "Utilities"),
    ("shell", "Shell"),
    ("help", "Help"),
];

fn builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS
        .iter()
        .find(|b| b.name == name || b.aliases.contains(&name))
}

fn manual_page(name: &str, body: &str) -> CommandOutput {
    CommandOutput::Text(format!("\x1b[1mMANUAL: {name}\x1b[0m\n\n{body}"))
}

fn generated_manual(name: &str, description: &str, usage: &str) -> String {
    format!("NAME\n    {name} - {description}\n\nSYNOPSIS\n    {usage}")
}

/// Registry of available commands with dispatch.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    /// Lower-cased name or alias to canonical name.
    names: HashMap<String, String>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            names: HashMap::new(),
        }
    }

    /// Register a command and its aliases. Replaces any existing command
    /// with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let canonical = cmd.name().to_ascii_lowercase();
        self.names.insert(canonical.clone(), canonical.clone());
        for alias in cmd.aliases() {
            self.names
                .insert(alias.to_ascii_lowercase(), canonical.clone());
        }
        self.commands.insert(canonical, cmd);
    }

    /// Canonical name for a typed command name or alias.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.names
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Look up a command by name or alias.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        let canonical = self.resolve(name)?;
        self.commands.get(canonical).map(|c| c.as_ref())
    }

    /// Registered commands sorted by name.
    pub fn list_commands(&self) -> Vec<&dyn Command> {
        let mut cmds: Vec<&dyn Command> = self.commands.values().map(|c| c.as_ref()).collect();
        cmds.sort_by(|a, b| a.name().cmp(b.name()));
        cmds
    }

    /// Every command name, alias, and built-in starting with `prefix`.
    pub fn completions(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_ascii_lowercase();
        let mut out: Vec<String> = self
            .names
            .keys()
            .filter(|n| n.starts_with(&prefix))
            .cloned()
            .collect();
        for b in BUILTINS {
            for name in std::iter::once(b.name).chain(b.aliases.iter().copied()) {
                if name.starts_with(&prefix) {
                    out.push(name.to_string());
                }
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// Parse and execute a command line.
    pub fn execute(&self, line: &str, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = tokens.split_first() else {
            return Ok(CommandOutput::None);
        };
        self.dispatch(name, args, env)
    }

    fn dispatch(&self, name: &str, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let name_lower = name.to_ascii_lowercase();

        // Intercept built-in commands that need registry access.
        match name_lower.as_str() {
            "help" => return self.execute_help(args),
            "man" | "info" => return self.execute_man(args),
            "history" => return execute_history(args, env),
            "sudo" => return self.execute_sudo(args, env),
            "which" => return self.execute_which(args),
            _ => {},
        }

        let Some(cmd) = self.get(&name_lower) else {
            return Err(BitosError::UnknownCommand(name.to_string()));
        };
        log::debug!("dispatch {name_lower} -> {} {args:?}", cmd.name());
        env.program = name_lower;
        cmd.execute(args, env)
    }

    /// Built-in `help`: grouped listing, or details for one command.
    fn execute_help(&self, args: &[&str]) -> Result<CommandOutput> {
        if let Some(&name) = args.first() {
            let name_lower = name.to_ascii_lowercase();
            if let Some(b) = builtin(&name_lower) {
                return Ok(CommandOutput::Text(format!(
                    "{} ({})\n  {}\n  Usage: {}",
                    b.name, b.category, b.description, b.usage
                )));
            }
            return match self.get(&name_lower) {
                Some(cmd) => {
                    let mut out = format!("{} ({})\n", cmd.name(), cmd.category());
                    if !cmd.aliases().is_empty() {
                        out.push_str(&format!("  Aliases: {}\n", cmd.aliases().join(", ")));
                    }
                    out.push_str(&format!("  {}\n", cmd.description()));
                    out.push_str(&format!("  Usage: {}", cmd.usage()));
                    Ok(CommandOutput::Text(out))
                },
                None => Err(BitosError::usage(format!("help: no help topics match '{name}'"))),
            };
        }

        // Category -> (names column, description).
        let mut categories: HashMap<&str, Vec<(String, &str)>> = HashMap::new();
        for b in BUILTINS {
            let names = std::iter::once(b.name)
                .chain(b.aliases.iter().copied())
                .collect::<Vec<_>>()
                .join(", ");
            categories
                .entry(b.category)
                .or_default()
                .push((names, b.description));
        }
        for cmd in self.commands.values() {
            let names = std::iter::once(cmd.name())
                .chain(cmd.aliases().iter().copied())
                .collect::<Vec<_>>()
                .join(", ");
            categories
                .entry(cmd.category())
                .or_default()
                .push((names, cmd.description()));
        }

        let mut order: Vec<(&str, String)> = SECTIONS
            .iter()
            .map(|(cat, title)| (*cat, (*title).to_string()))
            .collect();
        let mut extra: Vec<&str> = categories
            .keys()
            .copied()
            .filter(|c| !SECTIONS.iter().any(|(known, _)| known == c))
            .collect();
        extra.sort();
        for cat in extra {
            order.push((cat, format!("{cat} commands")));
        }

        let total: usize = categories.values().map(|v| v.len()).sum();
        let mut out = format!("\x1b[1;32mBitOS Terminal Help\x1b[0m\n\nAvailable commands ({total}):\n");
        for (cat, title) in &order {
            let Some(entries) = categories.get_mut(cat) else {
                continue;
            };
            entries.sort();
            out.push_str(&format!("\n\x1b[1;33m{title}:\x1b[0m\n"));
            for (names, desc) in entries.iter() {
                out.push_str(&format!("  {names:18} - {desc}\n"));
            }
        }
        out.push_str(
            "\nType \x1b[1;36mman <command>\x1b[0m for more information about a specific command.",
        );
        Ok(CommandOutput::Text(out))
    }

    /// Built-in `man` / `info`.
    fn execute_man(&self, args: &[&str]) -> Result<CommandOutput> {
        let Some(&name) = args.first() else {
            return Err(BitosError::usage("Usage: man <command>"));
        };
        let name_lower = name.to_ascii_lowercase();
        if let Some(b) = builtin(&name_lower) {
            let body = match b.manual {
                Some(page) => page.to_string(),
                None => generated_manual(b.name, b.description, b.usage),
            };
            return Ok(manual_page(b.name, &body));
        }
        match self.get(&name_lower) {
            Some(cmd) => {
                let body = match cmd.manual() {
                    Some(page) => page.to_string(),
                    None => generated_manual(cmd.name(), cmd.description(), cmd.usage()),
                };
                Ok(manual_page(cmd.name(), &body))
            },
            None => Err(BitosError::usage(format!("No manual entry for {name}"))),
        }
    }

    /// Built-in `which`.
    fn execute_which(&self, args: &[&str]) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(BitosError::usage("usage: which <command>"));
        }
        let mut lines = Vec::with_capacity(args.len());
        for &name in args {
            let name_lower = name.to_ascii_lowercase();
            if builtin(&name_lower).is_some() {
                lines.push(format!("{name_lower}: shell built-in command"));
                continue;
            }
            match self.resolve(&name_lower) {
                Some(canonical) if canonical == name_lower => {
                    lines.push(format!("/usr/bin/{canonical}"));
                },
                Some(canonical) => {
                    lines.push(format!("{name_lower}: aliased to {canonical}"));
                },
                None => {
                    return Err(BitosError::usage(format!(
                        "which: no {name} in (/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin)"
                    )));
                },
            }
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }

    /// Built-in `sudo`: runs known commands, echoes the rest after a
    /// password prompt.
    fn execute_sudo(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((&first, rest)) = args.split_first() else {
            return Err(BitosError::usage(SUDO_USAGE));
        };
        if first == "-i" || first == "-s" {
            return Ok(CommandOutput::Text(format!("root@{}:~# ", env.hostname)));
        }
        let first_lower = first.to_ascii_lowercase();
        if builtin(&first_lower).is_some() || self.resolve(&first_lower).is_some() {
            return self.dispatch(first, rest, env);
        }
        Ok(CommandOutput::Text(format!(
            "[sudo] password for {}: \n{}",
            env.user,
            args.join(" ")
        )))
    }
}

const SUDO_USAGE: &str = "usage: sudo -h | -K | -k | -V
usage: sudo -v [-ABknS] [-g group] [-h host] [-p prompt] [-u user]
usage: sudo -l [-ABknS] [-g group] [-h host] [-p prompt] [-U user] [-u user] [command]
usage: sudo [-ABbEHknPS] [-C num] [-D directory] [-g group] [-h host] [-p prompt] [-R directory] [-T timeout] [-u user] [VAR=value] [-i|-s] [<command>]
usage: sudo -e [-ABknS] [-C num] [-D directory] [-g group] [-h host] [-p prompt] [-R directory] [-T timeout] [-u user] file ...";

/// Built-in `history [n]`.
fn execute_history(args: &[&str], env: &Environment<'_>) -> Result<CommandOutput> {
    let limit = match args.first() {
        Some(n) => n
            .parse::<usize>()
            .map_err(|_| BitosError::usage(format!("history: {n}: numeric argument required")))?,
        None => env.history.len(),
    };
    let skip = env.history.len().saturating_sub(limit);
    let mut out = String::new();
    for (i, entry) in env.history.iter().enumerate().skip(skip) {
        out.push_str(&format!("  {:4}  {entry}\n", i + 1));
    }
    Ok(CommandOutput::Text(out.trim_end().to_string()))
}

// ---------------------------------------------------------------------------
// Shared argument helpers
// ---------------------------------------------------------------------------

/// Split `args` into single-dash flag letters and positional arguments.
pub(crate) fn split_flags<'a>(args: &[&'a str]) -> (Vec<char>, Vec<&'a str>) {
    let mut flags = Vec::new();
    let mut positional = Vec::new();
    for &arg in args {
        if arg.len() > 1 && arg.starts_with('-') && !arg.starts_with("--") {
            flags.extend(arg[1..].chars());
        } else {
            positional.push(arg);
        }
    }
    (flags, positional)
}

/// Rejoin a leading argument the tokenizer split inside quotes
/// (`'{print $1, $2}'`, `"first commit"`). Returns the unquoted text and
/// the arguments after it.
pub(crate) fn take_quoted<'a, 'b>(args: &'b [&'a str]) -> Option<(String, &'b [&'a str])> {
    let (&first, rest) = args.split_first()?;
    let Some(quote) = first.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return Some((first.to_string(), rest));
    };
    let end = (0..args.len())
        .find(|&i| (i > 0 || args[i].len() > 1) && args[i].ends_with(quote))
        .unwrap_or(args.len() - 1);
    let joined = args[..=end].join(" ");
    let inner = joined.strip_prefix(quote).unwrap_or(&joined);
    let inner = inner.strip_suffix(quote).unwrap_or(inner);
    Some((inner.to_string(), &args[end + 1..]))
}

/// Simple glob matching: `*` matches any string, `?` matches one char.
///
/// Greedy two-pointer scan: on a mismatch, backtrack to the last `*` and let
/// it absorb one more character. Linear in pattern times text length.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, ti));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use bitos_types::error::ErrorKind;

    struct EchoCmd;
    impl Command for EchoCmd {
        fn name(&self) -> &str {
            "echo"
        }
        fn aliases(&self) -> &[&str] {
            &["say"]
        }
        fn description(&self) -> &str {
            "Print arguments"
        }
        fn usage(&self) -> &str {
            "echo [text...]"
        }
        fn category(&self) -> &str {
            "shell"
        }
        fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
            Ok(CommandOutput::Text(format!("{}:{}", env.program, args.join(" "))))
        }
    }

    struct ClearCmd;
    impl Command for ClearCmd {
        fn name(&self) -> &str {
            "clear"
        }
        fn aliases(&self) -> &[&str] {
            &["cls"]
        }
        fn description(&self) -> &str {
            "Clear the terminal screen"
        }
        fn usage(&self) -> &str {
            "clear"
        }
        fn manual(&self) -> Option<&str> {
            Some("NAME\n    clear - clear the terminal screen")
        }
        fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
            Ok(CommandOutput::Clear)
        }
    }

    fn registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd));
        reg.register(Box::new(ClearCmd));
        reg
    }

    fn run(reg: &CommandRegistry, fx: &mut Fixture, line: &str) -> Result<CommandOutput> {
        fx.history.push(line.to_string());
        let mut env = fx.env();
        reg.execute(line, &mut env)
    }

    fn text(output: CommandOutput) -> String {
        match output {
            CommandOutput::Text(s) => s,
            other => panic!("expected text output, got {other:?}"),
        }
    }

    #[test]
    fn register_and_execute() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = run(&reg, &mut fx, "echo hello world").unwrap();
        assert_eq!(text(out), "echo:hello world");
    }

    #[test]
    fn alias_dispatches_with_typed_name() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = run(&reg, &mut fx, "say hi").unwrap();
        assert_eq!(text(out), "say:hi");
        assert_eq!(reg.resolve("SAY"), Some("echo"));
    }

    #[test]
    fn command_names_are_case_insensitive() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = run(&reg, &mut fx, "ECHO Mixed Case").unwrap();
        assert_eq!(text(out), "echo:Mixed Case");
    }

    #[test]
    fn whitespace_is_collapsed() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = run(&reg, &mut fx, "   echo   a\tb  ").unwrap();
        assert_eq!(text(out), "echo:a b");
    }

    #[test]
    fn empty_input() {
        let reg = registry();
        let mut fx = Fixture::new();
        assert_eq!(run(&reg, &mut fx, "").unwrap(), CommandOutput::None);
        assert_eq!(run(&reg, &mut fx, "   \t").unwrap(), CommandOutput::None);
    }

    #[test]
    fn unknown_command() {
        let reg = registry();
        let mut fx = Fixture::new();
        let err = run(&reg, &mut fx, "bogus --flag").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
        let msg = format!("{err}");
        assert!(msg.contains("bogus"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn clear_renders_sentinel() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = run(&reg, &mut fx, "cls").unwrap();
        assert_eq!(out, CommandOutput::Clear);
        assert_eq!(out.render(), "\x1Bc");
    }

    #[test]
    fn help_lists_commands_by_category() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = text(run(&reg, &mut fx, "help").unwrap());
        assert!(out.contains("BitOS Terminal Help"));
        assert!(out.contains("echo, say"));
        assert!(out.contains("man, info"));
        let shell = out.find("Shell:").unwrap();
        let help = out.find("Help:").unwrap();
        assert!(shell < help);
        // "general" is not a known section and goes last.
        assert!(out.find("general commands:").unwrap() > help);
    }

    #[test]
    fn help_for_one_command() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = text(run(&reg, &mut fx, "help say").unwrap());
        assert!(out.starts_with("echo (shell)"));
        assert!(out.contains("Aliases: say"));
        assert!(out.contains("Usage: echo [text...]"));
        assert!(run(&reg, &mut fx, "help nothing").is_err());
    }

    #[test]
    fn man_uses_manual_or_generates_one() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = text(run(&reg, &mut fx, "man cls").unwrap());
        assert_eq!(
            out,
            "\x1b[1mMANUAL: clear\x1b[0m\n\nNAME\n    clear - clear the terminal screen"
        );
        let out = text(run(&reg, &mut fx, "info echo").unwrap());
        assert!(out.contains("echo - Print arguments"));
        assert!(out.contains("SYNOPSIS\n    echo [text...]"));
    }

    #[test]
    fn man_errors() {
        let reg = registry();
        let mut fx = Fixture::new();
        let err = run(&reg, &mut fx, "man").unwrap_err();
        assert_eq!(format!("{err}"), "Usage: man <command>");
        let err = run(&reg, &mut fx, "man ghost").unwrap_err();
        assert_eq!(format!("{err}"), "No manual entry for ghost");
    }

    #[test]
    fn history_numbers_entries() {
        let reg = registry();
        let mut fx = Fixture::new();
        run(&reg, &mut fx, "echo one").unwrap();
        run(&reg, &mut fx, "echo two").unwrap();
        let out = text(run(&reg, &mut fx, "history").unwrap());
        assert_eq!(out, "     1  echo one\n     2  echo two\n     3  history");
        let out = text(run(&reg, &mut fx, "history 1").unwrap());
        assert_eq!(out, "     4  history 1");
    }

    #[test]
    fn which_reports_kinds() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = text(run(&reg, &mut fx, "which echo say help").unwrap());
        assert_eq!(
            out,
            "/usr/bin/echo\nsay: aliased to echo\nhelp: shell built-in command"
        );
        assert!(run(&reg, &mut fx, "which ghost").is_err());
    }

    #[test]
    fn sudo_redispatches_known_commands() {
        let reg = registry();
        let mut fx = Fixture::new();
        let out = text(run(&reg, &mut fx, "sudo say hi").unwrap());
        assert_eq!(out, "say:hi");
        let out = text(run(&reg, &mut fx, "sudo reboot now").unwrap());
        assert_eq!(out, "[sudo] password for user: \nreboot now");
        let out = text(run(&reg, &mut fx, "sudo -i").unwrap());
        assert_eq!(out, "root@bitos:~# ");
        assert!(run(&reg, &mut fx, "sudo").is_err());
    }

    #[test]
    fn completions_cover_aliases_and_builtins() {
        let reg = registry();
        assert_eq!(reg.completions("c"), vec!["clear", "cls"]);
        assert_eq!(reg.completions("h"), vec!["help", "history"]);
        assert!(reg.completions("zz").is_empty());
    }

    #[test]
    fn list_commands_sorted() {
        let reg = registry();
        let names: Vec<&str> = reg.list_commands().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["clear", "echo"]);
    }

    #[test]
    fn pause_between_records_bounded_delay() {
        let mut fx = Fixture::new();
        {
            let mut env = fx.env();
            env.pause_between(100, 200);
            env.pause_between(50, 50);
        }
        let pauses = fx.latency.pauses();
        assert_eq!(pauses.len(), 2);
        assert!(pauses[0] >= Duration::from_millis(100) && pauses[0] < Duration::from_millis(200));
        assert_eq!(pauses[1], Duration::from_millis(50));
    }

    #[test]
    fn split_flags_separates_positionals() {
        let (flags, rest) = split_flags(&["-rf", "a", "-l", "b", "--long", "-"]);
        assert_eq!(flags, vec!['r', 'f', 'l']);
        assert_eq!(rest, vec!["a", "b", "--long", "-"]);
    }

    #[test]
    fn take_quoted_rejoins_split_arguments() {
        let args = ["-m", "'first", "commit'", "--amend"];
        let (text, rest) = take_quoted(&args[1..]).unwrap();
        assert_eq!(text, "first commit");
        assert_eq!(rest, ["--amend"]);

        let (text, rest) = take_quoted(&["s/a/b/", "file"]).unwrap();
        assert_eq!(text, "s/a/b/");
        assert_eq!(rest, ["file"]);

        let (text, rest) = take_quoted(&["\"unterminated", "words"]).unwrap();
        assert_eq!(text, "unterminated words");
        assert!(rest.is_empty());
        assert!(take_quoted(&[]).is_none());
    }

    #[test]
    fn glob_match_star() {
        assert!(glob_match("*.txt", "readme.txt"));
        assert!(glob_match("*", ""));
        assert!(!glob_match("*.md", "readme.txt"));
    }

    #[test]
    fn glob_match_many_stars_on_long_names() {
        let name = "a".repeat(400);
        assert!(!glob_match("*a*a*a*a*a*a*a*a*a*a*b", &name));
        assert!(glob_match("*a*a*a*a*a*a*a*a*a*a*", &name));
        assert!(glob_match(&format!("{name}*"), &name));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(!glob_match("a*b*c", "aXXbYY"));
        assert!(glob_match("**", "x"));
    }

    #[test]
    fn glob_match_question() {
        assert!(glob_match("k?rnel.md", "kernel.md"));
        assert!(!glob_match("k?rnel.md", "krnel.md"));
    }
}
