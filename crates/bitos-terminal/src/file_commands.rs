//! File system commands: ls, cd, pwd, cat, mkdir, touch, rm, cp, mv, find,
//! grep, chmod, chown.
//!
//! All of these operate on the session's virtual tree. Mutating commands
//! act on entries of the current directory; lookups accept full paths.

use bitos_types::error::{BitosError, ErrorKind, Result};
use bitos_vfs::path::{self, HOME};
use bitos_vfs::{EntryKind, Node, RemoveOptions};

use crate::interpreter::{
    Command, CommandOutput, CommandRegistry, Environment, glob_match, split_flags,
};

/// Register file system commands into a registry.
pub fn register_file_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(TouchCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(CpCmd));
    reg.register(Box::new(MvCmd));
    reg.register(Box::new(FindCmd));
    reg.register(Box::new(GrepCmd));
    reg.register(Box::new(ChmodCmd));
    reg.register(Box::new(ChownCmd));
}

fn dir_name(name: &str) -> String {
    format!("\x1b[1;34m{name}/\x1b[0m")
}

/// Entries under the home directory belong to the user, the rest to root.
fn owner_of(absolute: &str) -> &'static str {
    if absolute == HOME || absolute.starts_with(&format!("{HOME}/")) {
        "user"
    } else {
        "root"
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn aliases(&self) -> &[&str] {
        &["dir"]
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [-l] [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    ls - list directory contents\n\nSYNOPSIS\n    ls [-l] [DIRECTORY]\n\nDESCRIPTION\n    List information about files in the current directory or specified DIRECTORY.\n    -l    use a long listing format",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (flags, positional) = split_flags(args);
        let long = flags.contains(&'l');
        let target = positional.first().copied();
        let shown = target.unwrap_or(".");

        // `ls file` prints the file itself.
        if let Some(t) = target
            && let Some(Node::File(content)) = env.vfs.node(env.cwd, t)
        {
            if long {
                let absolute = path::resolve_relative(env.cwd.as_str(), t);
                let stamp = env.clock.now().format("%b %e %H:%M");
                let owner = owner_of(&absolute);
                return Ok(CommandOutput::Text(format!(
                    "-rw-r--r-- 1 {owner} {owner} {:>5} {stamp} {t}",
                    content.len()
                )));
            }
            return Ok(CommandOutput::Text(t.to_string()));
        }

        let entries = env.vfs.list_entries(env.cwd, target).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BitosError::usage(format!(
                "ls: cannot access '{shown}': No such file or directory"
            )),
            _ => e.in_command("ls"),
        })?;
        if entries.is_empty() {
            return Ok(CommandOutput::None);
        }

        if !long {
            let names: Vec<String> = entries
                .iter()
                .map(|e| match e.kind {
                    EntryKind::Directory => dir_name(&e.name),
                    EntryKind::File => e.name.clone(),
                })
                .collect();
            return Ok(CommandOutput::Text(names.join("  ")));
        }

        let absolute = match target {
            Some(t) => path::resolve_relative(env.cwd.as_str(), t),
            None => env.cwd.as_str().to_string(),
        };
        let owner = owner_of(&absolute);
        let stamp = env.clock.now().format("%b %e %H:%M").to_string();
        let blocks: u64 = entries
            .iter()
            .map(|e| match e.kind {
                EntryKind::Directory => 4,
                EntryKind::File => e.size.div_ceil(4096).max(1) * 4,
            })
            .sum();
        let mut lines = vec![format!("total {blocks}")];
        for e in &entries {
            let line = match e.kind {
                EntryKind::Directory => format!(
                    "drwxr-xr-x 2 {owner} {owner}  4096 {stamp} \x1b[1;34m{}\x1b[0m",
                    e.name
                ),
                EntryKind::File => format!(
                    "-rw-r--r-- 1 {owner} {owner} {:>5} {stamp} {}",
                    e.size, e.name
                ),
            };
            lines.push(line);
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change directory"
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    cd - change directory\n\nSYNOPSIS\n    cd [DIRECTORY]\n\nDESCRIPTION\n    Change the current working directory to DIRECTORY.\n    If no directory is specified, changes to the home directory (~).",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.len() > 1 {
            return Err(BitosError::usage("cd: too many arguments"));
        }
        let target = args.first().copied().unwrap_or("~");
        env.vfs
            .change_directory(env.cwd, target)
            .map_err(|e| e.in_command("cd"))?;
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    pwd - print working directory\n\nSYNOPSIS\n    pwd\n\nDESCRIPTION\n    Print the full filename of the current working directory.",
        )
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.cwd.to_string()))
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn aliases(&self) -> &[&str] {
        &["type"]
    }
    fn description(&self) -> &str {
        "Display file contents"
    }
    fn usage(&self) -> &str {
        "cat <file...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    cat - concatenate and display files\n\nSYNOPSIS\n    cat FILE\n\nDESCRIPTION\n    Concatenate FILE to standard output.",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(BitosError::usage("Usage: cat <filename>"));
        }
        let mut parts = Vec::with_capacity(args.len());
        for &target in args {
            let content = env.read_file(target).map_err(|e| e.in_command("cat"))?;
            parts.push(content.to_string());
        }
        Ok(CommandOutput::Text(parts.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create directory"
    }
    fn usage(&self) -> &str {
        "mkdir [-p] <directory...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (flags, names) = split_flags(args);
        if names.is_empty() {
            return Err(BitosError::usage("Usage: mkdir <directory>"));
        }
        let parents = flags.contains(&'p');
        for name in names {
            match env.vfs.make_directory(env.cwd, name) {
                Err(e) if parents && e.kind() == ErrorKind::AlreadyExists => {},
                other => other.map_err(|e| e.in_command("mkdir"))?,
            }
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn aliases(&self) -> &[&str] {
        &["new-item"]
    }
    fn description(&self) -> &str {
        "Create empty file"
    }
    fn usage(&self) -> &str {
        "touch <file> [content...]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((&name, content)) = args.split_first() else {
            return Err(BitosError::usage("Usage: touch <filename>"));
        };
        // Touching an existing file without content keeps what it has.
        if content.is_empty() && env.vfs.file_content(env.cwd, name).is_some() {
            return Ok(CommandOutput::None);
        }
        env.vfs
            .create_or_overwrite_file(env.cwd, name, &content.join(" "))
            .map_err(|e| e.in_command("touch"))?;
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove files or directories"
    }
    fn usage(&self) -> &str {
        "rm [-r] [-f] <name...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (flags, names) = split_flags(args);
        let options = RemoveOptions {
            recursive: flags.iter().any(|f| matches!(f, 'r' | 'R')),
            force: flags.contains(&'f'),
        };
        if names.is_empty() {
            if options.force {
                return Ok(CommandOutput::None);
            }
            return Err(BitosError::usage("rm: missing operand"));
        }
        for name in names {
            env.vfs
                .remove(env.cwd, name, options)
                .map_err(|e| e.in_command("rm"))?;
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// cp
// ---------------------------------------------------------------------------

struct CpCmd;
impl Command for CpCmd {
    fn name(&self) -> &str {
        "cp"
    }
    fn description(&self) -> &str {
        "Copy a file"
    }
    fn usage(&self) -> &str {
        "cp <source> <dest>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args {
            [] => Err(BitosError::usage("cp: missing file operand")),
            [src] => Err(BitosError::usage(format!(
                "cp: missing destination file operand after '{src}'"
            ))),
            [src, dst] => {
                env.vfs
                    .copy(env.cwd, src, dst)
                    .map_err(|e| e.in_command("cp"))?;
                Ok(CommandOutput::None)
            },
            _ => Err(BitosError::usage("cp: too many arguments")),
        }
    }
}

// ---------------------------------------------------------------------------
// mv
// ---------------------------------------------------------------------------

struct MvCmd;
impl Command for MvCmd {
    fn name(&self) -> &str {
        "mv"
    }
    fn description(&self) -> &str {
        "Move or rename an entry"
    }
    fn usage(&self) -> &str {
        "mv <source> <dest>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args {
            [] => Err(BitosError::usage("mv: missing file operand")),
            [src] => Err(BitosError::usage(format!(
                "mv: missing destination file operand after '{src}'"
            ))),
            [src, dst] => {
                env.vfs
                    .move_entry(env.cwd, src, dst)
                    .map_err(|e| e.in_command("mv"))?;
                Ok(CommandOutput::None)
            },
            _ => Err(BitosError::usage("mv: too many arguments")),
        }
    }
}

// ---------------------------------------------------------------------------
// find
// ---------------------------------------------------------------------------

struct FindCmd;
impl Command for FindCmd {
    fn name(&self) -> &str {
        "find"
    }
    fn description(&self) -> &str {
        "Search for files in a directory hierarchy"
    }
    fn usage(&self) -> &str {
        "find [path] [-name pattern] [-type f|d]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut start = ".";
        let mut name_pattern = None;
        let mut kind = None;
        let mut i = 0;
        while i < args.len() {
            match args[i] {
                "-name" | "-iname" | "-type" => {
                    let Some(&value) = args.get(i + 1) else {
                        return Err(BitosError::usage(format!(
                            "find: missing argument to `{}'",
                            args[i]
                        )));
                    };
                    if args[i] == "-type" {
                        kind = Some(match value {
                            "f" => EntryKind::File,
                            "d" => EntryKind::Directory,
                            other => {
                                return Err(BitosError::usage(format!(
                                    "find: Unknown argument to -type: {other}"
                                )));
                            },
                        });
                    } else {
                        name_pattern = Some(value);
                    }
                    i += 2;
                },
                other if other.starts_with('-') => {
                    return Err(BitosError::usage(format!("find: unknown predicate `{other}'")));
                },
                other => {
                    start = other;
                    i += 1;
                },
            }
        }

        // `.` is the working directory here; elsewhere it is a literal name.
        let base = if start == "." {
            env.cwd.as_str().to_string()
        } else {
            path::resolve_relative(env.cwd.as_str(), start)
        };
        let start_kind = match env.vfs.node(env.cwd, &base) {
            Some(node) => node.kind(),
            None => {
                return Err(BitosError::NotFound(format!("'{start}'")).in_command("find"));
            },
        };
        let walked = env.vfs.walk(env.cwd, &base)?;

        let display_root = start.trim_end_matches('/');
        let shown = |absolute: &str| -> String {
            let rel = if base == "/" {
                absolute
            } else {
                absolute.strip_prefix(base.as_str()).unwrap_or(absolute)
            };
            format!("{display_root}{rel}")
        };
        let matches = |p: &str, k: EntryKind| {
            kind.is_none_or(|want| want == k)
                && name_pattern.is_none_or(|pat| glob_match(pat, path::file_name(p)))
        };

        let mut lines = Vec::new();
        if matches(&base, start_kind) {
            lines.push(if display_root.is_empty() { "/".to_string() } else { display_root.to_string() });
        }
        for (p, k) in &walked {
            if matches(p, *k) {
                lines.push(shown(p));
            }
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// grep
// ---------------------------------------------------------------------------

struct GrepCmd;
impl Command for GrepCmd {
    fn name(&self) -> &str {
        "grep"
    }
    fn description(&self) -> &str {
        "Print lines matching a pattern"
    }
    fn usage(&self) -> &str {
        "grep [-i] [-n] [-v] [-c] <pattern> <file...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (flags, positional) = split_flags(args);
        let Some((&pattern, files)) = positional.split_first() else {
            return Err(BitosError::usage(
                "Usage: grep [OPTION]... PATTERNS [FILE]...\nTry 'grep --help' for more information.",
            ));
        };
        if files.is_empty() {
            return Err(BitosError::usage("grep: no input files"));
        }
        let ignore_case = flags.contains(&'i');
        let numbered = flags.contains(&'n');
        let invert = flags.contains(&'v');
        let count_only = flags.contains(&'c');
        let needle = if ignore_case {
            pattern.to_lowercase()
        } else {
            pattern.to_string()
        };

        let mut out = Vec::new();
        for &file in files {
            let content = env.read_file(file).map_err(|e| e.in_command("grep"))?;
            let prefix = if files.len() > 1 {
                format!("{file}:")
            } else {
                String::new()
            };
            let mut count = 0;
            for (idx, line) in content.lines().enumerate() {
                let hit = if ignore_case {
                    line.to_lowercase().contains(&needle)
                } else {
                    line.contains(&needle)
                };
                if hit == invert {
                    continue;
                }
                count += 1;
                if !count_only {
                    if numbered {
                        out.push(format!("{prefix}{}:{line}", idx + 1));
                    } else {
                        out.push(format!("{prefix}{line}"));
                    }
                }
            }
            if count_only {
                out.push(format!("{prefix}{count}"));
            }
        }
        Ok(CommandOutput::Text(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// chmod
// ---------------------------------------------------------------------------

fn valid_mode(mode: &str) -> bool {
    let octal = (3..=4).contains(&mode.len()) && mode.chars().all(|c| ('0'..='7').contains(&c));
    let symbolic = mode.split(',').all(|clause| {
        let rest = clause.trim_start_matches(['u', 'g', 'o', 'a']);
        let mut chars = rest.chars();
        matches!(chars.next(), Some('+' | '-' | '='))
            && chars.all(|c| matches!(c, 'r' | 'w' | 'x' | 'X' | 's' | 't'))
    });
    octal || symbolic
}

struct ChmodCmd;
impl Command for ChmodCmd {
    fn name(&self) -> &str {
        "chmod"
    }
    fn description(&self) -> &str {
        "Change file mode bits"
    }
    fn usage(&self) -> &str {
        "chmod <mode> <file...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((&mode, files)) = args.split_first() else {
            return Err(BitosError::usage("chmod: missing operand"));
        };
        if files.is_empty() {
            return Err(BitosError::usage(format!("chmod: missing operand after '{mode}'")));
        }
        if !valid_mode(mode) {
            return Err(BitosError::usage(format!("chmod: invalid mode: '{mode}'")));
        }
        for &file in files {
            if env.vfs.node(env.cwd, file).is_none() {
                return Err(BitosError::usage(format!(
                    "chmod: cannot access '{file}': No such file or directory"
                )));
            }
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// chown
// ---------------------------------------------------------------------------

struct ChownCmd;
impl Command for ChownCmd {
    fn name(&self) -> &str {
        "chown"
    }
    fn description(&self) -> &str {
        "Change file owner and group"
    }
    fn usage(&self) -> &str {
        "chown <owner[:group]> <file...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((&spec, files)) = args.split_first() else {
            return Err(BitosError::usage("chown: missing operand"));
        };
        if files.is_empty() {
            return Err(BitosError::usage(format!("chown: missing operand after '{spec}'")));
        }
        let owner = spec.split(':').next().unwrap_or(spec);
        if owner != env.user && owner != "root" {
            return Err(BitosError::usage(format!("chown: invalid user: '{spec}'")));
        }
        for &file in files {
            if env.vfs.node(env.cwd, file).is_none() {
                return Err(BitosError::usage(format!(
                    "chown: cannot access '{file}': No such file or directory"
                )));
            }
            if owner == "root" {
                return Err(BitosError::usage(format!(
                    "chown: changing ownership of '{file}': Operation not permitted"
                )));
            }
        }
        Ok(CommandOutput::None)
    }
}
