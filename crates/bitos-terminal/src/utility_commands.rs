//! Utilities: tar, gzip/gunzip, zip/unzip, ssh, scp, rsync, git, nano/vi,
//! crontab/cron.
//!
//! Archives are plain files listing their members, so `tar -t` and
//! `unzip -l` can read back what was packed. Remote hosts never answer.

use bitos_types::error::{BitosError, Result};
use bitos_vfs::path;
use bitos_vfs::{CurrentDir, EntryKind, Node, RemoveOptions};
use rand::Rng;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, split_flags, take_quoted};

/// Register utility commands.
pub fn register_utility_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(TarCmd));
    reg.register(Box::new(GzipCmd));
    reg.register(Box::new(ZipCmd));
    reg.register(Box::new(SshCmd));
    reg.register(Box::new(ScpCmd));
    reg.register(Box::new(RsyncCmd));
    reg.register(Box::new(GitCmd));
    reg.register(Box::new(EditorCmd));
    reg.register(Box::new(CrontabCmd));
}

/// Archive member names for `member`, directories with a trailing `/`.
/// `None` if the member does not exist.
fn member_entries(env: &Environment<'_>, member: &str) -> Option<Vec<String>> {
    let shown = member.trim_start_matches('/').trim_end_matches('/');
    match env.vfs.node(env.cwd, member)? {
        Node::File(_) => Some(vec![shown.to_string()]),
        Node::Directory(_) => {
            let base = path::resolve_relative(env.cwd.as_str(), member);
            let mut out = vec![format!("{shown}/")];
            for (p, kind) in env.vfs.walk(env.cwd, member).ok()? {
                let rel = p.strip_prefix(base.as_str()).unwrap_or(p.as_str());
                let slash = if kind == EntryKind::Directory { "/" } else { "" };
                out.push(format!("{shown}{rel}{slash}"));
            }
            Some(out)
        },
    }
}

/// `host` from `[user@]host:path`, or `None` for a local path.
fn remote_host(arg: &str) -> Option<&str> {
    let (host, _) = arg.split_once(':')?;
    Some(host.rsplit_once('@').map_or(host, |(_, h)| h))
}

fn connection_refused(env: &mut Environment<'_>, host: &str, port: &str) -> String {
    env.pause_between(300, 900);
    format!("ssh: connect to host {host} port {port}: Connection refused")
}

// ---------------------------------------------------------------------------
// tar
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum TarMode {
    Create,
    Extract,
    List,
}

const TAR_TRY_HELP: &str = "Try 'tar --help' or 'tar --usage' for more information.";

const TAR_SAMPLE_LISTING: &str = "drwxr-xr-x user/user         0 2023-04-18 12:00 ./
-rw-r--r-- user/user      1024 2023-04-18 12:00 ./file1.txt
-rw-r--r-- user/user      2048 2023-04-18 12:00 ./file2.txt";

struct TarArgs<'a> {
    mode: Option<TarMode>,
    verbose: bool,
    archive: Option<&'a str>,
    members: Vec<&'a str>,
}

fn parse_tar_args<'a>(args: &[&'a str]) -> Result<TarArgs<'a>> {
    let mut parsed = TarArgs {
        mode: None,
        verbose: false,
        archive: None,
        members: Vec::new(),
    };
    let mut wants_file = false;
    for (i, &arg) in args.iter().enumerate() {
        if wants_file {
            parsed.archive = Some(arg);
            wants_file = false;
            continue;
        }
        if let Some(long) = arg.strip_prefix("--") {
            match long {
                "create" => parsed.mode = Some(TarMode::Create),
                "extract" | "get" => parsed.mode = Some(TarMode::Extract),
                "list" => parsed.mode = Some(TarMode::List),
                "verbose" => parsed.verbose = true,
                _ => match long.strip_prefix("file=") {
                    Some(file) => parsed.archive = Some(file),
                    None => {
                        return Err(BitosError::usage(format!(
                            "tar: unrecognized option '{arg}'\n{TAR_TRY_HELP}"
                        )));
                    },
                },
            }
            continue;
        }
        // Old-style bundled letters are allowed in the first position.
        let letters = match arg.strip_prefix('-') {
            Some(letters) => letters,
            None if i == 0 => arg,
            None => {
                parsed.members.push(arg);
                continue;
            },
        };
        for c in letters.chars() {
            match c {
                'c' => parsed.mode = Some(TarMode::Create),
                'x' => parsed.mode = Some(TarMode::Extract),
                't' => parsed.mode = Some(TarMode::List),
                'v' => parsed.verbose = true,
                'f' => wants_file = true,
                'z' | 'j' | 'J' | 'p' => {},
                other => {
                    return Err(BitosError::usage(format!(
                        "tar: invalid option -- '{other}'\n{TAR_TRY_HELP}"
                    )));
                },
            }
        }
    }
    if wants_file {
        return Err(BitosError::usage(format!(
            "tar: option requires an argument -- 'f'\n{TAR_TRY_HELP}"
        )));
    }
    Ok(parsed)
}

fn unrecoverable(message: String) -> BitosError {
    BitosError::usage(format!("{message}\ntar: Error is not recoverable: exiting now"))
}

struct TarCmd;
impl Command for TarCmd {
    fn name(&self) -> &str {
        "tar"
    }
    fn description(&self) -> &str {
        "An archiving utility"
    }
    fn usage(&self) -> &str {
        "tar -c|-x|-t [-v] -f <archive> [files...]"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(BitosError::usage("Usage: tar [options] [file]..."));
        }
        let tar = parse_tar_args(args)?;
        let Some(mode) = tar.mode else {
            return Err(BitosError::usage(
                "tar: You must specify one of the '-Acdtrux', '--delete' or '--test-label' options",
            ));
        };

        if mode == TarMode::Create {
            let Some(archive) = tar.archive else {
                return Err(unrecoverable(
                    "tar: Refusing to write archive contents to terminal (missing -f option?)".to_string(),
                ));
            };
            if tar.members.is_empty() {
                return Err(BitosError::usage(format!(
                    "tar: Cowardly refusing to create an empty archive\n{TAR_TRY_HELP}"
                )));
            }
            let mut entries = Vec::new();
            for &member in &tar.members {
                let Some(found) = member_entries(env, member) else {
                    return Err(BitosError::usage(format!(
                        "tar: {member}: Cannot stat: No such file or directory\n\
                         tar: Exiting with failure status due to previous errors"
                    )));
                };
                entries.extend(found);
            }
            env.vfs
                .create_or_overwrite_file(env.cwd, archive, &entries.join("\n"))
                .map_err(|e| e.in_command("tar"))?;

            let mut lines = Vec::new();
            if tar.members.iter().any(|m| m.starts_with('/')) {
                lines.push("tar: Removing leading '/' from member names".to_string());
            }
            if tar.verbose {
                lines.extend(entries);
            }
            return Ok(if lines.is_empty() {
                CommandOutput::None
            } else {
                CommandOutput::Text(lines.join("\n"))
            });
        }

        let Some(archive) = tar.archive else {
            return match mode {
                TarMode::List => Ok(CommandOutput::Text(TAR_SAMPLE_LISTING.to_string())),
                _ => Err(unrecoverable(
                    "tar: Refusing to read archive contents from terminal (missing -f option?)".to_string(),
                )),
            };
        };
        let Some(contents) = env.vfs.file_content(env.cwd, archive) else {
            return Err(unrecoverable(format!(
                "tar: {archive}: Cannot open: No such file or directory"
            )));
        };
        // Extraction is reported, never written back to the tree.
        if mode == TarMode::Extract && !tar.verbose {
            return Ok(CommandOutput::None);
        }
        Ok(CommandOutput::Text(contents.to_string()))
    }
}

// ---------------------------------------------------------------------------
// gzip / gunzip
// ---------------------------------------------------------------------------

struct GzipCmd;
impl Command for GzipCmd {
    fn name(&self) -> &str {
        "gzip"
    }
    fn aliases(&self) -> &[&str] {
        &["gunzip"]
    }
    fn description(&self) -> &str {
        "Compress or expand files"
    }
    fn usage(&self) -> &str {
        "gzip [-d] [-k] <file...>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (flags, files) = split_flags(args);
        if files.is_empty() {
            return Err(BitosError::usage("Usage: gzip [options] [file]..."));
        }
        let decompress = env.program == "gunzip" || flags.contains(&'d');
        let keep = flags.contains(&'k');

        for &file in &files {
            let target = if decompress {
                match file.strip_suffix(".gz") {
                    Some(stem) if !stem.is_empty() => stem.to_string(),
                    _ => {
                        return Err(BitosError::usage(format!(
                            "gzip: {file}: unknown suffix -- ignored"
                        )));
                    },
                }
            } else if file.ends_with(".gz") {
                return Err(BitosError::usage(format!(
                    "gzip: {file} already has .gz suffix -- unchanged"
                )));
            } else {
                format!("{file}.gz")
            };
            match env.vfs.node(env.cwd, file) {
                None => {
                    return Err(BitosError::usage(format!(
                        "gzip: {file}: No such file or directory"
                    )));
                },
                Some(Node::Directory(_)) => {
                    return Err(BitosError::usage(format!(
                        "gzip: {file} is a directory -- ignored"
                    )));
                },
                Some(Node::File(_)) => {},
            }
            let result = if keep {
                env.vfs.copy(env.cwd, file, &target)
            } else {
                env.vfs.move_entry(env.cwd, file, &target)
            };
            result.map_err(|e| e.in_command("gzip"))?;
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// zip / unzip
// ---------------------------------------------------------------------------

struct ZipCmd;
impl Command for ZipCmd {
    fn name(&self) -> &str {
        "zip"
    }
    fn aliases(&self) -> &[&str] {
        &["unzip"]
    }
    fn description(&self) -> &str {
        "Package and compress files"
    }
    fn usage(&self) -> &str {
        "zip [-r] <zipfile> <files...> | unzip [-l] <zipfile>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if env.program == "unzip" {
            return unzip(args, env);
        }
        if args.len() < 2 {
            return Err(BitosError::usage("Usage: zip [options] zipfile files..."));
        }
        let (flags, positional) = split_flags(args);
        let recursive = flags.contains(&'r');
        let Some((&zipfile, members)) = positional.split_first() else {
            return Err(BitosError::usage("Usage: zip [options] zipfile files..."));
        };
        let zipfile = if zipfile.contains('.') {
            zipfile.to_string()
        } else {
            format!("{zipfile}.zip")
        };

        let mut lines = Vec::new();
        let mut entries = Vec::new();
        for &member in members {
            match member_entries(env, member) {
                Some(found) => {
                    // Without -r a directory is stored without its contents.
                    let take = if recursive { found.len() } else { 1 };
                    for entry in found.into_iter().take(take) {
                        let method = if entry.ends_with('/') { "stored 0%" } else { "deflated 50%" };
                        lines.push(format!("adding: {entry} ({method})"));
                        entries.push(entry);
                    }
                },
                None => lines.push(format!("\tzip warning: name not matched: {member}")),
            }
        }
        if entries.is_empty() {
            lines.push(format!("\nzip error: Nothing to do! ({zipfile})"));
            return Err(BitosError::usage(lines.join("\n")));
        }
        env.vfs
            .create_or_overwrite_file(env.cwd, &zipfile, &entries.join("\n"))
            .map_err(|e| e.in_command("zip"))?;
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

fn unzip(args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
    let (flags, positional) = split_flags(args);
    let Some(&archive) = positional.first() else {
        return Err(BitosError::usage("Usage: unzip [-l] file[.zip] [-d exdir]"));
    };
    let contents = env
        .vfs
        .file_content(env.cwd, archive)
        .or_else(|| env.vfs.file_content(env.cwd, &format!("{archive}.zip")))
        .ok_or_else(|| {
            BitosError::usage(format!(
                "unzip:  cannot find or open {archive}, {archive}.zip or {archive}.ZIP."
            ))
        })?;
    let mut out = vec![format!("Archive:  {archive}")];
    for entry in contents.lines() {
        if flags.contains(&'l') {
            out.push(format!("        0  2024-03-01 12:30   {entry}"));
        } else if entry.ends_with('/') {
            out.push(format!("   creating: {entry}"));
        } else {
            out.push(format!("  inflating: {entry}"));
        }
    }
    Ok(CommandOutput::Text(out.join("\n")))
}

// ---------------------------------------------------------------------------
// ssh / scp / rsync
// ---------------------------------------------------------------------------

const SSH_USAGE: &str = "usage: ssh [-46AaCfGgKkMNnqsTtVvXxYy] [-B bind_interface]
           [-b bind_address] [-c cipher_spec] [-D [bind_address:]port]
           [-E log_file] [-e escape_char] [-F configfile] [-I pkcs11]
           [-i identity_file] [-J [user@]host[:port]] [-L address]
           [-l login_name] [-m mac_spec] [-O ctl_cmd] [-o option] [-p port]
           [-Q query_option] [-R address] [-S ctl_path] [-W host:port]
           [-w local_tun[:remote_tun]] destination [command]";

struct SshCmd;
impl Command for SshCmd {
    fn name(&self) -> &str {
        "ssh"
    }
    fn description(&self) -> &str {
        "OpenSSH remote login client"
    }
    fn usage(&self) -> &str {
        "ssh [-p port] [user@]host"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut port = "22";
        let mut destination = None;
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            match arg {
                "-p" => port = iter.next().unwrap_or(port),
                "-l" | "-i" | "-o" | "-F" | "-J" => {
                    iter.next();
                },
                _ if arg.starts_with('-') => {},
                _ => {
                    destination = Some(arg);
                    break;
                },
            }
        }
        let Some(destination) = destination else {
            return Err(BitosError::usage(SSH_USAGE));
        };
        let host = destination.rsplit_once('@').map_or(destination, |(_, h)| h);
        Err(BitosError::usage(connection_refused(env, host, port)))
    }
}

struct ScpCmd;
impl Command for ScpCmd {
    fn name(&self) -> &str {
        "scp"
    }
    fn description(&self) -> &str {
        "Secure copy (remote file copy program)"
    }
    fn usage(&self) -> &str {
        "scp <source> <target>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (_, positional) = split_flags(args);
        let [source, .., target] = positional.as_slice() else {
            return Err(BitosError::usage(SCP_USAGE));
        };
        let (source, target) = (*source, *target);
        if let Some(host) = remote_host(source) {
            let refused = connection_refused(env, host, "22");
            return Err(BitosError::usage(format!("{refused}\nscp: Connection closed")));
        }
        if env.vfs.node(env.cwd, source).is_none() {
            return Err(BitosError::usage(format!(
                "scp: {source}: No such file or directory"
            )));
        }
        if let Some(host) = remote_host(target) {
            let refused = connection_refused(env, host, "22");
            return Err(BitosError::usage(format!("{refused}\nscp: Connection closed")));
        }
        env.vfs
            .copy(env.cwd, source, target)
            .map_err(|e| e.in_command("scp"))?;
        Ok(CommandOutput::None)
    }
}

const SCP_USAGE: &str = "usage: scp [-346BCpqrTv] [-c cipher] [-F ssh_config] [-i identity_file]
           [-J destination] [-l limit] [-o ssh_option] [-P port]
           [-S program] source ... target";

const RSYNC_USAGE: &str = "usage: rsync [OPTION]... SRC [SRC]... DEST
   or: rsync [OPTION]... SRC [SRC]... [USER@]HOST:DEST
   or: rsync [OPTION]... SRC [SRC]... [USER@]HOST::DEST
   or: rsync [OPTION]... SRC [SRC]... rsync://[USER@]HOST[:PORT]/DEST
   or: rsync [OPTION]... [USER@]HOST:SRC [DEST]
   or: rsync [OPTION]... [USER@]HOST::SRC [DEST]
   or: rsync [OPTION]... rsync://[USER@]HOST[:PORT]/SRC [DEST]";

struct RsyncCmd;
impl Command for RsyncCmd {
    fn name(&self) -> &str {
        "rsync"
    }
    fn description(&self) -> &str {
        "A fast, versatile, remote (and local) file-copying tool"
    }
    fn usage(&self) -> &str {
        "rsync [-av] <source> <dest>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (_, positional) = split_flags(args);
        let &[source, dest] = positional.as_slice() else {
            return Err(BitosError::usage(RSYNC_USAGE));
        };
        if let Some(host) = remote_host(source).or_else(|| remote_host(dest)) {
            let refused = connection_refused(env, host, "22");
            return Err(BitosError::usage(format!(
                "{refused}\nrsync: connection unexpectedly closed (0 bytes received so far) [sender]\n\
                 rsync error: unexplained error (code 255) at io.c(231) [sender=3.2.7]"
            )));
        }
        let size = match env.vfs.node(env.cwd, source) {
            Some(node) => node.size(),
            None => {
                let absolute = path::resolve_relative(env.cwd.as_str(), source);
                return Err(BitosError::usage(format!(
                    "rsync: link_stat \"{absolute}\" failed: No such file or directory (2)"
                )));
            },
        };
        env.vfs
            .copy(env.cwd, source, dest)
            .map_err(|e| e.in_command("rsync"))?;
        Ok(CommandOutput::Text(format!(
            "sending incremental file list\n{source}\n\n\
             sent {} bytes  received 35 bytes\ntotal size is {size}",
            size + 89
        )))
    }
}

// ---------------------------------------------------------------------------
// git
// ---------------------------------------------------------------------------

const GIT_USAGE: &str = "usage: git [--version] [--help] [-C <path>] [-c <name>=<value>]
           [--exec-path[=<path>]] [--html-path] [--man-path] [--info-path]
           [-p | --paginate | -P | --no-pager] [--no-replace-objects] [--bare]
           [--git-dir=<path>] [--work-tree=<path>] [--namespace=<name>]
           [--super-prefix=<path>] [--config-env=<name>=<envvar>]
           <command> [<args>]";

fn commit_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    (0..40)
        .map(|_| HEX[rng.random_range(0..HEX.len())] as char)
        .collect()
}

fn repo_name(url: &str) -> &str {
    let last = url.trim_end_matches('/').rsplit(['/', ':']).next().unwrap_or(url);
    match last.strip_suffix(".git") {
        Some(name) if !name.is_empty() => name,
        _ if last.is_empty() => "repo",
        _ => last,
    }
}

struct GitCmd;
impl Command for GitCmd {
    fn name(&self) -> &str {
        "git"
    }
    fn description(&self) -> &str {
        "The stupid content tracker"
    }
    fn usage(&self) -> &str {
        "git <init|status|clone|add|commit|push|pull|branch|checkout|log> [args]"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((&subcommand, rest)) = args.split_first() else {
            return Err(BitosError::usage(GIT_USAGE));
        };
        let text = match subcommand {
            "--version" | "version" => "git version 2.39.2".to_string(),
            "init" => {
                let git_dir = format!("{}/.git/", env.cwd.as_str().trim_end_matches('/'));
                if env.vfs.directory(env.cwd, ".git").is_some() {
                    format!("Reinitialized existing Git repository in {git_dir}")
                } else {
                    env.vfs
                        .make_directory(env.cwd, ".git")
                        .map_err(|e| e.in_command("git"))?;
                    format!("Initialized empty Git repository in {git_dir}")
                }
            },
            "status" => "On branch main\nNo commits yet\n\
                         nothing to commit (create/copy files and use \"git add\" to track)"
                .to_string(),
            "clone" => {
                let Some(&url) = rest.iter().find(|a| !a.starts_with('-')) else {
                    return Err(BitosError::usage("fatal: You must specify a repository to clone."));
                };
                let name = repo_name(url);
                if env.vfs.node(env.cwd, name).is_some() {
                    return Err(BitosError::usage(format!(
                        "fatal: destination path '{name}' already exists and is not an empty directory."
                    )));
                }
                env.pause_between(400, 1000);
                env.vfs
                    .make_directory(env.cwd, name)
                    .map_err(|e| e.in_command("git"))?;
                format!(
                    "Cloning into '{name}'...\n\
                     remote: Enumerating objects: 1463, done.\n\
                     remote: Counting objects: 100% (1463/1463), done.\n\
                     remote: Compressing objects: 100% (750/750), done.\n\
                     remote: Total 1463 (delta 713), reused 1463 (delta 713), pack-reused 0\n\
                     Receiving objects: 100% (1463/1463), 8.25 MiB | 10.62 MiB/s, done.\n\
                     Resolving deltas: 100% (713/713), done."
                )
            },
            "add" => {
                let Some(&pathspec) = rest.iter().find(|a| !a.starts_with('-')) else {
                    return Err(BitosError::usage(
                        "Nothing specified, nothing added.\nMaybe you wanted to say 'git add .'?",
                    ));
                };
                if pathspec != "." && env.vfs.node(env.cwd, pathspec).is_none() {
                    return Err(BitosError::usage(format!(
                        "fatal: pathspec '{pathspec}' did not match any files"
                    )));
                }
                return Ok(CommandOutput::None);
            },
            "commit" => {
                let message = rest
                    .iter()
                    .position(|a| *a == "-m")
                    .and_then(|i| take_quoted(&rest[i + 1..]))
                    .map(|(message, _)| message)
                    .ok_or_else(|| BitosError::usage("error: switch `m' requires a value"))?;
                let hash = commit_hash(env.rng);
                format!(
                    "[main (root-commit) {}] {message}\n 1 file changed, 1 insertion(+)\n create mode 100644 README.md",
                    &hash[..7]
                )
            },
            "push" => {
                env.pause_between(300, 900);
                "Enumerating objects: 3, done.\n\
                 Counting objects: 100% (3/3), done.\n\
                 Delta compression using up to 8 threads\n\
                 Compressing objects: 100% (2/2), done.\n\
                 Writing objects: 100% (3/3), 281 bytes | 281.00 KiB/s, done.\n\
                 Total 3 (delta 0), reused 0 (delta 0), pack-reused 0\n\
                 To github.com:user/repo.git\n\
                 * [new branch]      main -> main"
                    .to_string()
            },
            "pull" => "Already up to date.".to_string(),
            "branch" => "* main".to_string(),
            "checkout" | "switch" => {
                let create = rest.iter().any(|a| matches!(*a, "-b" | "-c"));
                let Some(&branch) = rest.iter().find(|a| !a.starts_with('-')) else {
                    return Err(BitosError::usage(
                        "error: pathspec '' did not match any file(s) known to git",
                    ));
                };
                if create {
                    format!("Switched to a new branch '{branch}'")
                } else {
                    format!("Switched to branch '{branch}'")
                }
            },
            "log" => {
                let date = env.clock.now().format("%a %b %-d %H:%M:%S %Y %z");
                format!(
                    "commit {} (HEAD -> main)\nAuthor: User <user@example.com>\nDate:   {date}\n\n    Initial commit",
                    commit_hash(env.rng)
                )
            },
            other => {
                return Err(BitosError::usage(format!(
                    "git: '{other}' is not a git command. See 'git --help'."
                )));
            },
        };
        Ok(CommandOutput::Text(text))
    }
}

// ---------------------------------------------------------------------------
// nano / vi
// ---------------------------------------------------------------------------

struct EditorCmd;
impl Command for EditorCmd {
    fn name(&self) -> &str {
        "nano"
    }
    fn aliases(&self) -> &[&str] {
        &["vi", "vim"]
    }
    fn description(&self) -> &str {
        "Text editor (read-only preview)"
    }
    fn usage(&self) -> &str {
        "nano <file>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let editor = env.program.as_str();
        let Some(&file) = args.iter().find(|a| !a.starts_with('-')) else {
            return Err(BitosError::usage(format!("{editor}: No file specified")));
        };
        let content = match env.vfs.node(env.cwd, file) {
            Some(Node::File(content)) => content,
            Some(Node::Directory(_)) => {
                return Err(BitosError::is_a_directory(file).in_command(editor));
            },
            None => {
                return Err(BitosError::usage(format!(
                    "{editor}: Cannot open file '{file}': No such file or directory"
                )));
            },
        };
        let lines = content.lines().count();
        let text = if editor == "nano" {
            format!("  GNU nano 7.2    {file}\n\n{content}\n\n[ Read {lines} lines ]")
        } else {
            format!("{content}\n~\n~\n\"{file}\" {lines}L, {}B", content.len())
        };
        Ok(CommandOutput::Text(text))
    }
}

// ---------------------------------------------------------------------------
// crontab / cron
// ---------------------------------------------------------------------------

const SPOOL: &str = "/var/spool/cron/crontabs";

const CRONTAB_USAGE: &str = "Usage: crontab [-u user] file\n   or: crontab [-u user] [ -e | -l | -r ]";

/// The crontab spool directory, created on first use.
fn spool_dir(env: &mut Environment<'_>) -> Result<CurrentDir> {
    let mut dir = CurrentDir::root();
    for name in SPOOL.split('/').filter(|s| !s.is_empty()) {
        if env.vfs.directory(&dir, name).is_none() {
            env.vfs.make_directory(&dir, name)?;
        }
        env.vfs.change_directory(&mut dir, name)?;
    }
    Ok(dir)
}

struct CrontabCmd;
impl Command for CrontabCmd {
    fn name(&self) -> &str {
        "crontab"
    }
    fn aliases(&self) -> &[&str] {
        &["cron"]
    }
    fn description(&self) -> &str {
        "Maintain crontab files for individual users"
    }
    fn usage(&self) -> &str {
        "crontab [-u user] <file | -l | -e | -r>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (user, args) = match args {
            ["-u", user, rest @ ..] => (*user, rest),
            _ => (env.user, args),
        };
        let installed = format!("{SPOOL}/{user}");
        let current = env.vfs.file_content(env.cwd, &installed);
        let text = match args.first() {
            None => return Err(BitosError::usage(CRONTAB_USAGE)),
            Some(&"-l") => match current {
                Some(table) => table.to_string(),
                None => return Err(BitosError::usage(format!("no crontab for {user}"))),
            },
            Some(&"-e") => match current {
                Some(_) => "crontab: no changes made to crontab".to_string(),
                None => format!("no crontab for {user} - using an empty one"),
            },
            Some(&"-r") => {
                if current.is_none() {
                    return Err(BitosError::usage(format!("no crontab for {user}")));
                }
                let spool = spool_dir(env).map_err(|e| e.in_command("crontab"))?;
                env.vfs
                    .remove(&spool, user, RemoveOptions::default())
                    .map_err(|e| e.in_command("crontab"))?;
                return Ok(CommandOutput::None);
            },
            Some(option) if option.starts_with('-') => {
                let letter = option.chars().nth(1).unwrap_or('-');
                return Err(BitosError::usage(format!(
                    "crontab: invalid option -- '{letter}'\n{CRONTAB_USAGE}"
                )));
            },
            Some(&file) => {
                let table = env
                    .vfs
                    .file_content(env.cwd, file)
                    .ok_or_else(|| BitosError::NotFound(file.to_string()).in_command("crontab"))?
                    .to_string();
                let spool = spool_dir(env).map_err(|e| e.in_command("crontab"))?;
                env.vfs
                    .create_or_overwrite_file(&spool, user, &table)
                    .map_err(|e| e.in_command("crontab"))?;
                return Ok(CommandOutput::None);
            },
        };
        Ok(CommandOutput::Text(text))
    }
}
