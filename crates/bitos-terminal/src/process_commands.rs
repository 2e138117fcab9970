//! Process management commands: kill, killall, nice, renice, bg, fg, jobs,
//! nohup.
//!
//! Signals go nowhere. Processes are looked up in the same table `ps`
//! prints, and anything owned by root is off limits.

use bitos_types::error::{BitosError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};
use crate::system_commands::{PROCESSES, Process};

/// Register process commands into a registry.
pub fn register_process_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(KillCmd));
    reg.register(Box::new(KillallCmd));
    reg.register(Box::new(NiceCmd));
    reg.register(Box::new(ReniceCmd));
    reg.register(Box::new(BgCmd));
    reg.register(Box::new(FgCmd));
    reg.register(Box::new(JobsCmd));
    reg.register(Box::new(NohupCmd));
}

fn find_pid(pid: u32) -> Option<&'static Process> {
    PROCESSES.iter().find(|p| p.pid() == pid)
}

const SIGNALS: &str = " 1) SIGHUP       2) SIGINT       3) SIGQUIT      4) SIGILL       5) SIGTRAP
 6) SIGABRT      7) SIGBUS       8) SIGFPE       9) SIGKILL     10) SIGUSR1
11) SIGSEGV     12) SIGUSR2     13) SIGPIPE     14) SIGALRM     15) SIGTERM
16) SIGSTKFLT   17) SIGCHLD     18) SIGCONT     19) SIGSTOP     20) SIGTSTP
21) SIGTTIN     22) SIGTTOU     23) SIGURG      24) SIGXCPU     25) SIGXFSZ
26) SIGVTALRM   27) SIGPROF     28) SIGWINCH    29) SIGIO       30) SIGPWR
31) SIGSYS      34) SIGRTMIN    35) SIGRTMIN+1  36) SIGRTMIN+2  37) SIGRTMIN+3
38) SIGRTMIN+4  39) SIGRTMIN+5  40) SIGRTMIN+6  41) SIGRTMIN+7  42) SIGRTMIN+8
43) SIGRTMIN+9  44) SIGRTMIN+10 45) SIGRTMIN+11 46) SIGRTMIN+12 47) SIGRTMIN+13
48) SIGRTMIN+14 49) SIGRTMIN+15 50) SIGRTMAX-14 51) SIGRTMAX-13 52) SIGRTMAX-12
53) SIGRTMAX-11 54) SIGRTMAX-10 55) SIGRTMAX-9  56) SIGRTMAX-8  57) SIGRTMAX-7
58) SIGRTMAX-6  59) SIGRTMAX-5  60) SIGRTMAX-4  61) SIGRTMAX-3  62) SIGRTMAX-2
63) SIGRTMAX-1  64) SIGRTMAX";

const JOB_LINE: &str = "[1]+  Running                 sleep 100 &";

// ---------------------------------------------------------------------------
// kill
// ---------------------------------------------------------------------------

struct KillCmd;
impl Command for KillCmd {
    fn name(&self) -> &str {
        "kill"
    }
    fn description(&self) -> &str {
        "Send a signal to a process"
    }
    fn usage(&self) -> &str {
        "kill [-signal] <pid...> | kill -l"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    kill - send a signal to a process\n\nSYNOPSIS\n    kill [-signal] pid...\n    kill -l\n\nDESCRIPTION\n    The default signal for kill is TERM. Use -l to list available signals.",
        )
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let pids = match args {
            [] => {
                return Err(BitosError::usage(
                    "kill: usage: kill [-s sigspec | -n signum | -sigspec] pid | jobspec ... or kill -l [sigspec]",
                ));
            },
            ["-l", ..] => return Ok(CommandOutput::Text(SIGNALS.to_string())),
            [signal, rest @ ..] if signal.starts_with('-') => rest,
            all => all,
        };
        if pids.is_empty() {
            return Err(BitosError::usage(
                "kill: usage: kill [-s sigspec | -n signum | -sigspec] pid | jobspec ... or kill -l [sigspec]",
            ));
        }
        for &arg in pids {
            let Ok(pid) = arg.parse::<u32>() else {
                return Err(BitosError::usage(format!(
                    "kill: {arg}: arguments must be process or job IDs"
                )));
            };
            match find_pid(pid) {
                Some(p) if p.user() == "root" => {
                    return Err(BitosError::usage(format!(
                        "kill: ({pid}) - Operation not permitted"
                    )));
                },
                Some(_) => {},
                None if pid < 100 => {
                    return Err(BitosError::usage(format!(
                        "kill: ({pid}) - Operation not permitted"
                    )));
                },
                None => {
                    return Err(BitosError::usage(format!("kill: ({pid}) - No such process")));
                },
            }
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// killall
// ---------------------------------------------------------------------------

struct KillallCmd;
impl Command for KillallCmd {
    fn name(&self) -> &str {
        "killall"
    }
    fn description(&self) -> &str {
        "Kill processes by name"
    }
    fn usage(&self) -> &str {
        "killall [-signal] <name>"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&name) = args.iter().find(|a| !a.starts_with('-')) else {
            return Err(BitosError::usage(
                "killall: usage: killall [-u user] [-signal] process ...",
            ));
        };
        if matches!(name, "init" | "systemd" | "bash") {
            return Err(BitosError::usage(format!(
                "killall: {name}: Operation not permitted"
            )));
        }
        match PROCESSES.iter().find(|p| p.command() == name) {
            Some(p) if p.user() == "root" => Err(BitosError::usage(format!(
                "killall: {name}: Operation not permitted"
            ))),
            Some(_) => Ok(CommandOutput::None),
            None => Err(BitosError::usage(format!("{name}: no process found"))),
        }
    }
}

// ---------------------------------------------------------------------------
// nice / renice
// ---------------------------------------------------------------------------

fn parse_niceness(value: &str, program: &str) -> Result<i32> {
    match value.parse::<i32>() {
        Ok(n) if (-20..=19).contains(&n) => Ok(n),
        _ => Err(BitosError::usage(format!(
            "{program}: invalid adjustment `{value}'"
        ))),
    }
}

struct NiceCmd;
impl Command for NiceCmd {
    fn name(&self) -> &str {
        "nice"
    }
    fn description(&self) -> &str {
        "Run a program with modified scheduling priority"
    }
    fn usage(&self) -> &str {
        "nice [-n adjustment] <command>"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let command = match args {
            [] => {
                return Err(BitosError::usage(
                    "nice: usage: nice [-n adjustment] [command [arg]...]",
                ));
            },
            ["-n"] => return Err(BitosError::usage("nice: option requires an argument -- 'n'")),
            ["-n", adjustment, rest @ ..] => {
                parse_niceness(adjustment, "nice")?;
                match rest.first() {
                    Some(&command) => command,
                    // Without a command, nice prints the current niceness.
                    None => return Ok(CommandOutput::Text("0".to_string())),
                }
            },
            [command, ..] => *command,
        };
        Err(BitosError::usage(format!("{command}: command not found")))
    }
}

struct ReniceCmd;
impl Command for ReniceCmd {
    fn name(&self) -> &str {
        "renice"
    }
    fn description(&self) -> &str {
        "Alter priority of running processes"
    }
    fn usage(&self) -> &str {
        "renice [-n] <priority> [-p] <pid>"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let rest: Vec<&str> = args
            .iter()
            .copied()
            .filter(|a| *a != "-n" && *a != "-p")
            .collect();
        let [priority, pid, ..] = rest.as_slice() else {
            return Err(BitosError::usage(
                "renice: usage: renice [-n] priority [[-p] pid ...] [[-g] pgrp ...] [[-u] user ...]",
            ));
        };
        parse_niceness(priority, "renice")?;
        if pid.parse::<u32>().ok().and_then(find_pid).is_none() {
            return Err(BitosError::usage(format!(
                "renice: failed to get priority for {pid} (process ID): No such process"
            )));
        }
        Ok(CommandOutput::Text(format!(
            "{pid} (process ID) old priority 0, new priority {priority}"
        )))
    }
}

// ---------------------------------------------------------------------------
// jobs / bg / fg
// ---------------------------------------------------------------------------

fn check_jobspec(args: &[&str], program: &str) -> Result<()> {
    match args.first() {
        None | Some(&"%1") | Some(&"1") | Some(&"%+") | Some(&"%%") => Ok(()),
        Some(other) => Err(BitosError::usage(format!("{program}: {other}: no such job"))),
    }
}

struct JobsCmd;
impl Command for JobsCmd {
    fn name(&self) -> &str {
        "jobs"
    }
    fn description(&self) -> &str {
        "Display status of jobs"
    }
    fn usage(&self) -> &str {
        "jobs"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(JOB_LINE.to_string()))
    }
}

struct BgCmd;
impl Command for BgCmd {
    fn name(&self) -> &str {
        "bg"
    }
    fn description(&self) -> &str {
        "Move jobs to the background"
    }
    fn usage(&self) -> &str {
        "bg [job]"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        check_jobspec(args, "bg")?;
        Ok(CommandOutput::Text("[1]+ sleep 100 &".to_string()))
    }
}

struct FgCmd;
impl Command for FgCmd {
    fn name(&self) -> &str {
        "fg"
    }
    fn description(&self) -> &str {
        "Move jobs to the foreground"
    }
    fn usage(&self) -> &str {
        "fg [job]"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        check_jobspec(args, "fg")?;
        Ok(CommandOutput::Text("sleep 100".to_string()))
    }
}

// ---------------------------------------------------------------------------
// nohup
// ---------------------------------------------------------------------------

struct NohupCmd;
impl Command for NohupCmd {
    fn name(&self) -> &str {
        "nohup"
    }
    fn description(&self) -> &str {
        "Run a command immune to hangups"
    }
    fn usage(&self) -> &str {
        "nohup <command> [args...]"
    }
    fn category(&self) -> &str {
        "process"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(BitosError::usage("nohup: usage: nohup COMMAND [ARG]..."));
        }
        if env.vfs.file_content(env.cwd, "nohup.out").is_none() {
            env.vfs
                .create_or_overwrite_file(env.cwd, "nohup.out", "")
                .map_err(|e| e.in_command("nohup"))?;
        }
        Ok(CommandOutput::Text(
            "nohup: ignoring input and appending output to 'nohup.out'".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;

    #[test]
    fn kill_rules() {
        let mut sh = testing::shell();
        assert!(sh.execute("kill").starts_with("kill: usage:"));
        assert!(sh.execute("kill -l").ends_with("64) SIGRTMAX"));
        assert_eq!(sh.execute("kill 1337"), "");
        assert_eq!(sh.execute("kill -9 1024"), "");
        assert_eq!(sh.execute("kill 1"), "kill: (1) - Operation not permitted");
        assert_eq!(sh.execute("kill 42"), "kill: (42) - Operation not permitted");
        assert_eq!(sh.execute("kill 4242"), "kill: (4242) - No such process");
        assert_eq!(
            sh.execute("kill abc"),
            "kill: abc: arguments must be process or job IDs"
        );
        assert!(sh.execute("kill -9").starts_with("kill: usage:"));
    }

    #[test]
    fn killall_by_name() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("killall browser"), "");
        assert_eq!(sh.execute("killall bash"), "killall: bash: Operation not permitted");
        assert_eq!(
            sh.execute("killall kthreadd"),
            "killall: kthreadd: Operation not permitted"
        );
        assert_eq!(sh.execute("killall firefox"), "firefox: no process found");
        assert!(sh.execute("killall").starts_with("killall: usage:"));
    }

    #[test]
    fn nice_and_renice() {
        let mut sh = testing::shell();
        assert!(sh.execute("nice").starts_with("nice: usage:"));
        assert_eq!(sh.execute("nice -n 10"), "0");
        assert_eq!(sh.execute("nice -n 10 make"), "make: command not found");
        assert_eq!(sh.execute("nice -n 99 make"), "nice: invalid adjustment `99'");
        assert_eq!(
            sh.execute("renice -n 5 -p 1024"),
            "1024 (process ID) old priority 0, new priority 5"
        );
        assert_eq!(
            sh.execute("renice 5 777"),
            "renice: failed to get priority for 777 (process ID): No such process"
        );
        assert!(sh.execute("renice 5").starts_with("renice: usage:"));
    }

    #[test]
    fn job_control() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("jobs"), "[1]+  Running                 sleep 100 &");
        assert_eq!(sh.execute("bg"), "[1]+ sleep 100 &");
        assert_eq!(sh.execute("fg %1"), "sleep 100");
        assert_eq!(sh.execute("fg %2"), "fg: %2: no such job");
    }

    #[test]
    fn nohup_creates_output_file() {
        let mut sh = testing::shell();
        assert_eq!(
            sh.execute("nohup sleep 100"),
            "nohup: ignoring input and appending output to 'nohup.out'"
        );
        assert!(sh.execute("ls").contains("nohup.out"));
        assert!(sh.execute("nohup").starts_with("nohup: usage:"));
    }
}
