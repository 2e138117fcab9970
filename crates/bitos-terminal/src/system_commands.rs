//! System commands: uname, ps, free, df, uptime, date, clear, top, reboot.

use bitos_types::error::{BitosError, Result};
use chrono::format::{Item, StrftimeItems};
use rand::Rng;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Register system commands into a registry.
pub fn register_system_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(UnameCmd));
    reg.register(Box::new(PsCmd));
    reg.register(Box::new(FreeCmd));
    reg.register(Box::new(DfCmd));
    reg.register(Box::new(UptimeCmd));
    reg.register(Box::new(DateCmd));
    reg.register(Box::new(ClearCmd));
    reg.register(Box::new(TopCmd));
    reg.register(Box::new(RebootCmd));
}

pub(crate) const KERNEL_RELEASE: &str = "5.15.0-bitos";

/// `H:MM`, prefixed with days when the machine has been up that long.
fn uptime_span(secs: u64, days_suffix: &str) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}{days_suffix}, "));
    }
    out.push_str(&format!("{hours}:{minutes:02}"));
    out
}

/// Users count and three load averages.
fn load_figures(env: &mut Environment<'_>) -> (u32, f64, f64, f64) {
    (
        env.rng.random_range(1..=3),
        env.rng.random_range(0.0..1.5),
        env.rng.random_range(0.0..1.0),
        env.rng.random_range(0.0..0.8),
    )
}

fn plural(n: u32) -> &'static str {
    if n > 1 { "s" } else { "" }
}

// ---------------------------------------------------------------------------
// uname
// ---------------------------------------------------------------------------

struct UnameCmd;
impl Command for UnameCmd {
    fn name(&self) -> &str {
        "uname"
    }
    fn aliases(&self) -> &[&str] {
        &["ver"]
    }
    fn description(&self) -> &str {
        "Print system information"
    }
    fn usage(&self) -> &str {
        "uname [-a|-s|-n|-r|-m]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    uname - print system information\n\nSYNOPSIS\n    uname [OPTION]...\n\nDESCRIPTION\n    Print certain system information. With no OPTION, same as -s.\n    -a, --all    print all information",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let text = match args.first().copied() {
            None | Some("-s") => "BitOS".to_string(),
            Some("-a" | "--all") => {
                "BitOS Browser 1.0.0 #1 SMP PREEMPT Wed Apr 17 00:00:00 UTC 2025 x86_64 JavaScript/ECMAScript"
                    .to_string()
            },
            Some("-n") => env.hostname.to_string(),
            Some("-r") => KERNEL_RELEASE.to_string(),
            Some("-m") => "x86_64".to_string(),
            Some(other) => {
                return Err(BitosError::usage(format!(
                    "uname: invalid option -- '{}'\nTry 'uname --help' for more information.",
                    other.trim_start_matches('-')
                )));
            },
        };
        Ok(CommandOutput::Text(text))
    }
}

// ---------------------------------------------------------------------------
// ps
// ---------------------------------------------------------------------------

pub(crate) struct Process {
    pid: u32,
    user: &'static str,
    cpu: f32,
    mem: f32,
    vsz: u32,
    rss: u32,
    tty: &'static str,
    stat: &'static str,
    start: &'static str,
    time: &'static str,
    command: &'static str,
}

const fn kernel_thread(pid: u32, stat: &'static str, time: &'static str, command: &'static str) -> Process {
    Process {
        pid,
        user: "root",
        cpu: 0.0,
        mem: 0.0,
        vsz: 0,
        rss: 0,
        tty: "?",
        stat,
        start: "00:00",
        time,
        command,
    }
}

/// The simulated process table, shared with the process commands.
pub(crate) const PROCESSES: &[Process] = &[
    Process {
        pid: 1,
        user: "root",
        cpu: 0.1,
        mem: 0.5,
        vsz: 4680,
        rss: 1360,
        tty: "?",
        stat: "Ss",
        start: "00:00",
        time: "0:02",
        command: "init",
    },
    kernel_thread(2, "S", "0:00", "kthreadd"),
    kernel_thread(3, "S", "0:00", "ksoftirqd/0"),
    kernel_thread(5, "S<", "0:00", "kworker/0:0H"),
    kernel_thread(7, "S", "0:01", "rcu_sched"),
    kernel_thread(8, "S", "0:00", "rcu_bh"),
    kernel_thread(9, "S", "0:00", "migration/0"),
    Process {
        pid: 400,
        user: "user",
        cpu: 1.2,
        mem: 2.5,
        vsz: 56892,
        rss: 15432,
        tty: "pts/0",
        stat: "Ss",
        start: "08:16",
        time: "0:05",
        command: "bash",
    },
    Process {
        pid: 1024,
        user: "user",
        cpu: 5.0,
        mem: 8.0,
        vsz: 1458200,
        rss: 246000,
        tty: "?",
        stat: "Sl",
        start: "08:20",
        time: "1:12",
        command: "browser",
    },
    Process {
        pid: 1337,
        user: "user",
        cpu: 2.5,
        mem: 4.0,
        vsz: 985600,
        rss: 124800,
        tty: "?",
        stat: "Sl",
        start: "08:25",
        time: "0:45",
        command: "bitos-terminal",
    },
];

impl Process {
    pub(crate) fn pid(&self) -> u32 {
        self.pid
    }

    pub(crate) fn command(&self) -> &'static str {
        self.command
    }

    pub(crate) fn user(&self) -> &'static str {
        self.user
    }
}

struct PsCmd;
impl Command for PsCmd {
    fn name(&self) -> &str {
        "ps"
    }
    fn aliases(&self) -> &[&str] {
        &["tasklist"]
    }
    fn description(&self) -> &str {
        "Report a snapshot of current processes"
    }
    fn usage(&self) -> &str {
        "ps [aux]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut out = String::from("  PID USER     %CPU %MEM    VSZ   RSS TTY  STAT START TIME CMD");
        for p in PROCESSES {
            out.push_str(&format!(
                "\n{:>5} {:<8} {:<5} {:<4} {:<7} {:<5} {:<4} {:<4} {:<5} {:<5} {}",
                p.pid,
                p.user,
                format!("{:.1}", p.cpu),
                format!("{:.1}", p.mem),
                p.vsz,
                p.rss,
                p.tty,
                p.stat,
                p.start,
                p.time,
                p.command
            ));
        }
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// free
// ---------------------------------------------------------------------------

const TOTAL_MEM_MB: u32 = 16_384;

struct FreeCmd;
impl Command for FreeCmd {
    fn name(&self) -> &str {
        "free"
    }
    fn aliases(&self) -> &[&str] {
        &["mem"]
    }
    fn description(&self) -> &str {
        "Display amount of free and used memory"
    }
    fn usage(&self) -> &str {
        "free"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let total = TOTAL_MEM_MB;
        let used = env.rng.random_range(4096..4096 + 8192);
        let free = total - used;
        let shared = env.rng.random_range(0..512u32);
        let buffers = env.rng.random_range(0..1024u32);
        let cached = env.rng.random_range(2048..4096u32);
        let swap = total / 2;
        let swap_used = env.rng.random_range(0..1024u32);

        let mut out =
            String::from("            total     used     free   shared buff/cache available\n");
        out.push_str(&format!(
            "Mem:       {total:>7} {used:>8} {free:>8} {shared:>8} {:>9} {:>9}\n",
            buffers + cached,
            free + buffers + cached
        ));
        out.push_str(&format!(
            "Swap:      {swap:>7} {swap_used:>8} {:>8}",
            swap - swap_used
        ));
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// df
// ---------------------------------------------------------------------------

/// Size in MiB rendered the way `df -h` abbreviates it.
fn format_size(mib: u32) -> String {
    if mib < 1024 {
        format!("{mib}M")
    } else {
        format!("{:.1}G", f64::from(mib) / 1024.0)
    }
}

struct Mount {
    fs: &'static str,
    kind: &'static str,
    size: u32,
    used: u32,
    mountpoint: &'static str,
}

const MOUNTS: &[Mount] = &[
    Mount {
        fs: "/dev/sda1",
        kind: "ext4",
        size: 512 * 1024,
        used: 128 * 1024,
        mountpoint: "/",
    },
    Mount {
        fs: "/dev/sda2",
        kind: "ext4",
        size: 1024 * 1024,
        used: 512 * 1024,
        mountpoint: "/home",
    },
    Mount {
        fs: "tmpfs",
        kind: "tmpfs",
        size: 8 * 1024,
        used: 0,
        mountpoint: "/tmp",
    },
    Mount {
        fs: "devtmpfs",
        kind: "devtmpfs",
        size: 4 * 1024,
        used: 0,
        mountpoint: "/dev",
    },
];

struct DfCmd;
impl Command for DfCmd {
    fn name(&self) -> &str {
        "df"
    }
    fn aliases(&self) -> &[&str] {
        &["diskspace"]
    }
    fn description(&self) -> &str {
        "Report file system disk space usage"
    }
    fn usage(&self) -> &str {
        "df [-h]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut out = String::from("Filesystem  Type   Size Used Avail Use% Mounted on");
        for m in MOUNTS {
            let avail = m.size - m.used;
            let pct = m.used * 100 / m.size;
            out.push_str(&format!(
                "\n{:<12} {:<6} {:<5} {:<5} {:<5} {:<3}% {}",
                m.fs,
                m.kind,
                format_size(m.size),
                format_size(m.used),
                format_size(avail),
                pct,
                m.mountpoint
            ));
        }
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// uptime
// ---------------------------------------------------------------------------

struct UptimeCmd;
impl Command for UptimeCmd {
    fn name(&self) -> &str {
        "uptime"
    }
    fn description(&self) -> &str {
        "Tell how long the system has been running"
    }
    fn usage(&self) -> &str {
        "uptime [-p]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let secs = env.clock.uptime_secs();
        if args.first() == Some(&"-p") {
            let (days, hours, minutes) = (secs / 86_400, (secs % 86_400) / 3_600, (secs % 3_600) / 60);
            let mut parts = Vec::new();
            if days > 0 {
                parts.push(format!("{days} day{}", if days > 1 { "s" } else { "" }));
            }
            if hours > 0 {
                parts.push(format!("{hours} hour{}", if hours > 1 { "s" } else { "" }));
            }
            parts.push(format!("{minutes} minute{}", if minutes == 1 { "" } else { "s" }));
            return Ok(CommandOutput::Text(format!("up {}", parts.join(", "))));
        }
        let now = env.clock.now().format("%H:%M:%S");
        let (users, l1, l5, l15) = load_figures(env);
        Ok(CommandOutput::Text(format!(
            " {now} up {}, {users} user{}, load average: {l1:.2}, {l5:.2}, {l15:.2}",
            uptime_span(secs, if secs >= 2 * 86_400 { " days" } else { " day" }),
            plural(users)
        )))
    }
}

// ---------------------------------------------------------------------------
// date
// ---------------------------------------------------------------------------

struct DateCmd;
impl Command for DateCmd {
    fn name(&self) -> &str {
        "date"
    }
    fn aliases(&self) -> &[&str] {
        &["time"]
    }
    fn description(&self) -> &str {
        "Print the system date and time"
    }
    fn usage(&self) -> &str {
        "date [+FORMAT]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let now = env.clock.now();
        let format = match args.first() {
            Some(arg) => match arg.strip_prefix('+') {
                Some(format) => format.to_string(),
                None => {
                    return Err(BitosError::usage(format!("date: invalid date '{arg}'")));
                },
            },
            None => "%a %b %e %H:%M:%S UTC %Y".to_string(),
        };
        // Formatting with an invalid specifier would fail at display time.
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(BitosError::usage(format!("date: invalid format '+{format}'")));
        }
        Ok(CommandOutput::Text(now.format(&format).to_string()))
    }
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

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
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Clear)
    }
}

// ---------------------------------------------------------------------------
// top
// ---------------------------------------------------------------------------

const TOP_BODY: &str = "Tasks: 110 total,   1 running, 109 sleeping,   0 stopped,   0 zombie
%Cpu(s):  5.9 us,  2.0 sy,  0.0 ni, 91.7 id,  0.4 wa,  0.0 hi,  0.0 si
MiB Mem :  16384.0 total,   8192.0 free,   6144.0 used,   2048.0 buff/cache
MiB Swap:   8192.0 total,   8192.0 free,      0.0 used.  10240.0 avail Mem

  PID USER     PR NI    VIRT    RES    SHR S %CPU %MEM  TIME+ COMMAND
    1 root     20  0    4680   1360   1080 S  0.0  0.0  0:02 init
    2 root     20  0       0      0      0 S  0.0  0.0  0:00 kthreadd
    3 root     20  0       0      0      0 S  0.0  0.0  0:00 ksoftirqd/0
    5 root     20  0       0      0      0 S  0.0  0.0  0:00 kworker/0:0H
    7 root     20  0       0      0      0 S  0.0  0.0  0:01 rcu_sched
    8 root     20  0       0      0      0 S  0.0  0.0  0:00 rcu_bh
    9 root     20  0       0      0      0 S  0.0  0.0  0:00 migration/0
  400 user     20  0   56892  15432   8760 S  1.2  0.1  0:05 bash
 1024 user     20  0 1458200 246000 112000 S  5.0  1.5  1:12 browser
 1337 user     20  0  985600 124800  76800 R  2.5  0.8  0:45 bitos-terminal";

struct TopCmd;
impl Command for TopCmd {
    fn name(&self) -> &str {
        "top"
    }
    fn description(&self) -> &str {
        "Display Linux processes"
    }
    fn usage(&self) -> &str {
        "top"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let now = env.clock.now().format("%H:%M:%S");
        let span = uptime_span(env.clock.uptime_secs(), "d");
        let (users, l1, l5, l15) = load_figures(env);
        Ok(CommandOutput::Text(format!(
            "top - {now} up {span}, {users} user{}, load: {l1:.2}, {l5:.2}, {l15:.2}\n{TOP_BODY}",
            plural(users)
        )))
    }
}

// ---------------------------------------------------------------------------
// reboot / shutdown
// ---------------------------------------------------------------------------

struct RebootCmd;
impl Command for RebootCmd {
    fn name(&self) -> &str {
        "reboot"
    }
    fn aliases(&self) -> &[&str] {
        &["shutdown"]
    }
    fn description(&self) -> &str {
        "Reboot or power off the machine"
    }
    fn usage(&self) -> &str {
        "reboot"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(
            "Cannot reboot/shutdown. This is a browser-based simulation.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::CLEAR_SENTINEL;
    use crate::testing;

    #[test]
    fn uname_variants() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("uname"), "BitOS");
        assert!(sh.execute("ver -a").starts_with("BitOS Browser 1.0.0 #1 SMP PREEMPT"));
        assert_eq!(sh.execute("uname -r"), KERNEL_RELEASE);
        assert_eq!(sh.execute("uname -n"), "bitos");
        assert!(sh.execute("uname -z").starts_with("uname: invalid option -- 'z'"));
    }

    #[test]
    fn ps_table_layout() {
        let mut sh = testing::shell();
        let out = sh.execute("tasklist");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), PROCESSES.len() + 1);
        assert_eq!(
            lines[1],
            "    1 root     0.1   0.5  4680    1360  ?    Ss   00:00 0:02  init"
        );
        assert!(lines[10].ends_with("bitos-terminal"));
    }

    #[test]
    fn free_rows_add_up() {
        let mut sh = testing::shell();
        let out = sh.execute("mem");
        let mem: Vec<u32> = out
            .lines()
            .nth(1)
            .unwrap()
            .split_whitespace()
            .skip(1)
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(mem[0], TOTAL_MEM_MB);
        assert_eq!(mem[1] + mem[2], TOTAL_MEM_MB);
        assert!((4096..12288).contains(&mem[1]));
        assert!(out.lines().nth(2).unwrap().starts_with("Swap:         8192"));
    }

    #[test]
    fn df_sizes() {
        let mut sh = testing::shell();
        let out = sh.execute("diskspace");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Filesystem  Type   Size Used Avail Use% Mounted on");
        assert_eq!(lines[1], "/dev/sda1    ext4   512.0G 128.0G 384.0G 25 % /");
        assert_eq!(lines[3], "tmpfs        tmpfs  8.0G  0M    8.0G  0  % /tmp");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512M");
        assert_eq!(format_size(1536), "1.5G");
    }

    #[test]
    fn uptime_uses_clock() {
        let mut sh = testing::shell();
        let out = sh.execute("uptime");
        assert!(out.starts_with(" 12:30:00 up 3:25, "), "{out}");
        assert!(out.contains("load average: "));
        assert_eq!(sh.execute("uptime -p"), "up 3 hours, 25 minutes");
    }

    #[test]
    fn uptime_span_with_days() {
        assert_eq!(uptime_span(3 * 86_400 + 4 * 3_600 + 12 * 60, " days"), "3 days, 4:12");
        assert_eq!(uptime_span(59, "d"), "0:00");
    }

    #[test]
    fn date_formats() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("date"), "Fri Mar  1 12:30:00 UTC 2024");
        assert_eq!(sh.execute("time +%Y-%m-%d"), "2024-03-01");
        assert_eq!(sh.execute("date tomorrow"), "date: invalid date 'tomorrow'");
        assert!(sh.execute("date +%Q").starts_with("date: invalid format"));
    }

    #[test]
    fn clear_and_reboot() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("cls"), CLEAR_SENTINEL);
        assert_eq!(
            sh.execute("shutdown now"),
            "Cannot reboot/shutdown. This is a browser-based simulation."
        );
    }

    #[test]
    fn top_header_and_table() {
        let mut sh = testing::shell();
        let out = sh.execute("top");
        assert!(out.starts_with("top - 12:30:00 up 3:25, "));
        assert!(out.contains("Tasks: 110 total"));
        assert!(out.ends_with("bitos-terminal"));
    }
}
