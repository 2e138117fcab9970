//! Kernel debugging commands: dmesg, sysctl, lsmod, strace, lsof, vmstat,
//! iostat.
//!
//! `dmesg` and `lsmod` read their data from the seeded `/var/log` and
//! `/proc` files, so editing those files changes what they print.

use bitos_types::error::{BitosError, Result};
use bitos_vfs::CurrentDir;
use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, split_flags};
use crate::system_commands::KERNEL_RELEASE;

/// Register kernel commands into a registry.
pub fn register_kernel_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(DmesgCmd));
    reg.register(Box::new(SysctlCmd));
    reg.register(Box::new(LsmodCmd));
    reg.register(Box::new(StraceCmd));
    reg.register(Box::new(LsofCmd));
    reg.register(Box::new(VmstatCmd));
    reg.register(Box::new(IostatCmd));
}

const DMESG_DIR: &str = "/var/log";
const DMESG_FILE: &str = "dmesg.log";
const MODULES_PATH: &str = "/proc/modules";

// ---------------------------------------------------------------------------
// dmesg
// ---------------------------------------------------------------------------

/// Split `[    1.100000] message` into seconds and the rest of the line.
fn split_timestamp(line: &str) -> Option<(f64, &str)> {
    let rest = line.strip_prefix('[')?;
    let (stamp, tail) = rest.split_once(']')?;
    let secs = stamp.trim().parse::<f64>().ok()?;
    Some((secs, tail))
}

/// `boot` shifted by `secs`, or `None` when the stamp is not finite or
/// lands outside the representable range.
fn stamp_after_boot(boot: DateTime<Utc>, secs: f64) -> Option<DateTime<Utc>> {
    let millis = (secs * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    boot.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}

struct DmesgCmd;
impl Command for DmesgCmd {
    fn name(&self) -> &str {
        "dmesg"
    }
    fn description(&self) -> &str {
        "Print or control the kernel ring buffer"
    }
    fn usage(&self) -> &str {
        "dmesg [-c] [-H]"
    }
    fn category(&self) -> &str {
        "kernel"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    dmesg - print or control the kernel ring buffer\n\nSYNOPSIS\n    dmesg [options]\n\nDESCRIPTION\n    dmesg is used to examine or control the kernel ring buffer.\n    -c    clear the ring buffer\n    -H    enable human-readable output",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let path = format!("{DMESG_DIR}/{DMESG_FILE}");
        let Some(log) = env.vfs.file_content(env.cwd, &path) else {
            return Err(BitosError::usage("Error: Could not read kernel messages"));
        };

        if args.contains(&"-c") {
            let mut log_dir = CurrentDir::root();
            env.vfs.change_directory(&mut log_dir, DMESG_DIR)?;
            env.vfs.create_or_overwrite_file(&log_dir, DMESG_FILE, "")?;
            log::debug!("dmesg ring buffer cleared");
            return Ok(CommandOutput::Text("dmesg: kernel ring buffer cleared".to_string()));
        }

        if args.contains(&"-H") || args.contains(&"--human") {
            let uptime = i64::try_from(env.clock.uptime_secs()).unwrap_or(i64::MAX);
            let now = env.clock.now();
            let boot = Duration::try_seconds(uptime)
                .and_then(|up| now.checked_sub_signed(up))
                .unwrap_or(now);
            let lines: Vec<String> = log
                .lines()
                .map(|line| {
                    match split_timestamp(line).and_then(|(secs, tail)| {
                        Some((stamp_after_boot(boot, secs)?, tail))
                    }) {
                        Some((at, tail)) => {
                            format!("[{}]{tail}", at.to_rfc3339_opts(SecondsFormat::Millis, true))
                        },
                        None => line.to_string(),
                    }
                })
                .collect();
            return Ok(CommandOutput::Text(lines.join("\n")));
        }

        Ok(CommandOutput::Text(log.to_string()))
    }
}

// ---------------------------------------------------------------------------
// sysctl
// ---------------------------------------------------------------------------

fn sysctl_params(hostname: &str) -> Vec<(&'static str, String)> {
    vec![
        ("kernel.hostname", hostname.to_string()),
        ("kernel.ostype", "Linux".to_string()),
        ("kernel.osrelease", KERNEL_RELEASE.to_string()),
        ("kernel.version", "#1 SMP PREEMPT".to_string()),
        ("kernel.sysrq", "1".to_string()),
        ("net.ipv4.ip_forward", "1".to_string()),
        ("net.ipv4.tcp_syncookies", "1".to_string()),
        ("net.ipv6.conf.all.disable_ipv6", "0".to_string()),
        ("vm.swappiness", "60".to_string()),
        ("fs.file-max", "65536".to_string()),
    ]
}

struct SysctlCmd;
impl Command for SysctlCmd {
    fn name(&self) -> &str {
        "sysctl"
    }
    fn description(&self) -> &str {
        "Configure kernel parameters at runtime"
    }
    fn usage(&self) -> &str {
        "sysctl [-a] [-w key=value] [key]"
    }
    fn category(&self) -> &str {
        "kernel"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    sysctl - configure kernel parameters at runtime\n\nSYNOPSIS\n    sysctl [options] [variable[=value]] [...]\n\nDESCRIPTION\n    sysctl is used to modify kernel parameters at runtime.\n    -a    display all values currently available\n    -w    use this option when you want to change a sysctl setting",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let params = sysctl_params(env.hostname);
        match args {
            [] | ["-a", ..] => {
                let lines: Vec<String> = params.iter().map(|(k, v)| format!("{k} = {v}")).collect();
                Ok(CommandOutput::Text(lines.join("\n")))
            },
            ["-w"] => Err(BitosError::usage("sysctl: option requires an argument -- 'w'")),
            ["-w", setting, ..] => match setting.split_once('=') {
                Some((key, value)) if !key.is_empty() && !value.contains('=') => {
                    Ok(CommandOutput::Text(format!("{key} = {value}")))
                },
                _ => Err(BitosError::usage("sysctl: invalid argument format")),
            },
            [param, ..] => match params.iter().find(|(k, _)| k == param) {
                Some((k, v)) => Ok(CommandOutput::Text(format!("{k} = {v}"))),
                None => Err(BitosError::usage(format!(
                    "sysctl: cannot stat {param}: No such file or directory"
                ))),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// lsmod / modinfo
// ---------------------------------------------------------------------------

struct LsmodCmd;
impl Command for LsmodCmd {
    fn name(&self) -> &str {
        "lsmod"
    }
    fn aliases(&self) -> &[&str] {
        &["modinfo"]
    }
    fn description(&self) -> &str {
        "Show the status of modules in the Linux Kernel"
    }
    fn usage(&self) -> &str {
        "lsmod | modinfo <module>"
    }
    fn category(&self) -> &str {
        "kernel"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    lsmod - show the status of modules in the Linux Kernel\n\nSYNOPSIS\n    lsmod\n\nDESCRIPTION\n    lsmod is a trivial program which nicely formats the contents of the\n    /proc/modules, showing what kernel modules are currently loaded.",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(modules) = env.vfs.file_content(env.cwd, MODULES_PATH) else {
            return Err(BitosError::usage("Error: Could not read modules information"));
        };

        let Some(&wanted) = args.first() else {
            if env.program == "modinfo" {
                return Err(BitosError::usage("modinfo: ERROR: missing module or filename."));
            }
            return Ok(CommandOutput::Text(modules.to_string()));
        };

        let found = modules
            .lines()
            .skip_while(|l| l.starts_with("Module"))
            .find(|l| l.split_whitespace().next() == Some(wanted));
        let Some(line) = found else {
            return Err(BitosError::usage(format!(
                "modinfo: ERROR: Module {wanted} not found."
            )));
        };
        let mut fields = line.split_whitespace();
        let name = fields.next().unwrap_or(wanted);
        let depends = fields.nth(2).unwrap_or("");
        Ok(CommandOutput::Text(format!(
            "filename:       /lib/modules/{KERNEL_RELEASE}/kernel/drivers/{name}.ko\n\
             version:        {KERNEL_RELEASE}\n\
             license:        GPL\n\
             description:    {} driver\n\
             author:         BitOS Kernel Team\n\
             srcversion:     8BAFD9832CAFB3324528121\n\
             depends:        {depends}\n\
             name:           {name}\n\
             vermagic:       {KERNEL_RELEASE} SMP preempt mod_unload\n\
             parm:           debug:Debug level (0-3) (int)",
            name.to_uppercase()
        )))
    }
}

// ---------------------------------------------------------------------------
// strace
// ---------------------------------------------------------------------------

const STRACE_LOADER: &str = r#"brk(NULL)                               = 0x55a7c4d33000
access("/etc/ld.so.preload", R_OK)      = -1 ENOENT (No such file or directory)
openat(AT_FDCWD, "/etc/ld.so.cache", O_RDONLY|O_CLOEXEC) = 3
fstat(3, {st_mode=S_IFREG|0644, st_size=67893, ...}) = 0
mmap(NULL, 67893, PROT_READ, MAP_PRIVATE, 3, 0) = 0x7f3bcd3f9000
close(3)                                = 0"#;

const STRACE_ATTACHED_TAIL: &str = r#"--- SIGCHLD {si_signo=SIGCHLD, si_code=CLD_EXITED, si_pid=1234, si_uid=1000, si_status=0, si_utime=0, si_stime=0} ---
wait4(-1, 0x7ffd2e127a74, WNOHANG, NULL) = 0
rt_sigreturn({mask=[]})                = 0
read(0, "e", 1)                         = 1
read(0, "x", 1)                         = 1
read(0, "i", 1)                         = 1
read(0, "t", 1)                         = 1
read(0, "\n", 1)                        = 1
write(1, "exit\n", 5)                    = 5
exit_group(0)                           = ?
+++ exited with 0 +++"#;

const STRACE_PROGRAM_TAIL: &str = r#"fstat(1, {st_mode=S_IFCHR|0620, st_rdev=makedev(0x88, 0), ...}) = 0
ioctl(1, TCGETS, {B38400 opost isig icanon echo ...}) = 0
write(1, "Hello, world!\n", 14)          = 14
exit_group(0)                           = ?
+++ exited with 0 +++"#;

struct StraceCmd;
impl Command for StraceCmd {
    fn name(&self) -> &str {
        "strace"
    }
    fn description(&self) -> &str {
        "Trace system calls and signals"
    }
    fn usage(&self) -> &str {
        "strace <command> | strace -p <pid>"
    }
    fn category(&self) -> &str {
        "kernel"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args {
            [] => Err(BitosError::usage("strace: must have PROG [ARGS] or -p PID")),
            ["-p"] => Err(BitosError::usage("strace: option requires an argument -- 'p'")),
            ["-p", pid, ..] => {
                if pid.parse::<u32>().is_err() {
                    return Err(BitosError::usage(format!("strace: Invalid process id: '{pid}'")));
                }
                Ok(CommandOutput::Text(format!(
                    "strace: Process {pid} attached\nexecve(\"/usr/bin/bash\", [\"bash\"], 0x7ffd2e127ed0 /* 56 vars */) = 0\n{STRACE_LOADER}\n{STRACE_ATTACHED_TAIL}"
                )))
            },
            [program, ..] => Ok(CommandOutput::Text(format!(
                "execve(\"/usr/bin/{program}\", [\"{program}\"], 0x7ffd2e127ed0 /* 56 vars */) = 0\n{STRACE_LOADER}\n{STRACE_PROGRAM_TAIL}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// lsof
// ---------------------------------------------------------------------------

const LSOF_TABLE: &str = "COMMAND     PID   USER   FD   TYPE DEVICE SIZE/OFF   NODE NAME
systemd       1   root  cwd    DIR    8,1     4096      2 /
systemd       1   root  rtd    DIR    8,1     4096      2 /
systemd       1   root  txt    REG    8,1  1620224 1835082 /lib/systemd/systemd
systemd       1   root  mem    REG    8,1   157224 1844865 /lib/x86_64-linux-gnu/libudev.so.1.6.17
bash        400   user  cwd    DIR    8,1     4096 1048578 /home/user
bash        400   user  rtd    DIR    8,1     4096      2 /
bash        400   user  txt    REG    8,1  1183448 1835337 /bin/bash
browser    1024   user  cwd    DIR    8,1     4096 1048578 /home/user
browser    1024   user  rtd    DIR    8,1     4096      2 /
browser    1024   user  txt    REG    8,1 15482216 1835429 /usr/lib/browser
browser    1024   user    0u   CHR  136,0      0t0      3 /dev/pts/0
browser    1024   user    1u   CHR  136,0      0t0      3 /dev/pts/0
browser    1024   user    2u   CHR  136,0      0t0      3 /dev/pts/0";

struct LsofCmd;
impl Command for LsofCmd {
    fn name(&self) -> &str {
        "lsof"
    }
    fn description(&self) -> &str {
        "List open files"
    }
    fn usage(&self) -> &str {
        "lsof [-p pid] [-u user]"
    }
    fn category(&self) -> &str {
        "kernel"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (flags, values) = split_flags(args);
        let column = match flags.first() {
            None => return Ok(CommandOutput::Text(LSOF_TABLE.to_string())),
            Some('p') => 1,
            Some('u') => 2,
            Some(other) => {
                return Err(BitosError::usage(format!("lsof: unsupported option: -{other}")));
            },
        };
        let Some(&value) = values.first() else {
            return Err(BitosError::usage("lsof: missing option value"));
        };
        let mut lines = LSOF_TABLE.lines();
        let mut out: Vec<&str> = lines.next().into_iter().collect();
        out.extend(lines.filter(|l| l.split_whitespace().nth(column) == Some(value)));
        Ok(CommandOutput::Text(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// vmstat / iostat
// ---------------------------------------------------------------------------

struct VmstatCmd;
impl Command for VmstatCmd {
    fn name(&self) -> &str {
        "vmstat"
    }
    fn description(&self) -> &str {
        "Report virtual memory statistics"
    }
    fn usage(&self) -> &str {
        "vmstat"
    }
    fn category(&self) -> &str {
        "kernel"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(
            "procs -----------memory---------- ---swap-- -----io---- -system-- ------cpu-----\n \
             r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st\n \
             1  0      0 8192000 512000 2048000    0    0    12    25  100  200  5  2 93  0  0"
                .to_string(),
        ))
    }
}

struct IostatCmd;
impl Command for IostatCmd {
    fn name(&self) -> &str {
        "iostat"
    }
    fn description(&self) -> &str {
        "Report CPU and I/O statistics"
    }
    fn usage(&self) -> &str {
        "iostat"
    }
    fn category(&self) -> &str {
        "kernel"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let date = env.clock.now().format("%m/%d/%Y");
        Ok(CommandOutput::Text(format!(
            "Linux {KERNEL_RELEASE} ({})    {date}    _x86_64_    (4 CPU)\n\n\
             avg-cpu:  %user   %nice %system %iowait  %steal   %idle\n           \
             5.25    0.00    1.75    0.00    0.00   93.00\n\n\
             Device             tps    kB_read/s    kB_wrtn/s    kB_read    kB_wrtn\n\
             sda               8.35        25.45        65.80     123456     318790\n\
             sdb               0.00         0.00         0.00          0          0",
            env.hostname
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use bitos_vfs::seed::DMESG_LOG;

    #[test]
    fn dmesg_prints_log() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("dmesg"), DMESG_LOG);
    }

    #[test]
    fn dmesg_clear_empties_buffer() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("dmesg -c"), "dmesg: kernel ring buffer cleared");
        assert_eq!(sh.execute("dmesg"), "");
        assert_eq!(sh.execute("cat /var/log/dmesg.log"), "");
        assert_eq!(sh.execute("pwd"), "/home/user");
    }

    #[test]
    fn dmesg_human_timestamps_count_from_boot() {
        let mut sh = testing::shell();
        let out = sh.execute("dmesg -H");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 15);
        assert!(lines[0].starts_with("[2024-03-01T09:05:00.000Z] Linux version 5.15.0-bitos"));
        assert_eq!(
            lines[14],
            "[2024-03-01T09:05:01.400Z] BitOS initialization complete"
        );
    }

    #[test]
    fn dmesg_human_keeps_out_of_range_stamps() {
        let mut sh = testing::shell();
        sh.execute("cd /var/log");
        sh.execute("touch dmesg.log [99999999999999] boom");
        assert_eq!(sh.execute("dmesg -H"), "[99999999999999] boom");
        sh.execute("touch dmesg.log [inf] boom");
        assert_eq!(sh.execute("dmesg -H"), "[inf] boom");
        sh.execute("touch dmesg.log [NaN] boom");
        assert_eq!(sh.execute("dmesg -H"), "[NaN] boom");
        sh.execute("touch dmesg.log [-1e300] boom");
        assert_eq!(sh.execute("dmesg -H"), "[-1e300] boom");
    }

    #[test]
    fn stamp_after_boot_rejects_overflow() {
        let boot = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(stamp_after_boot(boot, 1.5), Some(boot + Duration::milliseconds(1500)));
        assert_eq!(stamp_after_boot(boot, f64::INFINITY), None);
        assert_eq!(stamp_after_boot(boot, 9e18), None);
    }

    #[test]
    fn dmesg_missing_log() {
        let mut sh = testing::shell();
        sh.execute("cd /var/log");
        sh.execute("rm dmesg.log");
        assert_eq!(sh.execute("dmesg"), "Error: Could not read kernel messages");
    }

    #[test]
    fn split_timestamp_parses_prefix() {
        assert_eq!(
            split_timestamp("[    1.100000] eth0 up"),
            Some((1.1, " eth0 up"))
        );
        assert_eq!(split_timestamp("no stamp"), None);
    }

    #[test]
    fn sysctl_reads_and_writes() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("sysctl").lines().count(), 10);
        assert_eq!(sh.execute("sysctl -a"), sh.execute("sysctl"));
        assert_eq!(sh.execute("sysctl vm.swappiness"), "vm.swappiness = 60");
        assert_eq!(sh.execute("sysctl kernel.hostname"), "kernel.hostname = bitos");
        assert_eq!(
            sh.execute("sysctl -w net.ipv4.ip_forward=0"),
            "net.ipv4.ip_forward = 0"
        );
        assert_eq!(sh.execute("sysctl -w"), "sysctl: option requires an argument -- 'w'");
        assert_eq!(sh.execute("sysctl -w nonsense"), "sysctl: invalid argument format");
        assert_eq!(
            sh.execute("sysctl foo.bar"),
            "sysctl: cannot stat foo.bar: No such file or directory"
        );
    }

    #[test]
    fn lsmod_lists_proc_modules() {
        let mut sh = testing::shell();
        let out = sh.execute("lsmod");
        assert!(out.starts_with("Module                  Size  Used by"));
        assert!(out.contains("bluetooth             651264  0"));
    }

    #[test]
    fn modinfo_shows_module() {
        let mut sh = testing::shell();
        let out = sh.execute("modinfo ecc");
        assert!(out.starts_with("filename:       /lib/modules/5.15.0-bitos/kernel/drivers/ecc.ko"));
        assert!(out.contains("description:    ECC driver"));
        assert!(out.contains("depends:        ecdh_generic"));
        assert!(out.contains("name:           ecc\n"));
        assert_eq!(
            sh.execute("modinfo nope"),
            "modinfo: ERROR: Module nope not found."
        );
        assert_eq!(sh.execute("modinfo"), "modinfo: ERROR: missing module or filename.");
    }

    #[test]
    fn strace_modes() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("strace"), "strace: must have PROG [ARGS] or -p PID");
        let attached = sh.execute("strace -p 400");
        assert!(attached.starts_with("strace: Process 400 attached\nexecve(\"/usr/bin/bash\""));
        assert!(attached.ends_with("+++ exited with 0 +++"));
        let run = sh.execute("strace ls");
        assert!(run.starts_with("execve(\"/usr/bin/ls\", [\"ls\"]"));
        assert!(run.contains("write(1, \"Hello, world!\\n\", 14)"));
        assert_eq!(sh.execute("strace -p abc"), "strace: Invalid process id: 'abc'");
    }

    #[test]
    fn lsof_filters() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("lsof").lines().count(), 14);
        let bash = sh.execute("lsof -p 400");
        assert_eq!(bash.lines().count(), 4);
        assert!(bash.lines().skip(1).all(|l| l.starts_with("bash")));
        assert_eq!(sh.execute("lsof -u root").lines().count(), 5);
    }

    #[test]
    fn vmstat_and_iostat() {
        let mut sh = testing::shell();
        let vm = sh.execute("vmstat");
        assert_eq!(vm.lines().count(), 3);
        assert!(vm.lines().nth(1).is_some_and(|l| l.starts_with(" r  b   swpd")));
        let io = sh.execute("iostat");
        assert!(io.starts_with("Linux 5.15.0-bitos (bitos)    03/01/2024    _x86_64_    (4 CPU)"));
        assert!(io.contains("           5.25    0.00"));
    }
}
