//! The Debian-like snapshot every session starts from.

use crate::node::{Directory, Node};

const README: &str = "Welcome to BitOS!
This is a browser-based terminal simulation.";

const NETWORK_MD: &str = "# Network Diagnostics

Use `ping`, `traceroute`, and `ifconfig` commands to diagnose network issues.";

const KERNEL_MD: &str = "# Kernel Debugging

Use `dmesg`, `sysctl`, and `lsmod` commands to debug kernel issues.";

const HOSTS: &str = "127.0.0.1 localhost
::1 localhost";

const RESOLV_CONF: &str = "nameserver 8.8.8.8
nameserver 8.8.4.4";

const SYSCTL_CONF: &str = "# System configuration file
net.ipv4.ip_forward=1
kernel.sysrq=1";

const SYSTEM_LOG: &str = "System started successfully.
All services running normally.";

/// Kernel ring buffer, one message per line.
pub const DMESG_LOG: &str = "[    0.000000] Linux version 5.15.0-bitos (user@bitos) (gcc version 11.2.0) #1 SMP PREEMPT
[    0.100000] Command line: BOOT_IMAGE=/boot/vmlinuz-5.15.0-bitos root=UUID=1234-5678
[    0.200000] BIOS-provided physical RAM map
[    0.300000] Kernel command line: BOOT_IMAGE=/boot/vmlinuz-5.15.0-bitos root=UUID=1234-5678
[    0.400000] Initializing cgroup subsys cpuset
[    0.500000] Initializing cgroup subsys cpu
[    0.600000] NR_IRQS:16640 nr_irqs:552 16
[    0.700000] Console: colour VGA+ 80x25
[    0.800000] console [tty0] enabled
[    0.900000] Detected 2.4 GHz processor.
[    1.000000] Booting paravirtualized kernel on bare hardware
[    1.100000] Initialized network device eth0
[    1.200000] Initialized network device wlan0
[    1.300000] Mounted root filesystem
[    1.400000] BitOS initialization complete";

const CPUINFO: &str = "processor\t: 0
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 142
model name\t: Intel(R) Core(TM) i7-8565U CPU @ 1.80GHz
stepping\t: 11
microcode\t: 0xea
cpu MHz\t\t: 2000.000
cache size\t: 8192 KB
physical id\t: 0
siblings\t: 8
core id\t\t: 0
cpu cores\t: 4
apicid\t\t: 0
initial apicid\t: 0
fpu\t\t: yes
fpu_exception\t: yes
cpuid level\t: 22
wp\t\t: yes
flags\t\t: fpu vme de pse tsc msr pae mce cx8 apic sep mtrr pge mca cmov pat pse36 clflush dts acpi mmx fxsr sse sse2 ss ht tm pbe syscall nx pdpe1gb rdtscp lm constant_tsc art arch_perfmon pebs bts rep_good nopl xtopology nonstop_tsc cpuid aperfmperf pni pclmulqdq dtes64 monitor ds_cpl vmx est tm2 ssse3 sdbg fma cx16 xtpr pdcm pcid sse4_1 sse4_2 x2apic movbe popcnt tsc_deadline_timer aes xsave avx f16c rdrand lahf_lm abm 3dnowprefetch cpuid_fault epb invpcid_single ssbd ibrs ibpb stibp ibrs_enhanced tpr_shadow vnmi flexpriority ept vpid ept_ad fsgsbase tsc_adjust bmi1 avx2 smep bmi2 erms invpcid mpx rdseed adx smap clflushopt intel_pt xsaveopt xsavec xgetbv1 xsaves dtherm ida arat pln pts hwp hwp_notify hwp_act_window hwp_epp md_clear flush_l1d arch_capabilities
bugs\t\t: spectre_v1 spectre_v2 spec_store_bypass mds swapgs taa itlb_multihit srbds mmio_stale_data retbleed
bogomips\t: 4000.00
clflush size\t: 64
cache_alignment\t: 64
address sizes\t: 39 bits physical, 48 bits virtual
power management:";

const MEMINFO: &str = "MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   10240000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       8192000 kB
SwapFree:        8192000 kB
Dirty:                 0 kB
Writeback:             0 kB
AnonPages:       4096000 kB
Mapped:           512000 kB
Shmem:                 0 kB
Slab:             512000 kB
SReclaimable:     384000 kB
SUnreclaim:       128000 kB
KernelStack:        8192 kB
PageTables:        32768 kB
CommitLimit:    16384000 kB
Committed_AS:    8192000 kB
VmallocTotal:   34359738367 kB
VmallocUsed:      262144 kB
HugePages_Total:       0
HugePages_Free:        0
Hugepagesize:       2048 kB
DirectMap4k:      262144 kB
DirectMap2M:     8388608 kB
DirectMap1G:     8388608 kB";

/// Loaded kernel modules, `lsmod` layout with a header row.
pub const MODULES: &str = "Module                  Size  Used by
nvme                   98304  0
intel_pmc_core         20480  1
intel_rapl_msr         16384  0
intel_rapl_common      24576  1 intel_rapl_msr
ip_tables              32768  0
x_tables               40960  1 ip_tables
bluetooth             651264  0
ecdh_generic           16384  1 bluetooth
ecc                    32768  1 ecdh_generic
rfkill                 28672  1 bluetooth
snd_hda_codec_realtek   131072  1
snd_hda_codec_generic   90112  1 snd_hda_codec_realtek
ledtrig_audio          16384  1 snd_hda_codec_generic
snd_hda_codec_hdmi     65536  1
snd_hda_intel          53248  0
snd_intel_dspcfg       24576  1 snd_hda_intel
snd_hda_codec         143360  4 snd_hda_codec_generic,snd_hda_codec_hdmi,snd_hda_intel,snd_hda_codec_realtek
snd_hda_core           94208  5 snd_hda_codec_generic,snd_hda_codec_hdmi,snd_hda_intel,snd_hda_codec,snd_hda_codec_realtek
snd_hwdep              16384  1 snd_hda_codec
snd_pcm               118784  4 snd_hda_codec_hdmi,snd_hda_intel,snd_hda_codec,snd_hda_core
snd_timer              40960  1 snd_pcm
snd                    94208  6 snd_hda_codec_generic,snd_hwdep,snd_hda_codec_hdmi,snd_hda_intel,snd_hda_codec,snd_pcm
soundcore              16384  1 snd";

const MOUNTS: &str = "sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
udev /dev devtmpfs rw,nosuid,noexec,relatime,size=4096000k,nr_inodes=1048576,mode=755 0 0
devpts /dev/pts devpts rw,nosuid,noexec,relatime,gid=5,mode=620,ptmxmode=000 0 0
tmpfs /run tmpfs rw,nosuid,nodev,noexec,relatime,size=1638400k,mode=755 0 0
/dev/sda1 / ext4 rw,relatime,errors=remount-ro 0 0
/dev/sda2 /home ext4 rw,relatime 0 0
tmpfs /dev/shm tmpfs rw,nosuid,nodev 0 0
tmpfs /run/lock tmpfs rw,nosuid,nodev,noexec,relatime,size=5120k 0 0
tmpfs /sys/fs/cgroup tmpfs ro,nosuid,nodev,noexec,mode=755 0 0";

const NET_DEV: &str = "Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  123456     789    0    0    0     0          0         0   123456     789    0    0    0     0       0          0
  eth0: 9876543   12345    0    0    0     0          0         0  9876543   12345    0    0    0     0       0          0
 wlan0: 5432109    6789    0    0    0     0          0         0  5432109    6789    0    0    0     0       0          0";

const NET_ROUTE: &str = "Kernel IP routing table
Destination     Gateway         Genmask         Flags Metric Ref    Use Iface
default         192.168.1.1     0.0.0.0         UG    100    0        0 eth0
192.168.1.0     0.0.0.0         255.255.255.0   U     100    0        0 eth0
192.168.0.0     0.0.0.0         255.255.255.0   U     600    0        0 wlan0";

const MOTD: &str = "Welcome to BitOS 5.15.0-bitos
Type 'help' for a list of available commands.";

fn interface(address: &str) -> Directory {
    Directory::new().file("address", address).file("mtu", "1500")
}

/// Build the root directory of a fresh session.
pub fn debian_root() -> Node {
    let documents = Directory::new()
        .file("readme.txt", README)
        .file("network.md", NETWORK_MD)
        .file("kernel.md", KERNEL_MD);
    let user = Directory::new()
        .dir("documents", documents)
        .dir("downloads", Directory::new())
        .dir("pictures", Directory::new());

    let etc = Directory::new()
        .file("hosts", HOSTS)
        .file("hostname", "bitos")
        .file("motd", MOTD)
        .file("resolv.conf", RESOLV_CONF)
        .file("sysctl.conf", SYSCTL_CONF);

    let log = Directory::new()
        .file("system.log", SYSTEM_LOG)
        .file("dmesg.log", DMESG_LOG);

    let kernel = Directory::new()
        .file("hostname", "bitos")
        .file("version", "5.15.0-bitos")
        .file("ostype", "Linux")
        .file("osrelease", "5.15.0-bitos");
    let proc_dir = Directory::new()
        .file("cpuinfo", CPUINFO)
        .file("meminfo", MEMINFO)
        .file("modules", MODULES)
        .file("mounts", MOUNTS)
        .dir(
            "net",
            Directory::new().file("dev", NET_DEV).file("route", NET_ROUTE),
        )
        .dir("sys", Directory::new().dir("kernel", kernel));

    let net = Directory::new()
        .dir("eth0", interface("00:11:22:33:44:55"))
        .dir("wlan0", interface("AA:BB:CC:DD:EE:FF"));
    let sys = Directory::new().dir("class", Directory::new().dir("net", net));

    let usr = Directory::new()
        .dir("bin", Directory::new())
        .dir("lib", Directory::new())
        .dir("share", Directory::new());

    Node::Directory(
        Directory::new()
            .dir("home", Directory::new().dir("user", user))
            .dir("bin", Directory::new())
            .dir("etc", etc)
            .dir("var", Directory::new().dir("log", log))
            .dir("proc", proc_dir)
            .dir("sys", sys)
            .dir("tmp", Directory::new())
            .dir("usr", usr),
    )
}
