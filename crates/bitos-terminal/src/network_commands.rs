//! Simulated network commands.
//!
//! Nothing here touches a real socket. Addresses, timings and counters come
//! from the session RNG, and the "slow" commands pause through the injected
//! latency service so the front end feels like it is waiting on the wire.

use bitos_types::error::{BitosError, Result};
use rand::Rng;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Register network commands into a registry.
pub fn register_network_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(PingCmd));
    reg.register(Box::new(IfconfigCmd));
    reg.register(Box::new(TracerouteCmd));
    reg.register(Box::new(NetstatCmd));
    reg.register(Box::new(NslookupCmd));
    reg.register(Box::new(CurlCmd));
    reg.register(Box::new(SsCmd));
    reg.register(Box::new(RouteCmd));
    reg.register(Box::new(IpCmd));
    reg.register(Box::new(ArpCmd));
    reg.register(Box::new(HostCmd));
}

fn random_ip<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.random_range(1..=223u8),
        rng.random_range(0..255u8),
        rng.random_range(0..255u8),
        rng.random_range(1..=254u8)
    )
}

fn random_ipv6<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..8)
        .map(|_| format!("{:x}", rng.random_range(0..65535u32)))
        .collect::<Vec<_>>()
        .join(":")
}

fn random_mac<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..6)
        .map(|_| format!("{:02X}", rng.random::<u8>()))
        .collect::<Vec<_>>()
        .join(":")
}

/// Round-trip time in milliseconds, 10..60.
fn random_rtt<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(10.0..60.0)
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

struct PingCmd;
impl Command for PingCmd {
    fn name(&self) -> &str {
        "ping"
    }
    fn description(&self) -> &str {
        "Send ICMP ECHO_REQUEST to network hosts"
    }
    fn usage(&self) -> &str {
        "ping [-c count] <host>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    ping - send ICMP ECHO_REQUEST to network hosts\n\nSYNOPSIS\n    ping HOST\n\nDESCRIPTION\n    ping uses the ICMP protocol's mandatory ECHO_REQUEST datagram to elicit an\n    ICMP ECHO_RESPONSE from a host or gateway.",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut count = 4u32;
        let mut host = None;
        let mut iter = args.iter();
        while let Some(&arg) = iter.next() {
            if arg == "-c" {
                let value = iter.next().copied().unwrap_or("");
                count = match value.parse::<u32>() {
                    Ok(n) if (1..=20).contains(&n) => n,
                    _ => {
                        return Err(BitosError::usage(format!(
                            "ping: invalid count of packets to transmit: '{value}'"
                        )));
                    },
                };
            } else if host.is_none() {
                host = Some(arg);
            }
        }
        let Some(host) = host else {
            return Err(BitosError::usage("Usage: ping <hostname or IP>"));
        };

        let mut out = format!("PING {host} ({}): 56 data bytes\n", random_ip(env.rng));
        let mut times = Vec::with_capacity(count as usize);
        for seq in 0..count {
            env.pause_between(50, 250);
            let time = random_rtt(env.rng);
            times.push(time);
            out.push_str(&format!(
                "64 bytes from {}: icmp_seq={seq} ttl=64 time={time:.3} ms\n",
                random_ip(env.rng)
            ));
        }

        let n = f64::from(count);
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = times.iter().sum::<f64>() / n;
        let stddev = (times.iter().map(|t| (t - avg).powi(2)).sum::<f64>() / n).sqrt();
        out.push_str(&format!("\n--- {host} ping statistics ---\n"));
        out.push_str(&format!(
            "{count} packets transmitted, {count} received, 0% packet loss\n"
        ));
        out.push_str(&format!(
            "round-trip min/avg/max/stddev = {min:.3}/{avg:.3}/{max:.3}/{stddev:.3} ms"
        ));
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// ifconfig
// ---------------------------------------------------------------------------

struct Interface {
    name: &'static str,
    ip: String,
    mask: &'static str,
    mac: Option<String>,
    rx: u64,
    tx: u64,
}

/// Hardware address from the seeded /sys tree, random if it was removed.
fn mac_of(name: &str, env: &mut Environment<'_>) -> String {
    match env
        .vfs
        .file_content(env.cwd, &format!("/sys/class/net/{name}/address"))
    {
        Some(mac) => mac.to_string(),
        None => random_mac(env.rng),
    }
}

fn interfaces(env: &mut Environment<'_>) -> Vec<Interface> {
    let eth_mac = mac_of("eth0", env);
    let wlan_mac = mac_of("wlan0", env);
    vec![
        Interface {
            name: "eth0",
            ip: format!("192.168.1.{}", env.rng.random_range(1..=254u8)),
            mask: "255.255.255.0",
            mac: Some(eth_mac),
            rx: env.rng.random_range(0..1_000_000),
            tx: env.rng.random_range(0..1_000_000),
        },
        Interface {
            name: "wlan0",
            ip: format!("192.168.0.{}", env.rng.random_range(1..=254u8)),
            mask: "255.255.255.0",
            mac: Some(wlan_mac),
            rx: env.rng.random_range(0..1_000_000),
            tx: env.rng.random_range(0..1_000_000),
        },
        Interface {
            name: "lo",
            ip: "127.0.0.1".to_string(),
            mask: "255.0.0.0",
            mac: None,
            rx: env.rng.random_range(0..10_000),
            tx: env.rng.random_range(0..10_000),
        },
    ]
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

struct IfconfigCmd;
impl Command for IfconfigCmd {
    fn name(&self) -> &str {
        "ifconfig"
    }
    fn aliases(&self) -> &[&str] {
        &["ipconfig"]
    }
    fn description(&self) -> &str {
        "Configure a network interface"
    }
    fn usage(&self) -> &str {
        "ifconfig [interface]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    ifconfig - configure a network interface\n\nSYNOPSIS\n    ifconfig [interface]\n\nDESCRIPTION\n    ifconfig is used to configure the kernel-resident network interfaces.\n    If no arguments are given, ifconfig displays the status of the currently\n    active interfaces.",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let all = interfaces(env);
        let selected: Vec<&Interface> = match args.first() {
            Some(&wanted) => {
                let found: Vec<&Interface> = all.iter().filter(|i| i.name == wanted).collect();
                if found.is_empty() {
                    return Err(BitosError::usage(format!(
                        "{wanted}: error fetching interface information: Device not found"
                    )));
                }
                found
            },
            None => all.iter().collect(),
        };

        let mut out = String::new();
        for iface in selected {
            let broadcast = iface.ip.rsplit_once('.').map_or("", |(net, _)| net);
            out.push_str(&format!(
                "{}: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500\n",
                iface.name
            ));
            out.push_str(&format!(
                "        inet {}  netmask {}  broadcast {broadcast}.255\n",
                iface.ip, iface.mask
            ));
            if let Some(mac) = &iface.mac {
                out.push_str(&format!("        ether {mac}  txqueuelen 1000  (Ethernet)\n"));
            }
            out.push_str(&format!(
                "        RX packets {}  bytes {} ({:.2} MiB)\n",
                iface.rx / 1000,
                iface.rx,
                mib(iface.rx)
            ));
            out.push_str(&format!(
                "        TX packets {}  bytes {} ({:.2} MiB)\n\n",
                iface.tx / 1000,
                iface.tx,
                mib(iface.tx)
            ));
        }
        Ok(CommandOutput::Text(out.trim_end().to_string()))
    }
}

// ---------------------------------------------------------------------------
// traceroute
// ---------------------------------------------------------------------------

struct TracerouteCmd;
impl Command for TracerouteCmd {
    fn name(&self) -> &str {
        "traceroute"
    }
    fn aliases(&self) -> &[&str] {
        &["tracert"]
    }
    fn description(&self) -> &str {
        "Print the route packets take to a network host"
    }
    fn usage(&self) -> &str {
        "traceroute <host>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    traceroute - print the route packets trace to network host\n\nSYNOPSIS\n    traceroute HOST\n\nDESCRIPTION\n    traceroute tracks the route packets taken from an IP network on their way\n    to a given host.",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&host) = args.first() else {
            return Err(BitosError::usage("Usage: traceroute <hostname or IP>"));
        };
        let mut out = format!(
            "traceroute to {host} ({}), 30 hops max, 60 byte packets\n",
            random_ip(env.rng)
        );
        let hops = env.rng.random_range(3..=8u32);
        for i in 1..=hops {
            env.pause_between(100, 400);
            let ip = random_ip(env.rng);
            let (t1, t2, t3) = (
                random_rtt(env.rng),
                random_rtt(env.rng),
                random_rtt(env.rng),
            );
            let hop_name = if i == hops {
                host.to_string()
            } else {
                format!("router-{i}.example.com")
            };
            out.push_str(&format!(
                "{i}  {hop_name} ({ip})  {t1:.3} ms  {t2:.3} ms  {t3:.3} ms\n"
            ));
        }
        Ok(CommandOutput::Text(out.trim_end().to_string()))
    }
}

// ---------------------------------------------------------------------------
// netstat
// ---------------------------------------------------------------------------

const NETSTAT_STATES: &[&str] = &["ESTABLISHED", "LISTEN", "TIME_WAIT", "CLOSE_WAIT"];
const NETSTAT_PORTS: &[u16] = &[80, 443, 22, 3000, 3306, 5432, 8080];

struct NetstatCmd;
impl Command for NetstatCmd {
    fn name(&self) -> &str {
        "netstat"
    }
    fn description(&self) -> &str {
        "Print network connections"
    }
    fn usage(&self) -> &str {
        "netstat [-tulpn]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut out = String::from("Active Internet connections (servers and established)\n");
        out.push_str(
            "Proto Recv-Q Send-Q Local Address           Foreign Address         State\n",
        );
        for _ in 0..8 {
            let proto = if env.rng.random_bool(0.5) { "tcp" } else { "udp" };
            let state = NETSTAT_STATES[env.rng.random_range(0..NETSTAT_STATES.len())];
            let port = NETSTAT_PORTS[env.rng.random_range(0..NETSTAT_PORTS.len())];
            let foreign = if state == "LISTEN" {
                "0.0.0.0:*".to_string()
            } else {
                format!(
                    "{}:{}",
                    random_ip(env.rng),
                    env.rng.random_range(1024..61024u32)
                )
            };
            out.push_str(&format!(
                "{proto}        0      0 127.0.0.1:{port}          {foreign}          {state}\n"
            ));
        }
        Ok(CommandOutput::Text(out.trim_end().to_string()))
    }
}

// ---------------------------------------------------------------------------
// nslookup / dig
// ---------------------------------------------------------------------------

struct NslookupCmd;
impl Command for NslookupCmd {
    fn name(&self) -> &str {
        "nslookup"
    }
    fn aliases(&self) -> &[&str] {
        &["dig"]
    }
    fn description(&self) -> &str {
        "Query Internet name servers"
    }
    fn usage(&self) -> &str {
        "nslookup <domain>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&domain) = args.first() else {
            return Err(BitosError::usage("Usage: nslookup <domain>"));
        };
        env.pause_between(200, 700);
        let mut out = String::from("Server:\t\t8.8.8.8\nAddress:\t8.8.8.8#53\n\n");
        out.push_str("Non-authoritative answer:\n");
        out.push_str(&format!("Name:\t{domain}\nAddress: {}", random_ip(env.rng)));
        if env.rng.random_bool(0.5) {
            out.push_str(&format!(
                "\nName:\t{domain}\nAddress: {}",
                random_ipv6(env.rng)
            ));
        }
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// host
// ---------------------------------------------------------------------------

struct HostCmd;
impl Command for HostCmd {
    fn name(&self) -> &str {
        "host"
    }
    fn description(&self) -> &str {
        "DNS lookup utility"
    }
    fn usage(&self) -> &str {
        "host <domain>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&domain) = args.first() else {
            return Err(BitosError::usage(
                "Usage: host [-aCdilrTvVw] [-c class] [-N ndots] [-t type] [-W time]\n            [-R number] [-m flag] [-p port] hostname [server]",
            ));
        };
        env.pause_between(100, 400);
        let v4 = random_ip(env.rng);
        let v6 = random_ipv6(env.rng);
        Ok(CommandOutput::Text(format!(
            "{domain} has address {v4}\n{domain} has IPv6 address {v6}\n{domain} mail is handled by 10 mail.{domain}."
        )))
    }
}

// ---------------------------------------------------------------------------
// curl / wget
// ---------------------------------------------------------------------------

const EXAMPLE_DOMAIN_PAGE: &str = r#"<!doctype html>
<html>
<head>
    <title>Example Domain</title>
    <meta charset="utf-8" />
    <meta http-equiv="Content-type" content="text/html; charset=utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
</head>
<body>
    <div>
        <h1>Example Domain</h1>
        <p>This domain is for use in illustrative examples in documents.</p>
        <p>You may use this domain in literature without prior coordination.</p>
    </div>
</body>
</html>"#;

struct CurlCmd;
impl Command for CurlCmd {
    fn name(&self) -> &str {
        "curl"
    }
    fn aliases(&self) -> &[&str] {
        &["wget"]
    }
    fn description(&self) -> &str {
        "Transfer a URL"
    }
    fn usage(&self) -> &str {
        "curl <url>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&url) = args.iter().find(|a| !a.starts_with('-')) else {
            return Err(BitosError::usage(format!("Usage: {} <url>", env.program)));
        };
        env.pause_between(200, 1000);
        if url.contains("example.com") {
            return Ok(CommandOutput::Text(EXAMPLE_DOMAIN_PAGE.to_string()));
        }
        Ok(CommandOutput::Text(format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>{url}</title>
    <meta charset="utf-8">
</head>
<body>
    <h1>Welcome to {url}</h1>
    <p>This is a simulated response from the BitOS terminal.</p>
</body>
</html>"#
        )))
    }
}

// ---------------------------------------------------------------------------
// ss
// ---------------------------------------------------------------------------

const SS_TABLE: &str = "Netid  State   Recv-Q  Send-Q   Local Address:Port    Peer Address:Port  Process
tcp    LISTEN  0       128      0.0.0.0:22             0.0.0.0:*
tcp    LISTEN  0       128      127.0.0.1:631           0.0.0.0:*
tcp    ESTAB   0       0        192.168.1.5:22          192.168.1.10:49721
tcp    ESTAB   0       0        192.168.1.5:22          192.168.1.15:52410
tcp    LISTEN  0       128      [::]:22                [::]:*
tcp    LISTEN  0       128      [::1]:631              [::]:*
udp    UNCONN  0       0        0.0.0.0:631            0.0.0.0:*
udp    UNCONN  0       0        0.0.0.0:5353           0.0.0.0:*";

struct SsCmd;
impl Command for SsCmd {
    fn name(&self) -> &str {
        "ss"
    }
    fn description(&self) -> &str {
        "Socket statistics"
    }
    fn usage(&self) -> &str {
        "ss [-tuln]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(SS_TABLE.to_string()))
    }
}

// ---------------------------------------------------------------------------
// route
// ---------------------------------------------------------------------------

struct RouteCmd;
impl Command for RouteCmd {
    fn name(&self) -> &str {
        "route"
    }
    fn description(&self) -> &str {
        "Show the IP routing table"
    }
    fn usage(&self) -> &str {
        "route [-n]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let table = env.read_file("/proc/net/route").map_err(|e| e.in_command("route"))?;
        Ok(CommandOutput::Text(table.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ip
// ---------------------------------------------------------------------------

struct IpCmd;
impl Command for IpCmd {
    fn name(&self) -> &str {
        "ip"
    }
    fn description(&self) -> &str {
        "Show routing, devices and addresses"
    }
    fn usage(&self) -> &str {
        "ip <addr|link|route>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let object = args.first().copied().unwrap_or("");
        match object {
            "a" | "addr" | "address" => {
                let all = interfaces(env);
                let mut out = String::new();
                for (idx, iface) in all.iter().enumerate() {
                    let prefix = if iface.name == "lo" { 8 } else { 24 };
                    out.push_str(&format!(
                        "{}: {}: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 state UP\n",
                        idx + 1,
                        iface.name
                    ));
                    if let Some(mac) = &iface.mac {
                        out.push_str(&format!(
                            "    link/ether {} brd ff:ff:ff:ff:ff:ff\n",
                            mac.to_lowercase()
                        ));
                    } else {
                        out.push_str("    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00\n");
                    }
                    out.push_str(&format!(
                        "    inet {}/{prefix} scope {}\n",
                        iface.ip,
                        if iface.name == "lo" { "host" } else { "global" }
                    ));
                }
                Ok(CommandOutput::Text(out.trim_end().to_string()))
            },
            "l" | "link" => Ok(CommandOutput::Text(
                "1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 state UNKNOWN\n    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00\n2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 state UP\n3: wlan0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 state UP"
                    .to_string(),
            )),
            "r" | "route" => Ok(CommandOutput::Text(
                "default via 192.168.1.1 dev eth0 proto dhcp metric 100\n192.168.1.0/24 dev eth0 proto kernel scope link src 192.168.1.5 metric 100\n192.168.0.0/24 dev wlan0 proto kernel scope link metric 600"
                    .to_string(),
            )),
            "" => Err(BitosError::usage(
                "Usage: ip [ OPTIONS ] OBJECT { COMMAND | help }\nwhere  OBJECT := { address | link | route }",
            )),
            other => Err(BitosError::usage(format!(
                "Object \"{other}\" is unknown, try \"ip help\"."
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// arp
// ---------------------------------------------------------------------------

struct ArpCmd;
impl Command for ArpCmd {
    fn name(&self) -> &str {
        "arp"
    }
    fn description(&self) -> &str {
        "Show the neighbour cache"
    }
    fn usage(&self) -> &str {
        "arp [-a]"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut out =
            String::from("Address                  HWtype  HWaddress           Flags Mask            Iface");
        out.push_str(&format!(
            "\n_gateway                 ether   {}   C                     eth0",
            random_mac(env.rng).to_lowercase()
        ));
        for _ in 0..2 {
            let host = env.rng.random_range(2..=254u8);
            out.push_str(&format!(
                "\n192.168.1.{host:<12}    ether   {}   C                     eth0",
                random_mac(env.rng).to_lowercase()
            ));
        }
        Ok(CommandOutput::Text(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Fixture};

    fn run(fx: &mut Fixture, cmd: &dyn Command, args: &[&str]) -> Result<CommandOutput> {
        let mut env = fx.env();
        cmd.execute(args, &mut env)
    }

    fn text(out: Result<CommandOutput>) -> String {
        out.unwrap().render()
    }

    #[test]
    fn ping_prints_four_replies_and_pauses() {
        let mut fx = Fixture::new();
        let out = text(run(&mut fx, &PingCmd, &["example.com"]));
        assert!(out.starts_with("PING example.com ("));
        assert_eq!(out.matches("icmp_seq=").count(), 4);
        assert!(out.contains("--- example.com ping statistics ---"));
        assert!(out.contains("4 packets transmitted, 4 received, 0% packet loss"));
        assert_eq!(fx.latency.pauses().len(), 4);
    }

    #[test]
    fn ping_count_flag() {
        let mut fx = Fixture::new();
        let out = text(run(&mut fx, &PingCmd, &["-c", "2", "10.0.0.1"]));
        assert_eq!(out.matches("icmp_seq=").count(), 2);
        let err = run(&mut fx, &PingCmd, &["-c", "x", "h"]).unwrap_err();
        assert!(err.to_string().contains("invalid count"));
    }

    #[test]
    fn ping_without_host() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("ping"), "Usage: ping <hostname or IP>");
    }

    #[test]
    fn ifconfig_lists_three_interfaces() {
        let mut sh = testing::shell();
        let out = sh.execute("ipconfig");
        assert!(out.starts_with("eth0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500"));
        assert!(out.contains("wlan0: flags"));
        assert!(out.contains("lo: flags"));
        assert!(out.contains("inet 127.0.0.1  netmask 255.0.0.0  broadcast 127.0.0.255"));
        assert!(out.contains("ether 00:11:22:33:44:55"));
        assert_eq!(out.matches("ether ").count(), 2);
    }

    #[test]
    fn ifconfig_single_interface() {
        let mut sh = testing::shell();
        let out = sh.execute("ifconfig wlan0");
        assert!(out.starts_with("wlan0:"));
        assert!(out.contains("ether AA:BB:CC:DD:EE:FF"));
        assert!(!out.contains("eth0"));
        assert_eq!(
            sh.execute("ifconfig ppp0"),
            "ppp0: error fetching interface information: Device not found"
        );
    }

    #[test]
    fn traceroute_ends_at_destination() {
        let mut fx = Fixture::new();
        let out = text(run(&mut fx, &TracerouteCmd, &["bitos.dev"]));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("traceroute to bitos.dev ("));
        let hops = lines.len() - 1;
        assert!((3..=8).contains(&hops));
        assert!(lines[hops].starts_with(&format!("{hops}  bitos.dev (")));
        assert_eq!(fx.latency.pauses().len(), hops);
    }

    #[test]
    fn traceroute_requires_host() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("tracert"), "Usage: traceroute <hostname or IP>");
    }

    #[test]
    fn netstat_has_header_and_eight_rows() {
        let mut sh = testing::shell();
        let out = sh.execute("netstat");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[1].starts_with("Proto Recv-Q Send-Q"));
        for line in lines.iter().filter(|l| l.ends_with("LISTEN")) {
            assert!(line.contains("0.0.0.0:*"));
        }
    }

    #[test]
    fn nslookup_answer() {
        let mut sh = testing::shell();
        let out = sh.execute("dig rust-lang.org");
        assert!(out.starts_with("Server:\t\t8.8.8.8\nAddress:\t8.8.8.8#53"));
        assert!(out.contains("Name:\trust-lang.org\nAddress: "));
        assert_eq!(sh.execute("nslookup"), "Usage: nslookup <domain>");
    }

    #[test]
    fn host_answer() {
        let mut sh = testing::shell();
        let out = sh.execute("host bitos.dev");
        assert!(out.starts_with("bitos.dev has address "));
        assert!(out.ends_with("bitos.dev mail is handled by 10 mail.bitos.dev."));
    }

    #[test]
    fn curl_pages() {
        let mut sh = testing::shell();
        assert!(sh.execute("curl http://example.com").contains("<h1>Example Domain</h1>"));
        let out = sh.execute("wget bitos.dev");
        assert!(out.contains("<h1>Welcome to bitos.dev</h1>"));
        assert_eq!(sh.execute("wget"), "Usage: wget <url>");
        assert_eq!(sh.execute("curl"), "Usage: curl <url>");
    }

    #[test]
    fn ss_and_route_tables() {
        let mut sh = testing::shell();
        assert_eq!(sh.execute("ss").lines().count(), 9);
        let route = sh.execute("route");
        assert!(route.starts_with("Kernel IP routing table"));
        assert!(route.contains("default         192.168.1.1"));
    }

    #[test]
    fn ip_objects() {
        let mut sh = testing::shell();
        let addr = sh.execute("ip addr");
        assert!(addr.contains("1: eth0:"));
        assert!(addr.contains("link/ether 00:11:22:33:44:55"));
        assert!(addr.contains("inet 127.0.0.1/8 scope host"));
        assert!(sh.execute("ip route").starts_with("default via 192.168.1.1"));
        assert_eq!(
            sh.execute("ip bogus"),
            "Object \"bogus\" is unknown, try \"ip help\"."
        );
    }

    #[test]
    fn arp_table() {
        let mut sh = testing::shell();
        let out = sh.execute("arp -a");
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().nth(1).is_some_and(|l| l.starts_with("_gateway")));
    }

    #[test]
    fn random_helpers_are_well_formed() {
        let mut fx = Fixture::new();
        for _ in 0..50 {
            let ip = random_ip(&mut fx.rng);
            let octets: Vec<u16> = ip.split('.').map(|o| o.parse().unwrap()).collect();
            assert_eq!(octets.len(), 4);
            assert!((1..=223).contains(&octets[0]));
            assert!(octets[3] >= 1);
            assert_eq!(random_mac(&mut fx.rng).split(':').count(), 6);
            assert_eq!(random_ipv6(&mut fx.rng).split(':').count(), 8);
        }
    }
}
