//! Parsing of in-guest interface listings.
//!
//! Two output shapes are understood: `ip address show` ([`ListingFormat::Modern`])
//! and `ifconfig` ([`ListingFormat::Legacy`]). Both list one interface per
//! non-indented header line followed by indented continuation lines.

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;

/// Which listing command produced the text. Picked once per VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    /// `ip address show`
    Modern,
    /// `ifconfig`
    Legacy,
}

impl ListingFormat {
    /// Probe order: modern first.
    pub const PREFERENCE: [ListingFormat; 2] = [ListingFormat::Modern, ListingFormat::Legacy];

    /// Binary whose presence selects this format.
    pub fn program(self) -> &'static str {
        match self {
            ListingFormat::Modern => "ip",
            ListingFormat::Legacy => "ifconfig",
        }
    }

    /// Full argv run inside the guest.
    pub fn command(self) -> &'static [&'static str] {
        match self {
            ListingFormat::Modern => &["ip", "address", "show"],
            ListingFormat::Legacy => &["ifconfig"],
        }
    }
}

/// Subnet mask as the guest reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Netmask {
    Prefix(u8),
    Dotted(Ipv4Addr),
}

impl Netmask {
    pub fn prefix_len(self) -> u32 {
        match self {
            Netmask::Prefix(len) => u32::from(len),
            Netmask::Dotted(addr) => u32::from(addr).count_ones(),
        }
    }
}

/// Classification of one listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    NewInterface(String),
    Link {
        link_type: String,
        mac: String,
    },
    Inet {
        ip: Ipv4Addr,
        mask: Netmask,
        broadcast: Option<Ipv4Addr>,
    },
    Unrecognized,
}

/// One guest network interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub link_type: Option<String>,
    /// Lowercase, colon separated.
    pub mac: Option<String>,
    pub ip: Option<Ipv4Addr>,
    pub mask: Option<Netmask>,
    pub broadcast: Option<Ipv4Addr>,
}

impl InterfaceRecord {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn apply(&mut self, line: LineKind) {
        match line {
            LineKind::Link { link_type, mac } => {
                self.link_type = Some(link_type);
                self.mac = Some(mac);
            }
            LineKind::Inet {
                ip,
                mask,
                broadcast,
            } => {
                self.ip = Some(ip);
                self.mask = Some(mask);
                self.broadcast = broadcast;
            }
            LineKind::NewInterface(_) | LineKind::Unrecognized => {}
        }
    }
}

// ── patterns ───────────────────────────────────────────────

const IPV4: &str = r"\d{1,3}(?:\.\d{1,3}){3}";
const MAC: &str = r"[0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2})+";

// `2: eth0: <BROADCAST,...>` / `3: veth1@if2: <...>`
static MODERN_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+:\s+([^\s:@]+)(?:@[^\s:]+)?:").expect("valid header regex")
});

// `link/ether 00:1c:42:c4:5c:24 brd ff:ff:ff:ff:ff:ff`
static MODERN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\blink/(\w+)\s+({MAC})(?:\s+brd\s+({MAC}))?")).expect("valid link regex")
});

// `inet 10.211.55.5/24 brd 10.211.55.255 scope global eth0`
static MODERN_INET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\binet\s+({IPV4})/(\d{{1,2}})(?:\s+brd\s+({IPV4}))?"))
        .expect("valid inet regex")
});

// `eth0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500`
static LEGACY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s:]+)").expect("valid header regex"));

// `ether 00:1c:42:c4:5c:24  txqueuelen 1000  (Ethernet)`
static LEGACY_ETHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bether\s+({MAC})")).expect("valid ether regex")
});

// `inet 10.211.55.5  netmask 255.255.255.0  broadcast 10.211.55.255`
static LEGACY_INET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\binet\s+({IPV4})\s+netmask\s+({IPV4})(?:\s+broadcast\s+({IPV4}))?"
    ))
    .expect("valid inet regex")
});

fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

fn ipv4(s: &str) -> Option<Ipv4Addr> {
    s.parse().ok()
}

// ── line classification ───────────────────────────────────

/// Classify one line of listing output.
pub fn classify_line(line: &str, format: ListingFormat) -> LineKind {
    let line = line.trim_end();
    if line.is_empty() {
        return LineKind::Unrecognized;
    }
    let parsed = if is_continuation(line) {
        match format {
            ListingFormat::Modern => modern_inet(line).or_else(|| modern_link(line)),
            ListingFormat::Legacy => legacy_inet(line).or_else(|| legacy_ether(line)),
        }
    } else {
        let header = match format {
            ListingFormat::Modern => &MODERN_HEADER,
            ListingFormat::Legacy => &LEGACY_HEADER,
        };
        header
            .captures(line)
            .map(|caps| LineKind::NewInterface(caps[1].to_string()))
    };
    parsed.unwrap_or(LineKind::Unrecognized)
}

fn modern_link(line: &str) -> Option<LineKind> {
    let caps = MODERN_LINK.captures(line)?;
    Some(LineKind::Link {
        link_type: caps[1].to_string(),
        mac: caps[2].to_ascii_lowercase(),
    })
}

fn modern_inet(line: &str) -> Option<LineKind> {
    let caps = MODERN_INET.captures(line)?;
    let prefix: u8 = caps[2].parse().ok().filter(|p| *p <= 32)?;
    let broadcast = match caps.get(3) {
        Some(m) => Some(ipv4(m.as_str())?),
        None => None,
    };
    Some(LineKind::Inet {
        ip: ipv4(&caps[1])?,
        mask: Netmask::Prefix(prefix),
        broadcast,
    })
}

fn legacy_ether(line: &str) -> Option<LineKind> {
    let caps = LEGACY_ETHER.captures(line)?;
    Some(LineKind::Link {
        link_type: "ether".to_string(),
        mac: caps[1].to_ascii_lowercase(),
    })
}

fn legacy_inet(line: &str) -> Option<LineKind> {
    let caps = LEGACY_INET.captures(line)?;
    let broadcast = match caps.get(3) {
        Some(m) => Some(ipv4(m.as_str())?),
        None => None,
    };
    Some(LineKind::Inet {
        ip: ipv4(&caps[1])?,
        mask: Netmask::Dotted(ipv4(&caps[2])?),
        broadcast,
    })
}

// ── block assembly ─────────────────────────────────────────

/// Lines belonging to one interface, header first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInterfaceBlock<'a> {
    pub format: ListingFormat,
    pub name: String,
    pub lines: Vec<&'a str>,
}

impl RawInterfaceBlock<'_> {
    pub fn into_record(self) -> InterfaceRecord {
        let format = self.format;
        let mut record = InterfaceRecord::new(self.name);
        for line in self.lines {
            record.apply(classify_line(line, format));
        }
        record
    }
}

/// Split listing output into per-interface blocks in a single pass.
/// Lines before the first header are dropped.
pub fn split_blocks(text: &str, format: ListingFormat) -> Vec<RawInterfaceBlock<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<RawInterfaceBlock<'_>> = None;

    for line in text.lines() {
        match classify_line(line, format) {
            LineKind::NewInterface(name) => {
                blocks.extend(current.take());
                current = Some(RawInterfaceBlock {
                    format,
                    name,
                    lines: Vec::new(),
                });
            }
            LineKind::Unrecognized => {}
            _ => {
                if let Some(block) = current.as_mut() {
                    block.lines.push(line);
                }
            }
        }
    }
    blocks.extend(current);
    blocks
}

/// Parse full listing output into interface records, in listing order.
pub fn assemble(text: &str, format: ListingFormat) -> Vec<InterfaceRecord> {
    split_blocks(text, format)
        .into_iter()
        .map(RawInterfaceBlock::into_record)
        .collect()
}
