//! Pairing guest interfaces with hypervisor-declared network adapters.

use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::inventory::{VirtualAdapter, Vm};
use crate::netparse::{InterfaceRecord, Netmask};

/// Hardware keys with this prefix are network adapters (`net0`, `net1`, ...).
pub const NETWORK_PREFIX: &str = "net";

/// Bring a MAC into lowercase colon-separated form.
///
/// Accepts the hypervisor's unseparated `001C42C45C24` as well as already
/// separated input. Returns `None` unless there are exactly 12 hex digits.
pub fn normalize_mac(mac: &str) -> Option<String> {
    let digits: Vec<char> = mac
        .chars()
        .filter(|c| !matches!(c, ':' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if digits.len() != 12 || !digits.iter().all(char::is_ascii_hexdigit) {
        return None;
    }
    let pairs: Vec<String> = digits.chunks(2).map(|pair| pair.iter().collect()).collect();
    Some(pairs.join(":"))
}

/// A guest interface confirmed to belong to one adapter of one VM.
#[derive(Debug, Clone)]
pub struct ResolvedAddress {
    pub vm: Arc<Vm>,
    pub interface: InterfaceRecord,
    /// Hardware key, e.g. `net0`.
    pub adapter: String,
    pub default_route: bool,
    /// Adapter type, e.g. `shared` or `bridged`.
    pub kind: String,
}

impl ResolvedAddress {
    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.interface.ip
    }

    /// One menu row: ` name                : ip              (type)`.
    pub fn menu_row(&self) -> String {
        let ip = self.ip().map(|ip| ip.to_string()).unwrap_or_default();
        format!(" {:<20}: {:<15} ({})", self.vm.name, ip, self.kind)
    }

    /// Short label used when asking for a username.
    pub fn label(&self) -> String {
        let ip = self.ip().map(|ip| ip.to_string()).unwrap_or_default();
        format!("{} ({})", self.vm.name, ip)
    }
}

fn adapter_matches(key: &str, adapter: &VirtualAdapter, mac: &str) -> bool {
    key.starts_with(NETWORK_PREFIX)
        && adapter.enabled
        && normalize_mac(&adapter.mac).is_some_and(|normalized| normalized == mac)
}

/// Match each interface against the VM's adapters by MAC.
///
/// Interfaces are visited in listing order, adapters in key order; the first
/// enabled `net*` adapter with an equal MAC wins and each adapter is claimed
/// at most once. An adapter held by an interface without an IPv4 address is
/// handed over to a later interface that has one, so a bridge carrying the
/// enslaved NIC's MAC resolves to the bridge.
pub fn correlate(vm: &Arc<Vm>, records: Vec<InterfaceRecord>) -> Vec<ResolvedAddress> {
    let mut resolved: Vec<ResolvedAddress> = Vec::new();

    for record in records {
        let Some(mac) = record.mac.as_deref() else {
            continue;
        };
        let has_ip = record.ip.is_some();
        let hit = vm
            .adapters
            .iter()
            .filter(|(key, adapter)| adapter_matches(key, adapter, mac))
            .find_map(|(key, adapter)| {
                match resolved.iter().position(|r| r.adapter == *key) {
                    None => Some((key, adapter, None)),
                    Some(held) if has_ip && resolved[held].ip().is_none() => {
                        Some((key, adapter, Some(held)))
                    }
                    Some(_) => None,
                }
            });

        let Some((key, adapter, displaced)) = hit else {
            continue;
        };
        if let Some(held) = displaced {
            let released = resolved.remove(held);
            tracing::debug!(
                vm = %vm.name,
                adapter = %key,
                interface = %released.interface.name,
                "released adapter from addressless interface"
            );
        }
        tracing::debug!(
            vm = %vm.name,
            adapter = %key,
            interface = %record.name,
            ip = ?record.ip,
            prefix = ?record.mask.map(Netmask::prefix_len),
            default_route = adapter.default_route,
            "matched adapter"
        );
        resolved.push(ResolvedAddress {
            vm: Arc::clone(vm),
            adapter: key.clone(),
            default_route: adapter.default_route,
            kind: adapter.kind.clone(),
            interface: record,
        });
    }
    resolved
}
