//! Finding reachable addresses across every VM in the inventory.
//!
//! Each VM is probed independently; a failed probe only removes that VM from
//! the menu. Results come back in inventory order whatever order the probes
//! finish in.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::backend::Hypervisor;
use crate::correlate::{self, ResolvedAddress};
use crate::error::{AppError, ProbeError};
use crate::inventory::Vm;
use crate::netparse::{self, ListingFormat};

/// Outcome of probing one VM.
#[derive(Debug)]
pub struct VmProbe {
    pub vm: Arc<Vm>,
    pub result: Result<Vec<ResolvedAddress>, ProbeError>,
}

/// Read the inventory, treating any fault as an empty inventory.
pub async fn load_inventory<H: Hypervisor>(hypervisor: &H) -> Vec<Vm> {
    match hypervisor.list_vms().await {
        Ok(vms) => {
            tracing::debug!(count = vms.len(), "inventory loaded");
            vms
        }
        Err(AppError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("Parallels is not installed!");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("inventory unavailable: {e}");
            Vec::new()
        }
    }
}

/// Pick the first listing command present in the guest.
pub async fn detect_format<H: Hypervisor>(
    hypervisor: &H,
    vm: &Vm,
) -> Result<ListingFormat, ProbeError> {
    for format in ListingFormat::PREFERENCE {
        match hypervisor.command_exists(vm, format.program()).await {
            Ok(true) => return Ok(format),
            Ok(false) => {}
            Err(e) => tracing::debug!(vm = %vm.name, program = format.program(), "probe failed: {e}"),
        }
    }
    Err(ProbeError::NoListingCommand {
        name: vm.name.clone(),
    })
}

async fn resolve_vm<H: Hypervisor>(
    hypervisor: &H,
    vm: &Arc<Vm>,
) -> Result<Vec<ResolvedAddress>, ProbeError> {
    if !vm.is_running() {
        return Err(ProbeError::NotRunning {
            name: vm.name.clone(),
            id: vm.id.clone(),
        });
    }
    if !vm.is_supported_os() {
        return Err(ProbeError::UnsupportedOs { os: vm.os.clone() });
    }

    let format = detect_format(hypervisor, vm).await?;
    let text = hypervisor.exec(vm, format.command()).await?;
    let records = netparse::assemble(&text, format);
    tracing::debug!(vm = %vm.name, ?format, interfaces = records.len(), "parsed listing");

    Ok(correlate::correlate(vm, records))
}

pub async fn probe_vm<H: Hypervisor>(hypervisor: &H, vm: Arc<Vm>) -> VmProbe {
    let result = resolve_vm(hypervisor, &vm).await;
    match &result {
        Ok(addrs) => tracing::info!(vm = %vm.name, addresses = addrs.len(), "probed"),
        Err(e) => tracing::warn!(vm = %vm.name, "skipped: {e}"),
    }
    VmProbe { vm, result }
}

/// Probe all VMs concurrently, keeping inventory order.
pub async fn discover<H: Hypervisor>(hypervisor: &H, vms: Vec<Vm>) -> Vec<VmProbe> {
    join_all(
        vms.into_iter()
            .map(|vm| probe_vm(hypervisor, Arc::new(vm))),
    )
    .await
}

/// Flatten successful probes into menu entries. Interfaces without an IPv4
/// address cannot be connected to and are left out.
pub fn reachable(probes: Vec<VmProbe>) -> Vec<ResolvedAddress> {
    probes
        .into_iter()
        .filter_map(|probe| probe.result.ok())
        .flatten()
        .filter(|addr| addr.ip().is_some())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::backend::fake::FakeHypervisor;

    pub const INVENTORY: &str = r#"[
      {"ID": "{a}", "Name": "alpha", "State": "running", "OS": "ubuntu",
       "Hardware": {"net0": {"enabled": true, "type": "bridged", "mac": "001C42C45C24"}}},
      {"ID": "{b}", "Name": "beta", "State": "stopped", "OS": "linux",
       "Hardware": {"net0": {"enabled": true, "type": "shared", "mac": "001C42000001"}}},
      {"ID": "{c}", "Name": "gamma", "State": "running", "OS": "win-11",
       "Hardware": {"net0": {"enabled": true, "type": "shared", "mac": "001C42000002"}}},
      {"ID": "{d}", "Name": "delta", "State": "running", "OS": "linux",
       "Hardware": {"net0": {"enabled": true, "type": "shared", "mac": "001C42000003"}}},
      {"ID": "{e}", "Name": "epsilon", "State": "running", "OS": "linux",
       "Hardware": {"net0": {"enabled": true, "type": "shared", "mac": "001C42000004"},
                    "net1": {"enabled": true, "type": "host-only", "mac": "001C42000005"}}}
    ]"#;

    pub const ALPHA_IFCONFIG: &str = "\
eth0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500
        inet 10.211.55.5  netmask 255.255.255.0  broadcast 10.211.55.255
        ether 00:1c:42:c4:5c:24  txqueuelen 1000  (Ethernet)
";

    pub const EPSILON_IP: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500
    link/ether 00:1c:42:00:00:04 brd ff:ff:ff:ff:ff:ff
    inet 10.211.55.9/24 brd 10.211.55.255 scope global eth0
3: eth1: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500
    link/ether 00:1c:42:00:00:05 brd ff:ff:ff:ff:ff:ff
";

    fn hypervisor() -> FakeHypervisor {
        FakeHypervisor::new(Some(INVENTORY))
            .with_binary("{a}", "ifconfig")
            .with_output("{a}", "ifconfig", ALPHA_IFCONFIG)
            .with_binary("{e}", "ip")
            .with_binary("{e}", "ifconfig")
            .with_output("{e}", "ip address show", EPSILON_IP)
    }

    #[tokio::test]
    async fn per_vm_results_in_inventory_order() {
        let hv = hypervisor();
        let vms = load_inventory(&hv).await;
        let probes = discover(&hv, vms).await;

        let names: Vec<_> = probes.iter().map(|p| p.vm.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta", "gamma", "delta", "epsilon"]);

        assert_eq!(probes[0].result.as_ref().unwrap().len(), 1);
        assert!(matches!(probes[1].result, Err(ProbeError::NotRunning { .. })));
        assert!(matches!(probes[2].result, Err(ProbeError::UnsupportedOs { .. })));
        assert!(matches!(probes[3].result, Err(ProbeError::NoListingCommand { .. })));
        assert_eq!(probes[4].result.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn modern_listing_is_preferred() {
        let hv = hypervisor();
        let vms = load_inventory(&hv).await;
        discover(&hv, vms).await;

        let calls = hv.calls.borrow();
        assert!(calls.contains(&"exec {e} ip address show".to_string()));
        assert!(!calls.contains(&"exec {e} ifconfig".to_string()));
        assert!(!calls.iter().any(|c| c.contains("{b}")));
    }

    #[tokio::test]
    async fn legacy_scenario_resolves_single_address() {
        let hv = hypervisor();
        let vms = load_inventory(&hv).await;
        let probes = discover(&hv, vms).await;
        let alpha = &probes[0].result.as_ref().unwrap()[0];

        assert_eq!(alpha.vm.name, "alpha");
        assert_eq!(alpha.ip(), Some(Ipv4Addr::new(10, 211, 55, 5)));
        assert_eq!(alpha.kind, "bridged");
        assert_eq!(alpha.adapter, "net0");
    }

    #[tokio::test]
    async fn reachable_drops_failures_and_addressless_interfaces() {
        let hv = hypervisor();
        let vms = load_inventory(&hv).await;
        let addrs = reachable(discover(&hv, vms).await);

        let ips: Vec<_> = addrs.iter().filter_map(|a| a.ip()).collect();
        assert_eq!(
            ips,
            [Ipv4Addr::new(10, 211, 55, 5), Ipv4Addr::new(10, 211, 55, 9)]
        );
    }

    #[tokio::test]
    async fn bridged_guest_is_offered_through_its_bridge() {
        let json = r#"[{"ID": "{br}", "Name": "bridged", "State": "running", "OS": "ubuntu",
            "Hardware": {"net0": {"enabled": true, "type": "bridged", "mac": "001C42C45C24"}}}]"#;
        let listing = "\
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 master br0 state UP
    link/ether 00:1c:42:c4:5c:24 brd ff:ff:ff:ff:ff:ff
3: br0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 state UP
    link/ether 00:1c:42:c4:5c:24 brd ff:ff:ff:ff:ff:ff
    inet 10.211.55.5/24 brd 10.211.55.255 scope global br0
";
        let hv = FakeHypervisor::new(Some(json))
            .with_binary("{br}", "ip")
            .with_output("{br}", "ip address show", listing);
        let vms = load_inventory(&hv).await;
        let addrs = reachable(discover(&hv, vms).await);

        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].interface.name, "br0");
        assert_eq!(addrs[0].ip(), Some(Ipv4Addr::new(10, 211, 55, 5)));
    }

    #[tokio::test]
    async fn failed_listing_command_is_reported() {
        let hv = FakeHypervisor::new(Some(INVENTORY)).with_binary("{a}", "ip");
        let vms = load_inventory(&hv).await;
        let probes = discover(&hv, vms).await;
        assert!(matches!(probes[0].result, Err(ProbeError::Command(_))));
    }

    #[tokio::test]
    async fn inventory_faults_mean_no_vms() {
        assert!(load_inventory(&FakeHypervisor::new(None)).await.is_empty());
        assert!(load_inventory(&FakeHypervisor::new(Some("not json"))).await.is_empty());
        assert!(load_inventory(&FakeHypervisor::new(Some("[]"))).await.is_empty());
    }
}
