//! VM inventory as reported by `prlctl list -a --info -j`.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;

/// Guest OS tags we know how to probe. All Linux-family.
pub const SUPPORTED_OS: &[&str] = &[
    "linux", "ubuntu", "debian", "fedora", "centos", "redhat", "opensuse", "mint", "kali", "arch",
];

/// Hypervisor-side declaration of one virtual device.
///
/// Only `net*` devices carry meaningful values; other hardware keys parse
/// into disabled, empty descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualAdapter {
    pub enabled: bool,
    /// Unseparated hex pairs, e.g. `001C42C45C24`.
    pub mac: String,
    /// `shared`, `bridged`, `host-only`, ...
    pub kind: String,
    pub default_route: bool,
}

impl VirtualAdapter {
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).unwrap_or_default();
        Self {
            enabled: value.get("enabled").and_then(Value::as_bool).unwrap_or(false),
            mac: text("mac").to_string(),
            kind: text("type").to_string(),
            default_route: text("iface") == "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vm {
    pub id: String,
    pub name: String,
    pub state: String,
    pub os: String,
    pub adapters: BTreeMap<String, VirtualAdapter>,
}

impl Vm {
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }

    pub fn is_supported_os(&self) -> bool {
        SUPPORTED_OS.contains(&self.os.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawVm {
    #[serde(rename = "ID", alias = "id", default)]
    id: String,
    #[serde(rename = "Name", alias = "name", default)]
    name: String,
    #[serde(rename = "State", alias = "state", default)]
    state: String,
    #[serde(rename = "OS", alias = "os", default)]
    os: String,
    #[serde(rename = "Hardware", alias = "hardware", default)]
    hardware: BTreeMap<String, Value>,
}

impl From<RawVm> for Vm {
    fn from(raw: RawVm) -> Self {
        let adapters = raw
            .hardware
            .iter()
            .filter(|(_, value)| value.is_object())
            .map(|(key, value)| (key.clone(), VirtualAdapter::from_value(value)))
            .collect();
        Self {
            id: raw.id,
            name: raw.name,
            state: raw.state,
            os: raw.os,
            adapters,
        }
    }
}

/// Parse the JSON array printed by the inventory command.
pub fn parse_inventory(json: &str) -> Result<Vec<Vm>, AppError> {
    let raw: Vec<RawVm> = serde_json::from_str(json).map_err(|e| AppError::Inventory {
        message: e.to_string(),
    })?;
    Ok(raw.into_iter().map(Vm::from).collect())
}
