//! Scripted hypervisor for tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::AppError;
use crate::inventory::{self, Vm};

#[derive(Default)]
pub struct FakeHypervisor {
    inventory: Option<String>,
    /// vm id -> binaries present in the guest
    binaries: HashMap<String, Vec<String>>,
    /// (vm id, argv joined by spaces) -> stdout
    outputs: HashMap<(String, String), String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeHypervisor {
    /// `json` is what the inventory command prints; `None` simulates a
    /// missing hypervisor CLI.
    pub fn new(json: Option<&str>) -> Self {
        Self {
            inventory: json.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_binary(mut self, vm_id: &str, binary: &str) -> Self {
        self.binaries
            .entry(vm_id.to_string())
            .or_default()
            .push(binary.to_string());
        self
    }

    pub fn with_output(mut self, vm_id: &str, argv: &str, stdout: &str) -> Self {
        self.outputs
            .insert((vm_id.to_string(), argv.to_string()), stdout.to_string());
        self
    }
}

impl super::Hypervisor for FakeHypervisor {
    async fn list_vms(&self) -> Result<Vec<Vm>, AppError> {
        self.calls.borrow_mut().push("list".into());
        match &self.inventory {
            Some(json) => inventory::parse_inventory(json),
            None => Err(AppError::Io {
                context: "running prlctl".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }

    async fn command_exists(&self, vm: &Vm, command: &str) -> Result<bool, AppError> {
        self.calls
            .borrow_mut()
            .push(format!("whereis {} {command}", vm.id));
        Ok(self
            .binaries
            .get(&vm.id)
            .is_some_and(|bins| bins.iter().any(|b| b == command)))
    }

    async fn exec(&self, vm: &Vm, args: &[&str]) -> Result<String, AppError> {
        let argv = args.join(" ");
        self.calls.borrow_mut().push(format!("exec {} {argv}", vm.id));
        self.outputs
            .get(&(vm.id.clone(), argv.clone()))
            .cloned()
            .ok_or_else(|| AppError::ExternalCommand {
                command: format!("prlctl exec {} {argv}", vm.id),
                message: "no such command".into(),
            })
    }
}
