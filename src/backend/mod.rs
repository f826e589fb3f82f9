pub mod prlctl;

use crate::config::Settings;
use crate::error::AppError;
use crate::inventory::Vm;

/// The hypervisor collaborators: inventory, in-guest command probe and
/// in-guest command execution.
#[allow(async_fn_in_trait)] // trait is internal-only
pub trait Hypervisor {
    async fn list_vms(&self) -> Result<Vec<Vm>, AppError>;
    /// Whether `command` resolves to a real binary inside the guest.
    async fn command_exists(&self, vm: &Vm, command: &str) -> Result<bool, AppError>;
    /// Run `args` inside the guest and return its stdout.
    async fn exec(&self, vm: &Vm, args: &[&str]) -> Result<String, AppError>;
}

pub fn create_backend(settings: &Settings) -> prlctl::PrlctlBackend {
    prlctl::PrlctlBackend::new(&settings.prlctl)
}

#[cfg(test)]
pub mod fake;
