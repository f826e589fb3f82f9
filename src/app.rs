//! One run: discover addresses, let the operator pick one, connect.

use std::io::Write;

use crate::backend::Hypervisor;
use crate::config::Settings;
use crate::correlate::ResolvedAddress;
use crate::discovery;
use crate::error::{AppError, UiError};
use crate::ssh::{ShellLauncher, SshTarget};
use crate::tui::Console;

pub const MENU_TITLE: &str = "Choose VM from parallels";
pub const NO_VM_MESSAGE: &str = "no available(running) vm found!";
pub const CANCEL_MESSAGE: &str = "cancel login to vm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to connect to.
    NoVms,
    /// Operator backed out of the menu.
    Cancelled,
    /// The terminal failed; no connection attempted.
    Aborted,
    Connected(SshTarget),
}

fn io_err(e: std::io::Error) -> AppError {
    AppError::Io {
        context: "writing to stderr".into(),
        source: e,
    }
}

/// Username to log in with: the flag value, or the prompt's answer when
/// `--ask` is set. Any prompt failure or empty answer keeps the flag value.
pub fn resolve_username<C: Console>(
    settings: &Settings,
    console: &mut C,
    addr: &ResolvedAddress,
) -> String {
    if !settings.ask {
        return settings.user.clone();
    }
    let label = format!("Enter your username for {}", addr.label());
    match console.ask(&label) {
        Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(_) => settings.user.clone(),
        Err(e) => {
            tracing::debug!("username prompt failed, using {}: {e}", settings.user);
            settings.user.clone()
        }
    }
}

pub async fn run<H, C, L, W>(
    settings: &Settings,
    hypervisor: &H,
    console: &mut C,
    launcher: &L,
    out: &mut W,
) -> Result<RunOutcome, AppError>
where
    H: Hypervisor,
    C: Console,
    L: ShellLauncher,
    W: Write,
{
    let vms = discovery::load_inventory(hypervisor).await;
    let probes = discovery::discover(hypervisor, vms).await;
    let addrs = discovery::reachable(probes);

    if addrs.is_empty() {
        writeln!(out, "{NO_VM_MESSAGE}").map_err(io_err)?;
        return Ok(RunOutcome::NoVms);
    }

    let rows = addrs.iter().map(ResolvedAddress::menu_row).collect();
    let index = match console.select(MENU_TITLE, rows) {
        Ok(index) => index,
        Err(UiError::Interrupted) => {
            writeln!(out, "{CANCEL_MESSAGE}").map_err(io_err)?;
            return Ok(RunOutcome::Cancelled);
        }
        Err(UiError::Cancelled) => return Ok(RunOutcome::Cancelled),
        Err(e) => {
            tracing::warn!("menu aborted: {e}");
            writeln!(out, "{e}").map_err(io_err)?;
            return Ok(RunOutcome::Aborted);
        }
    };

    let Some(addr) = addrs.get(index) else {
        return Ok(RunOutcome::Aborted);
    };
    let Some(ip) = addr.ip() else {
        return Ok(RunOutcome::Aborted);
    };

    let target = SshTarget {
        ip,
        user: resolve_username(settings, console, addr),
        port: settings.port,
    };
    launcher.launch(&target).await?;
    Ok(RunOutcome::Connected(target))
}
