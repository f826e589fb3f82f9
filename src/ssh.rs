use std::net::Ipv4Addr;
use std::process::Stdio;

use crate::error::AppError;

/// Where and as whom to open the remote shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub ip: Ipv4Addr,
    pub user: String,
    pub port: u16,
}

impl SshTarget {
    pub fn args(&self) -> Vec<String> {
        vec![
            self.ip.to_string(),
            "-l".into(),
            self.user.clone(),
            "-p".into(),
            self.port.to_string(),
        ]
    }
}

#[allow(async_fn_in_trait)] // trait is internal-only
pub trait ShellLauncher {
    /// Run the remote shell on the current console and wait for it to exit.
    async fn launch(&self, target: &SshTarget) -> Result<(), AppError>;
}

pub struct SshLauncher {
    program: String,
}

impl SshLauncher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ShellLauncher for SshLauncher {
    async fn launch(&self, target: &SshTarget) -> Result<(), AppError> {
        let args = target.args();
        tracing::info!(program = %self.program, ?args, "launching remote shell");

        let mut child = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| AppError::Io {
                context: format!("running {}", self.program),
                source: e,
            })?;

        // Ctrl+C belongs to the remote session while it runs.
        loop {
            tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(s) => tracing::debug!("{} exited with {s}", self.program),
                        Err(e) => tracing::warn!("{} wait failed: {e}", self.program),
                    }
                    return Ok(());
                }
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }
}
