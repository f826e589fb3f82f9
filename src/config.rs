use std::path::PathBuf;

use crate::cli::Cli;

pub const PRLCTL_ENV: &str = "SSH_PARALLELS_PRLCTL";
pub const SSH_ENV: &str = "SSH_PARALLELS_SSH";
pub const LOG_ENV: &str = "SSH_PARALLELS_LOG";

/// Resolved runtime settings: command-line flags plus environment overrides
/// for the external programs. Nothing is read from or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub user: String,
    pub ask: bool,
    /// Hypervisor CLI used for inventory and in-guest commands.
    pub prlctl: String,
    /// Remote shell client.
    pub ssh: String,
    /// Debug log destination, if file logging was requested.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    pub fn resolve(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        Self {
            port: cli.port,
            user: cli.user.clone(),
            ask: cli.ask,
            prlctl: non_empty(PRLCTL_ENV).unwrap_or_else(|| "prlctl".into()),
            ssh: non_empty(SSH_ENV).unwrap_or_else(|| "ssh".into()),
            log_file: non_empty(LOG_ENV).map(PathBuf::from),
        }
    }
}
