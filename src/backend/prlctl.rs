use crate::error::AppError;
use crate::inventory::{self, Vm};

/// Parallels Desktop through its `prlctl` command line tool.
pub struct PrlctlBackend {
    program: String,
}

impl PrlctlBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, AppError> {
        tracing::debug!(program = %self.program, ?args, "running");
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::Io {
                context: format!("running {}", self.program),
                source: e,
            })?;

        if !output.status.success() {
            return Err(AppError::ExternalCommand {
                command: format!("{} {}", self.program, args.join(" ")),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl super::Hypervisor for PrlctlBackend {
    async fn list_vms(&self) -> Result<Vec<Vm>, AppError> {
        let json = self.run(&["list", "-a", "--info", "-j"]).await?;
        inventory::parse_inventory(&json)
    }

    async fn command_exists(&self, vm: &Vm, command: &str) -> Result<bool, AppError> {
        let output = self.exec(vm, &["whereis", command]).await?;
        Ok(whereis_has_binary(&output, command))
    }

    async fn exec(&self, vm: &Vm, args: &[&str]) -> Result<String, AppError> {
        let mut full = vec!["exec", vm.id.as_str()];
        full.extend_from_slice(args);
        self.run(&full).await
    }
}

/// `whereis ip` prints `ip: /usr/sbin/ip /usr/share/man/man8/ip.8.gz`, or
/// just `ip:` when nothing was found.
pub fn whereis_has_binary(output: &str, command: &str) -> bool {
    let prefix = format!("{command}:");
    output
        .lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .is_some_and(|rest| !rest.trim().is_empty())
}
