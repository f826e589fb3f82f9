use clap::Parser;

use ssh_parallels::app;
use ssh_parallels::backend;
use ssh_parallels::cli::Cli;
use ssh_parallels::config::Settings;
use ssh_parallels::logging;
use ssh_parallels::ssh::SshLauncher;
use ssh_parallels::tui::TerminalConsole;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let log_file = logging::init();
    let settings = Settings::from_cli(&cli);

    if let Some(path) = &settings.log_file
        && let Err(e) = log_file.attach(path)
    {
        eprintln!("cannot open log file {}: {e}", path.display());
    }
    tracing::debug!(?settings, "starting");

    let hypervisor = backend::create_backend(&settings);
    let launcher = SshLauncher::new(&settings.ssh);
    let mut console = TerminalConsole;
    let mut stderr = std::io::stderr();

    let outcome = app::run(&settings, &hypervisor, &mut console, &launcher, &mut stderr).await?;
    tracing::debug!(?outcome, "finished");
    Ok(())
}
