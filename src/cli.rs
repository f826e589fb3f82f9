use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ssh-parallels",
    about = "Pick a running Parallels VM and ssh into it"
)]
pub struct Cli {
    /// Set ssh port
    #[arg(short, long, default_value_t = 22)]
    pub port: u16,

    /// Set username to ssh login
    #[arg(short, long, visible_short_alias = 'l', default_value = "root")]
    pub user: String,

    /// Ask username before login
    #[arg(short, long)]
    pub ask: bool,
}
