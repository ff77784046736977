mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{ComposeCommand, RunCommand};
use quadbox::infra::config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quadbox",
    version,
    about = "Convert docker/podman run commands and compose files into Podman Quadlet units"
)]
struct Cli {
    /// Configuration directory (default: ~/.config/quadbox)
    #[arg(long, env = "QUADBOX_CONFIG_DIR", default_value_os_t = config::default_config_dir())]
    config_dir: std::path::PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a `docker run` / `podman run` command into a .container unit
    Run(RunCommand),
    /// Convert every service of a compose file into .container units
    Compose(ComposeCommand),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(cmd) => cli::run::run(cmd, &cli.config_dir),
        Commands::Compose(cmd) => cli::compose::run(cmd, &cli.config_dir),
    }
}
