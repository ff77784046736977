pub mod compose;
pub mod run;

use anyhow::Result;
use clap::Args;
use quadbox::infra::{AppConfig, DirectoryWriter, DryRunWriter, write_units};
use quadbox::services::GeneratedUnit;
use std::io;
use std::path::PathBuf;

pub use compose::ComposeCommand;
pub use run::RunCommand;

/// Where generated units go
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output directory (default: [output] dir from quadbox.toml, else ~/.config/containers/systemd)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print the units to stdout instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn emit(units: &[GeneratedUnit], output: &OutputArgs, app_config: &AppConfig) -> Result<()> {
    if output.dry_run {
        let mut writer = DryRunWriter::new(io::stdout().lock());
        return write_units(&mut writer, units);
    }

    let mut writer = DirectoryWriter::new(app_config.output_dir(output.output_dir.as_deref()));
    write_units(&mut writer, units)?;
    println!(
        "Wrote {} unit(s) to {}",
        units.len(),
        writer.dir().display()
    );
    Ok(())
}
