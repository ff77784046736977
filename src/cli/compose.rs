use super::{OutputArgs, emit};
use anyhow::{Context, Result};
use clap::Args;
use quadbox::infra::load_app_config;
use quadbox::services::convert_compose;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub struct ComposeCommand {
    /// Compose file to convert (`-` reads stdin)
    pub file: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

fn read_manifest(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading compose file from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(file).with_context(|| format!("reading {:?}", file))
}

pub fn run(cmd: ComposeCommand, config_dir: &Path) -> Result<()> {
    let app_config = load_app_config(config_dir)?;
    let text = read_manifest(&cmd.file)?;

    info!("Converting {:?}", cmd.file);
    let units = convert_compose(&text, &app_config.options)
        .with_context(|| format!("converting {:?}", cmd.file))?;

    emit(&units, &cmd.output, &app_config)
}
