use super::{OutputArgs, emit};
use anyhow::{Context, Result};
use clap::Args;
use quadbox::infra::load_app_config;
use quadbox::parser::CommandInput;
use quadbox::services::convert_run_command;
use std::path::Path;

#[derive(Args, Debug)]
pub struct RunCommand {
    #[command(flatten)]
    pub output: OutputArgs,

    /// The docker/podman run command, either as separate arguments or one quoted string
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl RunCommand {
    fn input(&self) -> CommandInput {
        match self.args.as_slice() {
            [line] => CommandInput::from(line),
            args => CommandInput::from(args.to_vec()),
        }
    }
}

pub fn run(cmd: RunCommand, config_dir: &Path) -> Result<()> {
    let app_config = load_app_config(config_dir)?;

    let unit = convert_run_command(cmd.input(), &app_config.options)
        .context("converting run command")?;

    emit(&[unit], &cmd.output, &app_config)
}
