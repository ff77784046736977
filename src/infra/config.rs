use crate::domain::UnitFileOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE_NAME: &str = "quadbox.toml";

/// Where rootless Quadlet looks for user units.
pub const DEFAULT_OUTPUT_DIR: &str = "~/.config/containers/systemd";

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
        .join(".config/quadbox")
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub dir: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,
    /// `[unit]`, `[service]`, `[install]` and `[global_args]` defaults.
    #[serde(flatten)]
    pub options: UnitFileOptions,
}

impl AppConfig {
    /// Merges another AppConfig into self.
    /// Scalars from `other` win; lists are appended without duplicates.
    pub fn merge(&mut self, other: AppConfig) {
        if let Some(dir) = other.output.dir {
            self.output.dir = Some(dir);
        }
        self.options = self.options.merged(&other.options);
    }

    /// Output directory: the explicit override if given, else the configured
    /// one, else [`DEFAULT_OUTPUT_DIR`], with a leading `~` expanded.
    pub fn output_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(dir) = cli_override {
            return expand(&dir.to_string_lossy());
        }
        expand(self.output.dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("parsing {:?}", path))
}

/// Loads `<config_dir>/quadbox.toml`, then merges `./quadbox.toml` on top.
pub fn load_app_config(config_dir: &Path) -> Result<AppConfig> {
    load_layered(
        &config_dir.join(DEFAULT_CONFIG_FILE_NAME),
        &PathBuf::from("./").join(DEFAULT_CONFIG_FILE_NAME),
    )
}

/// Reads `global` then `local`, each only if it exists.
pub fn load_layered(global: &Path, local: &Path) -> Result<AppConfig> {
    let mut app_config = AppConfig::default();

    if global.exists() {
        debug!("Loading global config from {:?}", global);
        app_config = read_config(global).context("global config")?;
    }

    if local.exists() {
        debug!("Loading local config from {:?}", local);
        app_config.merge(read_config(local).context("local config")?);
    }

    Ok(app_config)
}
