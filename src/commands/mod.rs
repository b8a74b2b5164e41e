// Command handlers module
pub mod check;
pub mod config;
pub mod gpu;
pub mod run;

use crate::core::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Config from `--config`, else the per-user file, else defaults
pub(crate) fn load_config(matches: &clap::ArgMatches) -> Result<Config> {
    match matches.get_one::<String>("config") {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load configuration from {}", path)),
        None => Config::load_default().context("Failed to load configuration"),
    }
}
