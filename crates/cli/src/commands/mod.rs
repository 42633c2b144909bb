pub mod doctor;
pub mod onboard;
pub mod run;

use std::path::PathBuf;

use anyhow::Context;
use snap2pdf_config::AppConfig;

/// Config file given on the command line, or the default location.
pub fn config_path(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

pub fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let path = config_path(path);
    AppConfig::load_with_env(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
