use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shellgate_runtime::SandboxConfig;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(path) = path {
        let content =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

        toml::from_str::<Config>(&content).context("Failed to parse TOML config")?
    } else {
        Config::default()
    };

    config.sandbox.workspace_root = expand_path(&config.sandbox.workspace_root);
    Ok(config)
}

/// Expand `~` and environment variables in a configured path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}
