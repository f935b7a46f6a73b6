//! Settings persistence
//!
//! Locates the configuration file in the platform config directory and
//! loads or saves it.

use crate::config::Config;
use crate::error::{ConfigError, SettingsError, SettingsResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "orientkit";
const CONFIG_FILE: &str = "config.toml";

/// Platform configuration directory for OrientKit
pub fn config_dir() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into()
        })
}

/// Default configuration file path
pub fn default_config_path() -> SettingsResult<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Load the file at `path`, or defaults when it does not exist
pub fn load_or_default(path: &Path) -> SettingsResult<Config> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let config = Config::load_from_file(path)?;
    info!("Loaded settings from {}", path.display());
    Ok(config)
}

/// Save to `path`, creating parent directories as needed
pub fn save(config: &Config, path: &Path) -> SettingsResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
        })?;
    }
    config.save_to_file(path)?;
    info!("Saved settings to {}", path.display());
    Ok(())
}
