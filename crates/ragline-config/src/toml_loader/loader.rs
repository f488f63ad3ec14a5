//! Core TOML config loading: read from a path, or from the platform default
//! location with a commented template written on first run.

use crate::schema::RaglineConfig;
use crate::validation;
use ragline_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

use super::template::default_config_toml;

const APP_DIR: &str = "ragline";
const CONFIG_FILE: &str = "config.toml";

/// Load config from a specific TOML file path.
///
/// Deserializes the file using serde defaults for any missing fields,
/// then validates it. Out-of-range values are an error.
pub fn load_from_path(path: &Path) -> Result<RaglineConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(io_error(path))?;

    let config: RaglineConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    validation::validate(&config)?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// `<config dir>/ragline/config.toml`.
///
/// On macOS: `~/Library/Application Support/ragline/config.toml`
/// On Linux: `~/.config/ragline/config.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or(ConfigError::NoConfigDir)
}

/// Load config from `path`, writing the template there first if the file
/// does not exist yet.
pub fn load_or_create(path: &Path) -> Result<RaglineConfig, ConfigError> {
    match load_from_path(path) {
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            write_template(path)?;
            Ok(RaglineConfig::default())
        }
        loaded => loaded,
    }
}

/// Load config from the platform-specific default path.
pub fn load_default() -> Result<RaglineConfig, ConfigError> {
    load_or_create(&default_config_path()?)
}

fn write_template(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    std::fs::write(path, default_config_toml()).map_err(io_error(path))?;

    info!("created default config at {}", path.display());
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::Io { path, source }
}
