//! Application configuration loader for Parley.
//!
//! Reads `config.toml` from `{config_dir}/parley/` (or an explicit path) and
//! deserializes it into [`AppConfig`]. Falls back to defaults when the file
//! is missing or malformed.

use std::path::{Path, PathBuf};

use parley_types::config::AppConfig;
use parley_types::error::ConfigError;

/// Default location of the config file, e.g. `~/.config/parley/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("parley").join("config.toml"))
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
pub async fn load_app_config(path: &Path) -> AppConfig {
    match read_app_config(path).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            AppConfig::default()
        }
        Err(err) => {
            tracing::warn!("Failed to load {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Strict variant of [`load_app_config`]: `Ok(None)` when the file is missing.
pub async fn read_app_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|e| ConfigError::Parse(e.to_string()))
}
