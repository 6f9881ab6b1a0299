use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use pushka_bridge::config::Config;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

/// Folder created under the system temporary directory when no scratch
/// directory is configured.
const DEFAULT_SCRATCH_FOLDER: &str = "pushka-attachments";

/// Errors that can occur while loading or resolving application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine the user's configuration directory. This usually
    /// occurs when required environment variables are missing (e.g., `$HOME`
    /// on Unix or `%APPDATA%` on Windows).
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    /// An I/O error occurred while reading or writing the configuration file.
    #[error("failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid TOML or does not match the expected structure.
    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
    /// Failed to serialize the default configuration to TOML.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

fn config_path() -> Result<PathBuf, ConfigError> {
    match ProjectDirs::from("dev", "pushka", "pushka") {
        Some(dirs) => Ok(dirs.config_dir().join("config.toml")),
        None => Err(ConfigError::DirectoriesNotFound),
    }
}

/// Loads the application configuration from the user's config directory.
pub async fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path()?).await
}

/// Loads `path`, writing a default configuration there first if it is missing.
pub async fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    log::info!("Loading configuration from {path:?}");
    if path.exists() {
        let contents = read_to_string(path).await?;
        return Ok(toml::from_str(&contents)?);
    }

    let config = Config::default();
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }

    let contents = toml::to_string_pretty(&config)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(config)
}

/// Directory under which per-request enrichment scopes are created.
pub fn scratch_dir(config: &Config) -> PathBuf {
    config
        .enrichment
        .scratch_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_SCRATCH_FOLDER))
}
