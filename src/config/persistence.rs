use super::settings::RoomPlayerConfig;
use crate::error::ConfigError;
use ::config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::info;

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "ROOM_PLAYER_CONFIG";
/// Prefix for per-key overrides, e.g. `ROOM_PLAYER__SERVER__USER_ID=7`
pub const ENV_PREFIX: &str = "ROOM_PLAYER";
const DEFAULT_CONFIG_FILE: &str = "room-player.json";

pub fn get_config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the config file (optional) and apply environment overrides
pub fn load_config(path: &Path) -> Result<RoomPlayerConfig, ConfigError> {
    info!("Loading config from {}", path.display());
    let settings = Config::builder()
        .add_source(
            File::from(path)
                .format(FileFormat::Json)
                .required(false),
        )
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: RoomPlayerConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &RoomPlayerConfig) -> Result<(), ConfigError> {
    config.validate()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    info!("Saved config to {}", path.display());
    Ok(())
}
