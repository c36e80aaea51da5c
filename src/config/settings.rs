use crate::error::ConfigError;
use crate::network::messages::UserId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `ws://` or `wss://` endpoint of the playback server
    pub url: String,
    /// Id of the local listener
    pub user_id: UserId,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5000".to_string(),
            user_id: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerPreferences {
    pub tick_interval_ms: u64,
}

impl Default for PlayerPreferences {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Human-readable lines
    Text,
    /// One JSON event per line, for an external frontend
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    pub mode: UiMode,
    pub toast_duration_ms: u64,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            mode: UiMode::Text,
            toast_duration_ms: 6000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    pub max_retries: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 999,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomPlayerConfig {
    pub server: ServerConfig,
    pub player: PlayerPreferences,
    pub ui: UiPreferences,
    pub reconnect: ReconnectConfig,
}

impl RoomPlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server_url()?;
        if self.player.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "player.tick_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.server.url)?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(ConfigError::Invalid(format!(
                "server.url must use ws or wss, got {}",
                other
            ))),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.player.tick_interval_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.ui.toast_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RoomPlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.toast_duration(), Duration::from_secs(6));
    }

    #[test]
    fn test_rejects_http_url() {
        let mut config = RoomPlayerConfig::default();
        config.server.url = "http://127.0.0.1:5000".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.server.url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Url(_))));
    }

    #[test]
    fn test_rejects_zero_tick() {
        let mut config = RoomPlayerConfig::default();
        config.player.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RoomPlayerConfig =
            serde_json::from_str(r#"{"server":{"user_id":42},"ui":{"mode":"json"}}"#).unwrap();
        assert_eq!(config.server.user_id, 42);
        assert_eq!(config.server.url, "ws://127.0.0.1:5000");
        assert_eq!(config.ui.mode, UiMode::Json);
        assert_eq!(config.ui.toast_duration_ms, 6000);
    }
}
