use super::super::{ExtensionConfig, GatewayConfig, HistoryConfig, LlmConfig};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub extension: ExtensionConfig,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Root directory for config and data files (`~/.formaid`).
    pub fn default_data_dir() -> PathBuf {
        UserDirs::new()
            .map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf())
            .join(".formaid")
    }

    /// Config rooted at an explicit directory instead of the home directory.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            config_path: data_dir.join("config.toml"),
            data_dir,
            ..Self::default()
        }
    }

    pub fn history_db_path(&self) -> PathBuf {
        self.history
            .database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("history.db"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "llm.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.llm.provider.trim().is_empty() || self.llm.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "llm.provider and llm.model must not be empty".into(),
            ));
        }
        if self.history.max_limit == 0 || self.history.default_limit == 0 {
            return Err(ConfigError::Validation(
                "history limits must be greater than zero".into(),
            ));
        }
        if self.history.default_limit > self.history.max_limit {
            return Err(ConfigError::Validation(format!(
                "history.default_limit ({}) exceeds history.max_limit ({})",
                self.history.default_limit, self.history.max_limit
            )));
        }
        if self.history.max_connections == 0 {
            return Err(ConfigError::Validation(
                "history.max_connections must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = Self::default_data_dir();

        Self {
            config_path: data_dir.join("config.toml"),
            data_dir,
            log_level: default_log_level(),
            llm: LlmConfig::default(),
            gateway: GatewayConfig::default(),
            history: HistoryConfig::default(),
            extension: ExtensionConfig::default(),
        }
    }
}
