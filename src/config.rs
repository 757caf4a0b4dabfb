use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::level_session::DEFAULT_RESULT_DELAY;
use crate::store::sync::DEFAULT_WRITE_ATTEMPTS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Local,
    Remote,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_store")]
    pub store: StoreBackend,
    #[serde(default)]
    pub remote_url: String,
    #[serde(default)]
    pub remote_token: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,
    #[serde(default = "default_result_delay_ms")]
    pub result_delay_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "chalkboard".to_string()
}
fn default_store() -> StoreBackend {
    StoreBackend::Local
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mathchamp")
        .to_string_lossy()
        .to_string()
}
fn default_write_retries() -> u32 {
    DEFAULT_WRITE_ATTEMPTS
}
fn default_result_delay_ms() -> u64 {
    DEFAULT_RESULT_DELAY.as_millis() as u64
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            store: default_store(),
            remote_url: String::new(),
            remote_token: None,
            data_dir: default_data_dir(),
            write_retries: default_write_retries(),
            result_delay_ms: default_result_delay_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathchamp")
            .join("config.toml")
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_path().join("mathchamp.log")
    }

    pub fn result_delay(&self) -> Duration {
        Duration::from_millis(self.result_delay_ms)
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn normalize(&mut self) {
        self.write_retries = self.write_retries.clamp(1, 10);
        self.result_delay_ms = self.result_delay_ms.clamp(200, 5000);
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
        self.remote_url = self.remote_url.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.store, StoreBackend::Local);
        assert_eq!(config.write_retries, 3);
        assert_eq!(config.result_delay_ms, 1200);
        assert!(config.remote_url.is_empty());
        assert!(config.data_dir.contains("mathchamp"));
    }

    #[test]
    fn test_config_partial_file() {
        let toml_str = r#"
theme = "paper"
store = "remote"
remote_url = "https://api.example.test/entities"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "paper");
        assert_eq!(config.store, StoreBackend::Remote);
        assert_eq!(config.remote_url, "https://api.example.test/entities");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.theme, deserialized.theme);
        assert_eq!(config.store, deserialized.store);
        assert_eq!(config.data_dir, deserialized.data_dir);
        assert_eq!(config.result_delay_ms, deserialized.result_delay_ms);
    }

    #[test]
    fn test_normalize_clamps_values() {
        let mut config = Config::default();
        config.write_retries = 0;
        config.result_delay_ms = 60_000;
        config.data_dir = "   ".to_string();
        config.remote_url = " https://x.test ".to_string();
        config.normalize();
        assert_eq!(config.write_retries, 1);
        assert_eq!(config.result_delay_ms, 5000);
        assert!(!config.data_dir.trim().is_empty());
        assert_eq!(config.remote_url, "https://x.test");
    }
}
