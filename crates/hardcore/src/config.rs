//! Configuration for the admin tool.
//!
//! The admin tool shares `config.toml` with the hardcore system. It only reads its
//! own `[logging]` and `[storage]` sections and ignores everything else; the world
//! definitions in the same file belong to [`hardcore_system::WorldGroupRegistry`].

use hardcore_system::config::{DEFAULT_DATA_FILE, MESSAGES};
use hardcore_system::ConfigDocument;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Settings the admin tool reads from the shared configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Player state file, relative to the configuration file's directory
    #[serde(rename = "data-file", default = "default_data_file")]
    pub data_file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration, creating a default file when none exists.
    ///
    /// A created file holds the hardcore defaults together with this tool's
    /// sections, so the registry opening the same file finds a complete document.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let document = default_config.default_document()?;
            tokio::fs::write(path, document.to_toml_string()?).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    fn default_document(&self) -> Result<ConfigDocument, Box<dyn std::error::Error>> {
        let mut document = ConfigDocument::with_defaults();
        if let toml::Value::Table(sections) = toml::Value::try_from(self)? {
            for (key, value) in sections {
                document.set_in(&[key.as_str()], value);
            }
        }
        document.set_in(&[MESSAGES], toml::Value::Table(toml::Table::new()));
        Ok(document)
    }

    /// Where player state lives for a configuration file at `config_path`.
    pub fn data_path(&self, config_path: &Path) -> PathBuf {
        config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(&self.storage.data_file)
    }

    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        if self.storage.data_file.trim().is_empty() {
            return Err("storage.data-file cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.data_file, "data.json");
    }

    #[tokio::test]
    async fn test_load_creates_shared_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert!(!config.logging.json_format);
        assert!(path.exists());

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let document = ConfigDocument::parse(&content).unwrap();
        assert_eq!(document.hub_world().as_str(), "world");
        assert_eq!(document.get_str("logging.level"), Some("info"));
        assert_eq!(document.data_file(), "data.json");
    }

    #[tokio::test]
    async fn test_load_ignores_world_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
hub-world = "lobby"

[logging]
level = "debug"
json_format = true

[storage]
data-file = "state/players.json"

[hardcore-worlds.hc-1]
dimensions = ["hc-1"]
"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert_eq!(
            config.data_path(&path),
            dir.path().join("state/players.json")
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "warn".to_string();
        config.storage.data_file = " ".to_string();
        assert!(config.validate().is_err());
    }
}
