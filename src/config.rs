//! Configuration handling for the eportal login tool
//!
//! The config file is a JSON record shared with the desktop input form:
//! `student_id`, `password` and a list of webhook URLs. Missing fields
//! default to empty so a partially filled file still loads.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub webhook_urls: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load the config, falling back to an empty one.
    ///
    /// A missing file is normal (first run); an unreadable or malformed
    /// file is logged and treated the same way, so the caller always gets
    /// a config and the completeness check decides what happens next.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Both credential fields are present. Without them no login attempt
    /// is made at all.
    pub fn is_complete(&self) -> bool {
        !self.student_id.is_empty() && !self.password.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            student_id: "E02114000".to_string(),
            password: "secret".to_string(),
            webhook_urls: vec!["https://example.com/webhook".to_string()],
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.student_id, "E02114000");
        assert_eq!(loaded.password, "secret");
        assert_eq!(loaded.webhook_urls.len(), 1);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"student_id": "E02114000"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.student_id, "E02114000");
        assert!(config.password.is_empty());
        assert!(config.webhook_urls.is_empty());
        assert!(!config.is_complete());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("nope.json"));
        assert!(config.student_id.is_empty());
        assert!(!config.is_complete());
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json at all").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.student_id.is_empty());
    }

    #[test]
    fn test_is_complete() {
        let mut config = Config {
            student_id: "E02114000".to_string(),
            password: "secret".to_string(),
            webhook_urls: vec![],
        };
        assert!(config.is_complete());

        config.password.clear();
        assert!(!config.is_complete());

        config.password = "secret".to_string();
        config.student_id.clear();
        assert!(!config.is_complete());
    }
}
