//! Client configuration.
//!
//! # Design
//! The base URL is the only setting. It is layered with the `config` crate:
//! built-in default, then an optional TOML file, then `EXPENSE_*`
//! environment variables (`EXPENSE_BASE_URL`).

use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_CONFIG_PATH: &str = "config/expense.toml";

/// Client settings. The base URL is the only knob.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from `config/expense.toml` (optional) and `EXPENSE_*` env vars.
    pub fn load() -> Result<Self, ApiError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Environment variables win over the file; missing keys keep their
    /// defaults.
    pub fn load_from(path: &str) -> Result<Self, ApiError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("EXPENSE"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("expense-core-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn file_overrides_default_base_url() {
        let path = scratch_file("override.toml", "base_url = \"http://expenses.internal:8080\"\n");
        let config = ClientConfig::load_from(path.to_str().unwrap()).unwrap();
        if std::env::var("EXPENSE_BASE_URL").is_err() {
            assert_eq!(config.base_url, "http://expenses.internal:8080");
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ClientConfig::load_from("does/not/exist.toml").unwrap();
        if std::env::var("EXPENSE_BASE_URL").is_err() {
            assert_eq!(config, ClientConfig::default());
        }
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let path = scratch_file("broken.toml", "base_url = [unterminated\n");
        let err = ClientConfig::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
