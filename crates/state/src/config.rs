//! Configuration file support for dipia.
//!
//! Loads settings from `~/.dipia/config.toml` (or `DIPIA_CONFIG`) with the
//! following precedence: CLI arguments > Environment variables > Config file
//!
//! ## Configuration File Format
//!
//! ```toml
//! [serve]
//! http = "127.0.0.1:5000"
//! auth_token = "your-secret-token"
//! cors_origins = "http://localhost:3000"
//! store = "/var/lib/dipia/catalog.json"
//! fetch_timeout_ms = 2000
//!
//! # Pathology vocabulary used when matching detections against the catalog.
//! [engine.synonyms]
//! crack = "grieta"
//! humidity = "humedad"
//!
//! # Labels for detector class ids, used when a detection arrives unlabelled.
//! [detector.classes]
//! 0 = "Person"
//! 1 = "Crack"
//! 2 = "Humidity"
//! ```

use crate::env::config_path;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub serve: ServeConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
}

/// Configuration for the serve command.
#[derive(Debug, Default, Deserialize)]
pub struct ServeConfig {
    /// Bind address for the HTTP surface.
    pub http: Option<String>,
    /// Bearer token required on every request.
    pub auth_token: Option<String>,
    /// Comma-separated list of allowed CORS origins.
    pub cors_origins: Option<String>,
    /// Catalog file path.
    pub store: Option<String>,
    /// Catalog fetch timeout in milliseconds.
    pub fetch_timeout_ms: Option<u64>,
}

/// Recommendation engine vocabulary.
#[derive(Debug, Default, Deserialize)]
pub struct EngineConfig {
    /// Raw detector label -> catalog vocabulary. Empty means built-in defaults.
    #[serde(default)]
    pub synonyms: BTreeMap<String, String>,
}

/// Detector class layout.
#[derive(Debug, Default, Deserialize)]
pub struct DetectorConfig {
    /// Class id (as a TOML key) -> label. Empty means built-in defaults.
    #[serde(default)]
    pub classes: BTreeMap<String, String>,
}

impl DetectorConfig {
    /// Class entries with their ids parsed.
    pub fn class_pairs(&self) -> Result<Vec<(i64, String)>> {
        self.classes
            .iter()
            .map(|(id, label)| {
                let id = id
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("detector class id is not an integer: {id:?}"))?;
                Ok((id, label.clone()))
            })
            .collect()
    }
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but fails to parse.
pub fn load_config() -> Result<Option<Config>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    load_config_from(&path)
}

/// Loads the configuration from `path`, `Ok(None)` when absent.
pub fn load_config_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;

    tracing::debug!(
        target: "dipia::config",
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}

/// Applies `[serve]` settings to environment variables.
///
/// Only sets environment variables that are not already set, preserving
/// the precedence: CLI > ENV > config file.
pub fn apply_config_to_env(config: &Config) {
    fn set_if_absent(key: &str, value: &str) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
            tracing::trace!(
                target: "dipia::config",
                key,
                "Set environment variable from config file"
            );
        }
    }

    let serve = &config.serve;
    if let Some(ref http) = serve.http {
        set_if_absent("DIPIA_HTTP", http);
    }
    if let Some(ref token) = serve.auth_token {
        set_if_absent("DIPIA_AUTH_TOKEN", token);
    }
    if let Some(ref origins) = serve.cors_origins {
        set_if_absent("DIPIA_CORS_ORIGINS", origins);
    }
    if let Some(ref store) = serve.store {
        set_if_absent("DIPIA_STORE", store);
    }
    if let Some(ms) = serve.fetch_timeout_ms {
        set_if_absent("DIPIA_FETCH_TIMEOUT_MS", &ms.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.serve.http.is_none());
        assert!(config.engine.synonyms.is_empty());
        assert!(config.detector.classes.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [serve]
            http = "0.0.0.0:8080"
            auth_token = "secret"
            cors_origins = "http://localhost:3000"
            store = "/tmp/catalog.json"
            fetch_timeout_ms = 500

            [engine.synonyms]
            crack = "grieta"
            Humidity = "humedad"

            [detector.classes]
            0 = "Humedad"
            1 = "Crack"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.serve.http.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(config.serve.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.serve.fetch_timeout_ms, Some(500));
        assert_eq!(config.engine.synonyms.get("crack").unwrap(), "grieta");
        assert_eq!(config.engine.synonyms.get("Humidity").unwrap(), "humedad");
        assert_eq!(
            config.detector.class_pairs().unwrap(),
            vec![(0, "Humedad".to_string()), (1, "Crack".to_string())]
        );
    }

    #[test]
    fn non_numeric_class_id_is_an_error() {
        let config: Config = toml::from_str("[detector.classes]\nzero = \"Person\"").unwrap();
        let err = config.detector.class_pairs().unwrap_err();
        assert!(err.to_string().contains("zero"));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_from(&dir.path().join("config.toml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[serve\nhttp = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    #[serial]
    fn apply_config_respects_existing_env_vars() {
        let original = std::env::var("DIPIA_AUTH_TOKEN").ok();
        let original_store = std::env::var("DIPIA_STORE").ok();
        std::env::set_var("DIPIA_AUTH_TOKEN", "env-token");
        std::env::remove_var("DIPIA_STORE");

        let config = Config {
            serve: ServeConfig {
                auth_token: Some("config-token".to_string()),
                store: Some("/tmp/from-config.json".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        apply_config_to_env(&config);

        assert_eq!(std::env::var("DIPIA_AUTH_TOKEN").unwrap(), "env-token");
        assert_eq!(std::env::var("DIPIA_STORE").unwrap(), "/tmp/from-config.json");

        match original {
            Some(v) => std::env::set_var("DIPIA_AUTH_TOKEN", v),
            None => std::env::remove_var("DIPIA_AUTH_TOKEN"),
        }
        match original_store {
            Some(v) => std::env::set_var("DIPIA_STORE", v),
            None => std::env::remove_var("DIPIA_STORE"),
        }
    }
}
