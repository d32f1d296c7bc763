//! services/viewer/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

use crate::settings::Theme;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub target_language: String,
    pub mock_latency: Duration,
    pub settings_path: PathBuf,
    pub default_theme: Theme,
    pub placeholder_pdf: Option<PathBuf>,
    pub allowed_origin: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:5173");

        let max_upload_str = var_or("MAX_UPLOAD_BYTES", "20971520");
        let max_upload_bytes = max_upload_str.parse::<usize>().map_err(|e| {
            ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string(), e.to_string())
        })?;

        // --- Translation Settings ---
        let target_language = var_or("TARGET_LANGUAGE", "ja");
        if target_language.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "TARGET_LANGUAGE".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let latency_str = var_or("MOCK_LATENCY_MS", "600");
        let mock_latency = latency_str
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidValue("MOCK_LATENCY_MS".to_string(), e.to_string()))?;

        // --- Viewer Settings ---
        let settings_path = PathBuf::from(var_or("SETTINGS_PATH", "./viewer-settings.json"));

        let theme_str = var_or("DEFAULT_THEME", "light");
        let default_theme = theme_str
            .parse::<Theme>()
            .map_err(|e| ConfigError::InvalidValue("DEFAULT_THEME".to_string(), e.to_string()))?;

        let placeholder_pdf = lookup("PLACEHOLDER_PDF")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_address,
            log_level,
            target_language,
            mock_latency,
            settings_path,
            default_theme,
            placeholder_pdf,
            allowed_origin,
            max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.target_language, "ja");
        assert_eq!(config.mock_latency, Duration::from_millis(600));
        assert_eq!(config.default_theme, Theme::Light);
        assert!(config.placeholder_pdf.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("RUST_LOG", "debug"),
            ("TARGET_LANGUAGE", "de"),
            ("MOCK_LATENCY_MS", "0"),
            ("DEFAULT_THEME", "dark"),
            ("PLACEHOLDER_PDF", "assets/placeholder.pdf"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.target_language, "de");
        assert_eq!(config.mock_latency, Duration::ZERO);
        assert_eq!(config.default_theme, Theme::Dark);
        assert_eq!(
            config.placeholder_pdf,
            Some(PathBuf::from("assets/placeholder.pdf"))
        );
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[("MOCK_LATENCY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "MOCK_LATENCY_MS"));

        let err = config_from(&[("DEFAULT_THEME", "sepia")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "DEFAULT_THEME"));
    }
}
