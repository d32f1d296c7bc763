//! services/viewer/src/settings.rs
//!
//! Process-wide viewer settings. `SettingsStore` is the only component that reads
//! or writes the persisted theme; it is loaded once at startup and shared through
//! `AppState`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(SettingsError::UnknownTheme(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("'{0}' is not a theme (expected 'light' or 'dark')")]
    UnknownTheme(String),
    #[error("Failed to write settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk shape of the settings file.
#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    theme: Theme,
    updated_at: DateTime<Utc>,
}

pub struct SettingsStore {
    path: PathBuf,
    theme: RwLock<Theme>,
}

impl SettingsStore {
    /// Reads the settings file at `path`. A missing file falls back to
    /// `default_theme`; so does an unreadable one, with a warning.
    pub async fn load(path: impl Into<PathBuf>, default_theme: Theme) -> Self {
        let path = path.into();
        let theme = match tokio::fs::read(&path).await {
            Ok(raw) => match serde_json::from_slice::<SettingsFile>(&raw) {
                Ok(file) => {
                    info!(theme = %file.theme, path = %path.display(), "Loaded viewer settings.");
                    file.theme
                }
                Err(e) => {
                    warn!(path = %path.display(), "Ignoring corrupt settings file: {}", e);
                    default_theme
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => default_theme,
            Err(e) => {
                warn!(path = %path.display(), "Could not read settings file: {}", e);
                default_theme
            }
        };
        Self {
            path,
            theme: RwLock::new(theme),
        }
    }

    pub async fn theme(&self) -> Theme {
        *self.theme.read().await
    }

    /// Persists `theme` and makes it the current value.
    pub async fn set_theme(&self, theme: Theme) -> Result<(), SettingsError> {
        let mut current = self.theme.write().await;
        let file = SettingsFile {
            theme,
            updated_at: Utc::now(),
        };
        let encoded = serde_json::to_vec_pretty(&file)?;
        tokio::fs::write(&self.path, encoded).await?;
        *current = theme;
        info!(theme = %theme, "Theme preference saved.");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
