use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

use crate::config;
use crate::shared::error::{AppError, AppResult};

/// Which DeepL plan the API key belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    #[default]
    Free,
    Pro,
}

impl ApiType {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ApiType::Free => config::DEEPL_FREE_ENDPOINT,
            ApiType::Pro => config::DEEPL_PRO_ENDPOINT,
        }
    }
}

/// User settings as stored by the extension popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub source_lang: String,
    pub target_lang: String,
    pub api_key: String,
    pub api_type: ApiType,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            source_lang: config::DEFAULT_SOURCE_LANG.to_string(),
            target_lang: config::DEFAULT_TARGET_LANG.to_string(),
            api_key: String::new(),
            api_type: ApiType::Free,
        }
    }
}

impl UserSettings {
    /// Source language to send to the provider, `None` when auto-detecting
    pub fn explicit_source_lang(&self) -> Option<&str> {
        let source = self.source_lang.trim();
        if source.is_empty() || source.eq_ignore_ascii_case(config::AUTO_SOURCE_LANG) {
            None
        } else {
            Some(source)
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Return a copy of settings with the API key masked (for logging)
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api_key.is_empty() {
            copy.api_key = "********".to_string();
        }
        copy
    }
}

/// Read-only access to the current settings
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn get(&self) -> AppResult<UserSettings>;
}

/// Fixed settings, for hosts that manage configuration themselves
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub UserSettings);

#[async_trait]
impl SettingsProvider for StaticSettings {
    async fn get(&self) -> AppResult<UserSettings> {
        Ok(self.0.clone())
    }
}

/// Settings persisted as JSON under the platform config directory
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store located at `<config dir>/settings.json`
    pub fn from_project_dirs() -> AppResult<Self> {
        ProjectDirs::from("com", "antigravity", "page-translator")
            .map(|dirs| Self::new(dirs.config_dir().join("settings.json")))
            .ok_or_else(|| AppError::Settings("Failed to determine config directory".to_string()))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn load(&self) -> AppResult<UserSettings> {
        let mut settings = if !self.path.exists() {
            debug!(path = %self.path.display(), "settings file missing, using defaults");
            UserSettings::default()
        } else {
            let content = fs::read_to_string(&self.path)
                .await
                .map_err(|e| AppError::Settings(format!("Failed to read settings file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?
        };

        if !settings.has_api_key() {
            match std::env::var(config::API_KEY_ENV) {
                Ok(key) if !key.trim().is_empty() => settings.api_key = key,
                _ => {}
            }
        }

        Ok(settings)
    }

    pub async fn save(&self, settings: &UserSettings) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Settings(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| AppError::Settings(format!("Failed to write settings file: {}", e)))?;

        debug!(settings = ?settings.masked(), "settings saved");
        Ok(())
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsStore {
    async fn get(&self) -> AppResult<UserSettings> {
        self.load().await.inspect_err(|e| {
            warn!("Failed to load settings: {}", e);
        })
    }
}
