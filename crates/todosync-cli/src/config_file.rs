//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use todosync_core::config::{SyncClientConfig, SyncPolicy, ENV_USER_ID};
use todosync_core::util::normalize_text_option;

const CONFIG_FILE_NAME: &str = "cli-config.json";

/// User id used when none is configured anywhere
pub const LOCAL_USER_ID: &str = "local";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub sync: SyncClientConfig,
    #[serde(default)]
    pub policy: SyncPolicy,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("todosync").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

impl CliConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.sync.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.sync.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Sync settings with `TODOSYNC_*` overrides and an explicit user applied
    pub fn client_config(&self, explicit_user: Option<&str>) -> SyncClientConfig {
        let mut config = self.sync.clone().with_env_overrides();
        if let Some(user) = normalize_text_option(explicit_user.map(str::to_string)) {
            config.user_id = Some(user);
        }
        config.normalize();
        config
    }

    /// Explicit flag, then `TODOSYNC_USER_ID`, then the config file, then `local`
    pub fn resolve_user_id(&self, explicit: Option<&str>) -> String {
        normalize_text_option(explicit.map(str::to_string))
            .or_else(|| normalize_text_option(std::env::var(ENV_USER_ID).ok()))
            .or_else(|| normalize_text_option(self.sync.user_id.clone()))
            .unwrap_or_else(|| LOCAL_USER_ID.to_string())
    }

    /// JSON view of the config with the token redacted
    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        if redacted.sync.api_token.is_some() {
            redacted.sync.api_token = Some("[REDACTED]".to_string());
        }
        redacted
    }
}
