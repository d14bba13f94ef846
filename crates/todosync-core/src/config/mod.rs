//! Sync client configuration and engine policy.
//!
//! `SyncClientConfig` describes how to reach the sync backend and is
//! persisted by clients as JSON. `SyncPolicy` holds the reconciliation knobs
//! that are not dictated by the backend.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_RECYCLE_BIN_DAYS: u32 = 30;

/// Environment variable overriding the backend base URL
pub const ENV_API_URL: &str = "TODOSYNC_API_URL";
/// Environment variable overriding the bearer token
pub const ENV_API_TOKEN: &str = "TODOSYNC_API_TOKEN";
/// Environment variable overriding the user id
pub const ENV_USER_ID: &str = "TODOSYNC_USER_ID";

/// Connection settings for the remote sync backend
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SyncClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for SyncClientConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SyncClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user_id", &self.user_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SyncClientConfig {
    /// Create a config pointing at `api_base_url`
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: Some(api_base_url.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Overlay values from `TODOSYNC_*` environment variables
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = normalize_text_option(std::env::var(ENV_API_URL).ok()) {
            self.api_base_url = Some(url);
        }
        if let Some(token) = normalize_text_option(std::env::var(ENV_API_TOKEN).ok()) {
            self.api_token = Some(token);
        }
        if let Some(user_id) = normalize_text_option(std::env::var(ENV_USER_ID).ok()) {
            self.user_id = Some(user_id);
        }
        self
    }

    /// Trim fields and drop empties
    pub fn normalize(&mut self) {
        self.api_base_url = normalize_text_option(self.api_base_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
        self.api_token = normalize_text_option(self.api_token.take());
        self.user_id = normalize_text_option(self.user_id.take());
    }

    /// Validated base URL without a trailing slash
    pub fn base_url(&self) -> Result<String> {
        let url = normalize_text_option(self.api_base_url.clone())
            .ok_or_else(|| Error::InvalidInput("Sync API base URL is not configured".into()))?;
        if !is_http_url(&url) {
            return Err(Error::InvalidInput(
                "Sync API base URL must include http:// or https://".into(),
            ));
        }
        Ok(url.trim_end_matches('/').to_string())
    }

    /// Configured user id
    pub fn user_id(&self) -> Result<String> {
        normalize_text_option(self.user_id.clone())
            .ok_or_else(|| Error::InvalidInput("User id is not configured".into()))
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1))
    }

    /// Whether enough is set to attempt a sync
    pub fn is_configured(&self) -> bool {
        self.base_url().is_ok() && self.user_id().is_ok()
    }
}

/// What to do when the server reports a lower version than we hold locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSkewPolicy {
    /// Log a warning and skip the pull step
    #[default]
    Ignore,
    /// Abort the pass with `Error::VersionSkew`
    Fail,
}

/// Reconciliation engine knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPolicy {
    pub version_skew: VersionSkewPolicy,
    /// Re-run the reminder scheduler for every local task after each pass
    pub resync_all_reminders: bool,
    pub recycle_bin_days: u32,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            version_skew: VersionSkewPolicy::Ignore,
            resync_all_reminders: true,
            recycle_bin_days: DEFAULT_RECYCLE_BIN_DAYS,
        }
    }
}
