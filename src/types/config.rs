use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use url::Url;

use super::errors::ConfigError;
use super::geometry::WindowGeometry;

/// Home URL used when no configuration exists yet.
pub const DEFAULT_HOME_URL: &str = "https://192.168.1.1/protect/dashboard";

/// Idle timeout seeded into a fresh configuration.
pub const DEFAULT_IDLE_TIMEOUT_SECS: i64 = 300;

/// The persisted session configuration record.
///
/// Keys are camelCase on disk. Keys this version does not know about are kept
/// in `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub start_url: String,
    #[serde(rename = "validateSSL", default = "default_true")]
    pub validate_ssl: bool,
    /// Seconds of inactivity before returning home. `<= 0` disables the feature.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub idle_timeout_seconds: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_enc: Option<String>,
    #[serde(default)]
    pub password_encoding: SecretEncoding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_state: Option<WindowGeometry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}

/// Accepts whole seconds, fractional seconds (truncated) or a numeric string.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(i64),
        Fractional(f64),
        Text(String),
    }

    let seconds = match Seconds::deserialize(deserializer)? {
        Seconds::Whole(n) => return Ok(n),
        Seconds::Fractional(f) => f,
        Seconds::Text(text) => text.trim().parse::<f64>().map_err(|_| {
            D::Error::custom(format!("idleTimeoutSeconds '{}' is not a number", text))
        })?,
    };
    if !seconds.is_finite() {
        return Err(D::Error::custom("idleTimeoutSeconds must be finite"));
    }
    Ok(seconds.trunc() as i64)
}

/// Text encoding of the stored encrypted secret.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SecretEncoding {
    #[default]
    #[serde(rename = "base64")]
    Base64,
}

impl SessionConfig {
    /// Creates a configuration for `start_url` with default values elsewhere.
    pub fn new(start_url: &str) -> Result<Self, ConfigError> {
        validate_home_url(start_url)?;
        Ok(Self {
            start_url: start_url.to_string(),
            validate_ssl: true,
            idle_timeout_seconds: DEFAULT_IDLE_TIMEOUT_SECS,
            username: None,
            password_enc: None,
            password_encoding: SecretEncoding::Base64,
            window_state: None,
            extra: serde_json::Map::new(),
        })
    }

    /// Checks the record's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_home_url(&self.start_url)
    }

    /// The idle timeout, or `None` when the feature is disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds > 0 {
            Some(Duration::from_secs(self.idle_timeout_seconds as u64))
        } else {
            None
        }
    }

    /// True when both a non-empty username and an encrypted secret are stored.
    pub fn has_credentials(&self) -> bool {
        let has_user = self
            .username
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false);
        let has_secret = self
            .password_enc
            .as_deref()
            .map(|p| !p.is_empty())
            .unwrap_or(false);
        has_user && has_secret
    }
}

/// Returns an error unless `url` is an absolute http(s) URL with a host.
pub fn validate_home_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidValue(format!("startUrl '{}': {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue(format!(
            "startUrl '{}' must use http or https",
            url
        )));
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue(format!(
            "startUrl '{}' has no host",
            url
        )));
    }
    Ok(())
}
