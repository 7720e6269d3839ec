//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const COOKIE_FILE_NAME: &str = ".trailmap_session";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL (expected http:// or https://): {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server origin without a trailing slash.
    pub base_url: String,
    /// Where the session cookie is persisted.
    pub cookie_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `TRAILMAP_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `TRAILMAP_COOKIE_FILE`: default `$HOME/.trailmap_session`
    /// - `TRAILMAP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TRAILMAP_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL has no http(s) scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            &std::env::var("TRAILMAP_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        )?;
        let cookie_file = std::env::var_os("TRAILMAP_COOKIE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_cookie_file);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("TRAILMAP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("TRAILMAP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { base_url, cookie_file, timeouts })
    }

    /// Override the base URL (e.g. from a CLI flag).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL has no http(s) scheme.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_string()))
    }
}

fn default_cookie_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(COOKIE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(COOKIE_FILE_NAME))
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
