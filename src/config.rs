// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Worker configuration loaded from environment variables.
//!
//! Read once at startup and passed explicitly into the clients and runner.

use std::env;
use std::fmt;
use std::time::Duration;

/// Default job queue (rehab platform) base URL.
pub const DEFAULT_QUEUE_URL: &str = "http://localhost:5001";

/// Default Garmin Connect API base URL.
pub const DEFAULT_GARMIN_API_URL: &str = "https://connectapi.garmin.com";

/// Default poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Worker configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Garmin account ---
    /// Garmin Connect login email
    pub garmin_email: String,
    /// Garmin Connect password
    pub garmin_password: String,
    /// Garmin Connect API base URL
    pub garmin_api_url: String,

    // --- Job queue ---
    /// Job queue base URL, without trailing slash
    pub queue_url: String,
    /// Bearer token shared with the job queue
    pub shared_secret: String,
    /// Seconds between polls
    pub poll_interval_secs: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            garmin_email: "athlete@example.com".to_string(),
            garmin_password: "test_password".to_string(),
            garmin_api_url: DEFAULT_GARMIN_API_URL.to_string(),
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            shared_secret: "test_shared_secret".to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("garmin_email", &self.garmin_email)
            .field("garmin_password", &"<redacted>")
            .field("garmin_api_url", &self.garmin_api_url)
            .field("queue_url", &self.queue_url)
            .field("shared_secret", &"<redacted>")
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let poll_interval_secs = match env::var("POLL_INTERVAL") {
            Ok(raw) => parse_poll_interval(&raw)?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        Ok(Self {
            garmin_email: env::var("GARMIN_EMAIL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GARMIN_EMAIL"))?,
            garmin_password: env::var("GARMIN_PASSWORD")
                .map_err(|_| ConfigError::Missing("GARMIN_PASSWORD"))?,
            garmin_api_url: normalize_base_url(
                &env::var("GARMIN_API_URL")
                    .unwrap_or_else(|_| DEFAULT_GARMIN_API_URL.to_string()),
            ),
            queue_url: normalize_base_url(
                &env::var("REHAB_PLATFORM_URL").unwrap_or_else(|_| DEFAULT_QUEUE_URL.to_string()),
            ),
            shared_secret: env::var("SHARED_SECRET")
                .map(|v| v.trim().to_string())
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing("SHARED_SECRET"))?,
            poll_interval_secs,
        })
    }

    /// Poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_poll_interval(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::Invalid {
            name: "POLL_INTERVAL",
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
