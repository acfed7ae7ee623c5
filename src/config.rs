// src/config.rs
use std::time::Duration;

use crate::errors::{AppError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:54321/functions/v1";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// 30 minutes at the default interval.
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 360;

/// Cadence and cap for a single status polling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between the end of one status check and the start of the next.
    pub interval: Duration,
    /// Upper bound on status checks per session. `None` polls until a terminal status.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_attempts: Some(DEFAULT_POLL_MAX_ATTEMPTS),
        }
    }
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote functions API.
    pub api_url: String,
    /// Automation webhook that receives new video submissions.
    pub webhook_url: String,
    /// User context applied when a request names no user.
    pub default_user_id: Option<String>,
    pub poll: PollConfig,
    pub bind_addr: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = non_empty("MERXMAN_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let webhook_url = non_empty("MERXMAN_WEBHOOK_URL").ok_or_else(|| {
            AppError::Config(
                "MERXMAN_WEBHOOK_URL is not set. Point it at the automation webhook that receives submissions.".to_string(),
            )
        })?;

        let interval_secs = match non_empty("MERXMAN_POLL_INTERVAL_SECS") {
            Some(raw) => parse_number::<u64>("MERXMAN_POLL_INTERVAL_SECS", &raw)?,
            None => DEFAULT_POLL_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            return Err(AppError::Config(
                "MERXMAN_POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        // 0 disables the cap
        let max_attempts = match non_empty("MERXMAN_POLL_MAX_ATTEMPTS") {
            Some(raw) => match parse_number::<u32>("MERXMAN_POLL_MAX_ATTEMPTS", &raw)? {
                0 => None,
                n => Some(n),
            },
            None => Some(DEFAULT_POLL_MAX_ATTEMPTS),
        };

        Ok(AppConfig {
            api_url,
            webhook_url,
            default_user_id: non_empty("MERXMAN_DEFAULT_USER_ID"),
            poll: PollConfig {
                interval: Duration::from_secs(interval_secs),
                max_attempts,
            },
            bind_addr: non_empty("MERXMAN_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    /// Resolves the user a request acts on: the explicit one, else the configured default.
    pub fn resolve_user<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or(self.default_user_id.as_deref())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| AppError::Config(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}
