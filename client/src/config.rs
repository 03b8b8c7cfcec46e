//! Configuration loaded from environment variables.

use crate::error::ConfigError;
use crate::types::Theme;
use std::time::Duration;

/// Default backend root; `/todos` is appended
pub const DEFAULT_API_URL: &str = "https://todo-app-backend-eosin.vercel.app/api";

/// Client configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root URL (`TODO_API_URL`)
    pub api_url: String,
    /// Per-request timeout (`TODO_REQUEST_TIMEOUT_SECS`)
    pub request_timeout: Duration,
    /// Lifetime of resolved notifications (`TODO_NOTIFICATION_TTL_MS`)
    pub notification_ttl: Duration,
    /// Initial theme (`TODO_THEME`)
    pub theme: Theme,
    /// Store action broadcast capacity (`TODO_BROADCAST_CAPACITY`)
    pub broadcast_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            notification_ttl: Duration::from_millis(4000),
            theme: Theme::Light,
            broadcast_capacity: 64,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to a value
    /// that cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = match lookup("TODO_API_URL") {
            Some(value) => parse_url(&value)?,
            None => defaults.api_url,
        };

        let request_timeout = parse_number(&lookup, "TODO_REQUEST_TIMEOUT_SECS")?
            .map_or(defaults.request_timeout, Duration::from_secs);

        let notification_ttl = parse_number(&lookup, "TODO_NOTIFICATION_TTL_MS")?
            .map_or(defaults.notification_ttl, Duration::from_millis);

        let theme = match lookup("TODO_THEME") {
            Some(value) => value.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "TODO_THEME",
                value,
                reason,
            })?,
            None => defaults.theme,
        };

        let broadcast_capacity = match parse_number(&lookup, "TODO_BROADCAST_CAPACITY")? {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "TODO_BROADCAST_CAPACITY",
                    value: "0".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            Some(capacity) => usize::try_from(capacity).unwrap_or(usize::MAX),
            None => defaults.broadcast_capacity,
        };

        Ok(Self {
            api_url,
            request_timeout,
            notification_ttl,
            theme,
            broadcast_capacity,
        })
    }
}

fn parse_url(value: &str) -> Result<String, ConfigError> {
    let url = value.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(ConfigError::InvalidValue {
            key: "TODO_API_URL",
            value: value.to_string(),
            reason: "expected an http:// or https:// URL".to_string(),
        })
    }
}

fn parse_number<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}
