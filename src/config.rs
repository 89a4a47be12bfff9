//! Server configuration parsed from environment variables.
//!
//! Required:
//! - `DATABASE_URL`: Postgres holding the `profiles` and `banned_users` tables
//! - `AUTH_URL`: base URL of the hosted auth service
//! - `AUTH_API_KEY`: project API key sent with every auth request
//!
//! Optional:
//! - `PORT`: default 3000
//! - `COOKIE_SECURE`: defaults to true when `AUTH_URL` is https
//! - `RUN_MIGRATIONS`: default false (the hosted backend owns the schema)
//! - `AUTH_REQUEST_TIMEOUT_SECS`: default 10
//! - `AUTH_CONNECT_TIMEOUT_SECS`: default 5
//! - `GATE_LOOKUP_RETRIES`: default 2
//! - `GATE_RETRY_BASE_MS`: default 50
//! - `SUPPORT_EMAIL`: contact shown on the ban screen

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::time::Duration;

use gate::RetryPolicy;
use gate::resolver::DEFAULT_SUPPORT_CONTACT;
use gate::retry::{DEFAULT_RETRIES, DEFAULT_RETRY_BASE_MS};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_AUTH_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AUTH_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub api_key: String,
    pub timeouts: AuthTimeouts,
}

/// Knobs shared by every gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSettings {
    pub retry: RetryPolicy,
    pub support_contact: String,
    pub cookie_secure: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self { retry: RetryPolicy::default(), support_contact: DEFAULT_SUPPORT_CONTACT.to_owned(), cookie_secure: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub run_migrations: bool,
    pub auth: AuthConfig,
    pub gate: GateSettings,
}

impl Config {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { var })
        };

        let database_url = required("DATABASE_URL")?;
        let base_url = required("AUTH_URL")?.trim_end_matches('/').to_owned();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid { var: "AUTH_URL", value: base_url });
        }
        let api_key = required("AUTH_API_KEY")?;

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "COOKIE_SECURE", value: raw })?,
            None => base_url.starts_with("https://"),
        };
        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "RUN_MIGRATIONS", value: raw })?,
            None => false,
        };

        let retry = RetryPolicy {
            retries: parse_or(&lookup, "GATE_LOOKUP_RETRIES", DEFAULT_RETRIES)?,
            base_delay: Duration::from_millis(parse_or(&lookup, "GATE_RETRY_BASE_MS", DEFAULT_RETRY_BASE_MS)?),
        };

        Ok(Self {
            database_url,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            run_migrations,
            auth: AuthConfig {
                base_url,
                api_key,
                timeouts: AuthTimeouts {
                    request_secs: parse_or(&lookup, "AUTH_REQUEST_TIMEOUT_SECS", DEFAULT_AUTH_REQUEST_TIMEOUT_SECS)?,
                    connect_secs: parse_or(&lookup, "AUTH_CONNECT_TIMEOUT_SECS", DEFAULT_AUTH_CONNECT_TIMEOUT_SECS)?,
                },
            },
            gate: GateSettings {
                retry,
                support_contact: lookup("SUPPORT_EMAIL")
                    .map(|raw| raw.trim().to_owned())
                    .filter(|contact| !contact.is_empty())
                    .unwrap_or_else(|| DEFAULT_SUPPORT_CONTACT.to_owned()),
                cookie_secure,
            },
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}
