//! # config — client settings from environment variables
//!
//! | Variable                     | Default                     |
//! |------------------------------|-----------------------------|
//! | `FLASH_API_URL`              | `http://localhost:8000/api` |
//! | `FLASH_IDENTITY_FILE`        | `.flash/identity.json`      |
//! | `FLASH_REQUEST_TIMEOUT_SECS` | `10`                        |
//!
//! Session defaults for the terminal driver live in [`SessionDefaults`].

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};

use crate::models::{Credentials, SessionConfig, SessionMode};

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every route is appended to
    pub api_url:         String,
    /// Where the signed-in identity is persisted between runs
    pub identity_file:   PathBuf,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let timeout_secs: u64 = var("FLASH_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("FLASH_REQUEST_TIMEOUT_SECS must be a number")?;

        if timeout_secs == 0 {
            bail!("FLASH_REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            api_url:         var("FLASH_API_URL").unwrap_or_else(|| "http://localhost:8000/api".to_string()),
            identity_file:   var("FLASH_IDENTITY_FILE").unwrap_or_else(|| ".flash/identity.json".to_string()).into(),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// What the driver plays when nothing else is chosen.
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub config:      SessionConfig,
    /// Used to sign in when no stored identity is valid
    pub credentials: Option<Credentials>,
}

impl SessionDefaults {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mode: SessionMode = parse_or(&var, "FLASH_MODE", SessionMode::Custom)?;

        let config = SessionConfig {
            mode,
            market:           var("FLASH_MARKET").unwrap_or_else(|| "Shares".to_string()),
            ticker:           var("FLASH_TICKER").unwrap_or_else(|| "SBER".to_string()),
            timeframe:        var("FLASH_TIMEFRAME").unwrap_or_else(|| "M1".to_string()),
            bars_number:      parse_or(&var, "FLASH_BARS", 50)?,
            timer_seconds:    parse_or(&var, "FLASH_TIMER_SECS", 30)?,
            start_datetime:   None,
            iterations_count: parse_or(&var, "FLASH_ITERATIONS", 10)?,
            slippage:         parse_or(&var, "FLASH_SLIPPAGE", 0.001)?,
            fixing_bar:       parse_or(&var, "FLASH_FIXING_BAR", 20)?,
        };

        let credentials = match (var("FLASH_EMAIL"), var("FLASH_PASSWORD")) {
            (Some(email), Some(password)) => Some(Credentials { email, password }),
            (Some(_), None) => bail!("FLASH_EMAIL is set but FLASH_PASSWORD is missing"),
            _ => None,
        };

        Ok(Self { config, credentials })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
    }
}
