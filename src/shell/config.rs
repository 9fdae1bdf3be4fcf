// Process configuration read from the environment.
//
// Responsibilities
// - Load `.env` when present, then read MIRROR_* variables.
// - Fall back to production defaults for everything except the remote credentials.
// - Reject malformed values up front with the variable name attached.

use crate::modules::issues::adapters::outbound::http_issue_fetcher::RemoteApiConfig;
use crate::modules::issues::use_cases::sync_issues::config::{MAX_PAGE_SIZE, SyncConfig};
use crate::shared::infrastructure::retry::RetryPolicy;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "issue_mirror.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {name}")]
    Missing { name: &'static str },

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub sync: SyncConfig,
    /// Backoff for remote page fetches. Applied when the fetcher is composed.
    pub retry: RetryPolicy,
    remote_base_url: Option<String>,
    remote_api_token: Option<String>,
    remote_search_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside local development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_path = read("MIRROR_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));
        let bind_addr = parse(
            "MIRROR_BIND_ADDR",
            read("MIRROR_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let mut sync = SyncConfig::default();
        if let Some(raw) = read("MIRROR_SYNC_LOOKBACK_DAYS") {
            let days: i64 = parse("MIRROR_SYNC_LOOKBACK_DAYS", raw.clone())?;
            let lookback = chrono::Duration::try_days(days)
                .filter(|_| days >= 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "MIRROR_SYNC_LOOKBACK_DAYS",
                    value: raw,
                    reason: "must be a non-negative number of days within range".to_string(),
                })?;
            sync = sync.with_lookback(lookback);
        }
        if let Some(raw) = read("MIRROR_SYNC_PAGE_SIZE") {
            let page_size: u32 = parse("MIRROR_SYNC_PAGE_SIZE", raw.clone())?;
            if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
                return Err(ConfigError::Invalid {
                    name: "MIRROR_SYNC_PAGE_SIZE",
                    value: raw,
                    reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
                });
            }
            sync = sync.with_page_size(page_size);
        }
        if let Some(millis) = read("MIRROR_SYNC_PAGE_DELAY_MS") {
            let millis: u64 = parse("MIRROR_SYNC_PAGE_DELAY_MS", millis)?;
            sync = sync.with_inter_page_delay(Duration::from_millis(millis));
        }

        Ok(Self {
            database_path,
            bind_addr,
            sync,
            retry: RetryPolicy::default(),
            remote_base_url: read("MIRROR_REMOTE_BASE_URL"),
            remote_api_token: read("MIRROR_REMOTE_API_TOKEN"),
            remote_search_path: read("MIRROR_REMOTE_SEARCH_PATH"),
        })
    }

    /// Remote credentials are only needed by `sync`, so they are checked on demand.
    pub fn remote(&self) -> Result<RemoteApiConfig, ConfigError> {
        let base_url = self.remote_base_url.clone().ok_or(ConfigError::Missing {
            name: "MIRROR_REMOTE_BASE_URL",
        })?;
        let api_token = self.remote_api_token.clone().ok_or(ConfigError::Missing {
            name: "MIRROR_REMOTE_API_TOKEN",
        })?;
        let mut remote = RemoteApiConfig::new(base_url, api_token);
        if let Some(path) = &self.remote_search_path {
            remote.search_path = path.clone();
        }
        Ok(remote)
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}
