//! Controller configuration, read from environment variables at startup.

use crate::error::ControllerError;
use std::net::SocketAddr;
use std::time::Duration;

/// Upper bound for `BACKOFF_MAX_MINUTES` (one day)
pub const MAX_BACKOFF_MINUTES: u64 = 24 * 60;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Namespace to watch (`WATCH_NAMESPACE`), all namespaces if unset
    pub namespace: Option<String>,
    /// Max concurrent reconciliations (`RECONCILE_CONCURRENCY`)
    pub concurrency: u16,
    /// Quiet period after the last event before reconciling (`RECONCILE_DEBOUNCE_SECS`)
    pub debounce: Duration,
    /// First requeue delay after a transient failure (`BACKOFF_MIN_MINUTES`)
    pub backoff_min_minutes: u64,
    /// Requeue delay cap (`BACKOFF_MAX_MINUTES`)
    pub backoff_max_minutes: u64,
    /// Probe and metrics listener (`METRICS_ADDR`)
    pub metrics_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: None,
            concurrency: 4,
            debounce: Duration::from_secs(1),
            backoff_min_minutes: 1,
            backoff_max_minutes: 10,
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            namespace: lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty()),
            concurrency: parse(&lookup, "RECONCILE_CONCURRENCY", defaults.concurrency)?,
            debounce: Duration::from_secs(parse(
                &lookup,
                "RECONCILE_DEBOUNCE_SECS",
                defaults.debounce.as_secs(),
            )?),
            backoff_min_minutes: parse(&lookup, "BACKOFF_MIN_MINUTES", defaults.backoff_min_minutes)?,
            backoff_max_minutes: parse(&lookup, "BACKOFF_MAX_MINUTES", defaults.backoff_max_minutes)?,
            metrics_addr: parse(&lookup, "METRICS_ADDR", defaults.metrics_addr)?,
        };

        if config.concurrency == 0 {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        if config.backoff_min_minutes == 0 || config.backoff_max_minutes < config.backoff_min_minutes {
            return Err(ControllerError::InvalidConfig(format!(
                "backoff bounds must satisfy 0 < BACKOFF_MIN_MINUTES ({}) <= BACKOFF_MAX_MINUTES ({})",
                config.backoff_min_minutes, config.backoff_max_minutes
            )));
        }

        if config.backoff_max_minutes > MAX_BACKOFF_MINUTES {
            return Err(ControllerError::InvalidConfig(format!(
                "BACKOFF_MAX_MINUTES ({}) must not exceed {}",
                config.backoff_max_minutes, MAX_BACKOFF_MINUTES
            )));
        }

        Ok(config)
    }
}

fn parse<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            ControllerError::InvalidConfig(format!("{name}={raw:?} is invalid: {e}"))
        }),
    }
}
