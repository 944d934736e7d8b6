// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_REQUEUE_INTERVAL_SECS: u64 = 300;
const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Only watch owners in this namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Resync interval after a successful pass
    pub requeue_interval: Duration,
    /// Retry interval after a failed pass
    pub error_requeue: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());
        let requeue_interval = seconds(&lookup, "REQUEUE_INTERVAL_SECS", DEFAULT_REQUEUE_INTERVAL_SECS)?;
        let error_requeue = seconds(&lookup, "ERROR_REQUEUE_SECS", DEFAULT_ERROR_REQUEUE_SECS)?;

        Ok(Config {
            watch_namespace,
            requeue_interval,
            error_requeue,
        })
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    let secs = match lookup(key) {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{} must be a number of seconds, got '{}'", key, raw))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.watch_namespace, None);
        assert_eq!(config.requeue_interval, Duration::from_secs(300));
        assert_eq!(config.error_requeue, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("WATCH_NAMESPACE", "apps"),
            ("REQUEUE_INTERVAL_SECS", "30"),
            ("ERROR_REQUEUE_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.watch_namespace.as_deref(), Some("apps"));
        assert_eq!(config.requeue_interval, Duration::from_secs(30));
        assert_eq!(config.error_requeue, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_watch_namespace_means_all() {
        let config = Config::from_lookup(lookup_from(&[("WATCH_NAMESPACE", "")])).unwrap();
        assert_eq!(config.watch_namespace, None);
    }

    #[test]
    fn test_invalid_interval_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("REQUEUE_INTERVAL_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("REQUEUE_INTERVAL_SECS"));
    }
}
