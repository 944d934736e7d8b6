// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Detecting whether optional kinds are registered in the cluster.

use crate::error::{Result, StewardError};
use async_trait::async_trait;
use kube::{discovery::Discovery, Client};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Capability query against the API server's discovery endpoints.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KindProbe: Send + Sync {
    /// Whether `kind` is served under `group_version` (e.g. "monitoring.coreos.com/v1")
    async fn is_kind_available(&self, group_version: &str, kind: &str) -> Result<bool>;
}

/// [`KindProbe`] using kube API discovery.
#[derive(Clone)]
pub struct DiscoveryProbe {
    client: Client,
}

impl DiscoveryProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Split "group/version" into its parts; the core group has no slash ("v1").
fn split_group_version(group_version: &str) -> (&str, &str) {
    match group_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", group_version),
    }
}

#[async_trait]
impl KindProbe for DiscoveryProbe {
    async fn is_kind_available(&self, group_version: &str, kind: &str) -> Result<bool> {
        let (group, version) = split_group_version(group_version);

        let discovery = Discovery::new(self.client.clone())
            .filter(&[group])
            .run()
            .await
            .map_err(|source| StewardError::CapabilityProbe {
                group_version: group_version.to_string(),
                kind: kind.to_string(),
                source,
            })?;

        let found = discovery
            .groups()
            .filter(|g| g.name() == group)
            .any(|g| {
                g.versioned_resources(version)
                    .iter()
                    .any(|(ar, _)| ar.kind == kind)
            });

        debug!("Kind {} in {} available: {}", kind, group_version, found);
        Ok(found)
    }
}

/// Memoized kind availability for a single reconcile pass.
///
/// Only successful answers are remembered; a failed probe is retried on the
/// next lookup. Build a fresh one per pass, answers are never refreshed.
pub struct KindAvailability {
    probe: Arc<dyn KindProbe>,
    known: Mutex<HashMap<(String, String), bool>>,
}

impl KindAvailability {
    pub fn new(probe: Arc<dyn KindProbe>) -> Self {
        Self {
            probe,
            known: Mutex::new(HashMap::new()),
        }
    }

    pub async fn is_available(&self, group_version: &str, kind: &str) -> Result<bool> {
        let key = (group_version.to_string(), kind.to_string());
        if let Some(available) = self.cached(&key) {
            return Ok(available);
        }

        let available = self.probe.is_kind_available(group_version, kind).await?;
        match self.known.lock() {
            Ok(mut known) => {
                known.insert(key, available);
            }
            Err(e) => debug!("Not caching availability of {} {}: {}", group_version, kind, e),
        }
        Ok(available)
    }

    fn cached(&self, key: &(String, String)) -> Option<bool> {
        match self.known.lock() {
            Ok(known) => known.get(key).copied(),
            Err(e) => {
                debug!("Kind availability cache unusable, probing again: {}", e);
                None
            }
        }
    }
}
