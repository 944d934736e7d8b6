// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::kubernetes::discovery::KindProbe;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait until `kind` is served under `group_version`.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_kind(probe: &dyn KindProbe, group_version: &str, kind: &str) {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match probe.is_kind_available(group_version, kind).await {
            Ok(true) => {
                info!("{} CRD ({}) is available", kind, group_version);
                return;
            }
            Ok(false) => {
                info!(
                    "{} CRD ({}) not yet available, waiting {} seconds...",
                    kind, group_version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for {} CRD: {}, retrying in {} seconds...",
                    kind, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StewardError;
    use crate::kubernetes::discovery::MockKindProbe;
    use crate::test_utils::api_error;

    #[tokio::test(start_paused = true)]
    async fn test_waits_until_kind_appears() {
        let mut probe = MockKindProbe::new();
        let mut seq = mockall::Sequence::new();
        probe
            .expect_is_kind_available()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(false));
        probe
            .expect_is_kind_available()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|gv, kind| {
                Err(StewardError::CapabilityProbe {
                    group_version: gv.to_string(),
                    kind: kind.to_string(),
                    source: api_error(503, "ServiceUnavailable"),
                })
            });
        probe
            .expect_is_kind_available()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(true));

        wait_for_kind(&probe, "steward.dev/v1alpha1", "AppStack").await;
    }
}
