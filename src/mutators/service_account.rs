// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use k8s_openapi::api::core::v1::{LocalObjectReference, ServiceAccount};
use kube::ResourceExt;
use tracing::info;

/// Reconcile image pull secrets as a set.
///
/// The platform adds `<name>-dockercfg-*` and `<name>-token-*` pull secrets on
/// its own; those are kept as if they were desired.
pub fn image_pull_secrets(existing: &mut ServiceAccount, desired: &ServiceAccount) -> Result<bool> {
    let name = existing.name_any();
    let injected = |r: &LocalObjectReference| {
        r.name.starts_with(&format!("{name}-dockercfg-")) || r.name.starts_with(&format!("{name}-token-"))
    };

    let mut have = existing.image_pull_secrets.clone().unwrap_or_default();
    let mut want = desired.image_pull_secrets.clone().unwrap_or_default();
    for reference in have.iter().filter(|r| injected(r)) {
        if !want.iter().any(|w| w.name == reference.name) {
            want.push(reference.clone());
        }
    }

    have.sort_by(|a, b| a.name.cmp(&b.name));
    want.sort_by(|a, b| a.name.cmp(&b.name));
    if have == want {
        return Ok(false);
    }

    info!("ServiceAccount/{} image pull secrets have changed", name);
    existing.image_pull_secrets = Some(want);
    Ok(true)
}
