// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::mutators::fields::replace_if_differs;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::ResourceExt;
use tracing::info;

/// Reconcile min available, max unavailable and the selector.
pub fn pod_disruption_budget(existing: &mut PodDisruptionBudget, desired: &PodDisruptionBudget) -> Result<bool> {
    let want = desired.spec.clone().unwrap_or_default();
    let spec = existing.spec.get_or_insert_with(Default::default);

    let mut changed = false;
    changed |= replace_if_differs(&mut spec.min_available, &want.min_available);
    changed |= replace_if_differs(&mut spec.max_unavailable, &want.max_unavailable);
    changed |= replace_if_differs(&mut spec.selector, &want.selector);

    if changed {
        info!("PodDisruptionBudget/{} spec has changed", desired.name_any());
    }
    Ok(changed)
}
