// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Marking desired objects as "must not exist".

use crate::constants::annotations;
use kube::api::PropagationPolicy;
use kube::Resource;
use tracing::warn;

/// Tag a desired object so the engine deletes it instead of creating or updating it
pub fn tag_for_deletion<K: Resource>(obj: &mut K) {
    obj.meta_mut()
        .annotations
        .get_or_insert_with(Default::default)
        .insert(annotations::DELETE.to_string(), "true".to_string());
}

/// Tag a desired object for deletion using the given propagation policy
pub fn tag_for_deletion_with_propagation<K: Resource>(obj: &mut K, policy: PropagationPolicy) {
    tag_for_deletion(obj);
    obj.meta_mut()
        .annotations
        .get_or_insert_with(Default::default)
        .insert(
            annotations::DELETE_PROPAGATION_POLICY.to_string(),
            propagation_policy_name(&policy).to_string(),
        );
}

/// Check if an object carries the deletion tag set to "true"
pub fn is_tagged_for_deletion<K: Resource>(obj: &K) -> bool {
    obj.meta()
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::DELETE))
        .is_some_and(|v| v == "true")
}

/// Propagation policy requested by the deletion tag, if any.
/// Unknown values are ignored and the server default applies.
pub fn deletion_propagation_policy<K: Resource>(obj: &K) -> Option<PropagationPolicy> {
    let value = obj
        .meta()
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::DELETE_PROPAGATION_POLICY))?;

    match value.as_str() {
        "Orphan" => Some(PropagationPolicy::Orphan),
        "Background" => Some(PropagationPolicy::Background),
        "Foreground" => Some(PropagationPolicy::Foreground),
        other => {
            warn!("Ignoring unknown delete propagation policy '{}'", other);
            None
        }
    }
}

fn propagation_policy_name(policy: &PropagationPolicy) -> &'static str {
    match policy {
        PropagationPolicy::Orphan => "Orphan",
        PropagationPolicy::Background => "Background",
        PropagationPolicy::Foreground => "Foreground",
    }
}
