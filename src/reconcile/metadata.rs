// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Merging identity, labels, annotations and the controller owner reference
//! from a desired object into the persisted one.

use crate::error::{Result, StewardError};
use crate::reconcile::owner::Owner;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

/// Additively merge `desired` into `existing`.
/// Keys only present in `existing` are kept; desired values win on overlap.
pub fn merge_map(
    existing: &mut Option<BTreeMap<String, String>>,
    desired: &Option<BTreeMap<String, String>>,
) -> bool {
    let Some(desired) = desired else {
        return false;
    };

    let mut changed = false;
    for (key, value) in desired {
        let target = existing.get_or_insert_with(BTreeMap::new);
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Bring the existing object's name, namespace, labels and annotations in line
/// with the desired object. Returns whether anything was modified.
pub fn ensure_object_meta<K: Resource>(existing: &mut K, desired: &K) -> bool {
    let desired_meta = desired.meta();
    let existing_meta = existing.meta_mut();
    let mut changed = false;

    if existing_meta.name != desired_meta.name {
        existing_meta.name = desired_meta.name.clone();
        changed = true;
    }

    if existing_meta.namespace != desired_meta.namespace {
        existing_meta.namespace = desired_meta.namespace.clone();
        changed = true;
    }

    changed |= merge_map(&mut existing_meta.labels, &desired_meta.labels);
    changed |= merge_map(&mut existing_meta.annotations, &desired_meta.annotations);

    changed
}

/// Make `owner` the single controller of `obj`.
///
/// A missing reference is added and a stale reference to the same owner is
/// refreshed. An object controlled by anything else is an ownership conflict.
pub fn ensure_owner_reference<K>(obj: &mut K, owner: &Owner) -> Result<bool>
where
    K: Resource<DynamicType = ()>,
{
    if let Some(foreign) = obj
        .owner_references()
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != owner.uid())
    {
        return Err(StewardError::OwnershipConflict {
            kind: K::kind(&()).to_string(),
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
            controller: format!("{}/{}", foreign.kind, foreign.name),
        });
    }

    let refs = obj
        .meta_mut()
        .owner_references
        .get_or_insert_with(Vec::new);

    let mut same_owner = refs.iter().filter(|r| r.uid == owner.uid());
    if let (Some(current), None) = (same_owner.next(), same_owner.next()) {
        if current == owner.reference() {
            return Ok(false);
        }
    }

    refs.retain(|r| r.uid != owner.uid());
    refs.push(owner.reference().clone());
    Ok(true)
}
