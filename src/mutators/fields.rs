// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Field-level diff helpers shared by the per-kind mutators.

use crate::error::Result;
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::info;

pub use crate::reconcile::metadata::merge_map;

/// Overwrite `existing` with `desired` when they differ.
pub fn replace_if_differs<T: PartialEq + Clone>(existing: &mut T, desired: &T) -> bool {
    if existing == desired {
        return false;
    }
    *existing = desired.clone();
    true
}

/// A mutator that overwrites one field whenever it differs from the desired value.
///
/// `get` and `get_mut` must address the same field.
pub fn replace_field<K, T>(
    field: &'static str,
    get: fn(&K) -> &T,
    get_mut: fn(&mut K) -> &mut T,
) -> impl Fn(&mut K, &K) -> Result<bool> + Send + Sync
where
    K: Resource,
    T: PartialEq + Clone,
{
    move |existing: &mut K, desired: &K| {
        if !replace_if_differs(get_mut(existing), get(desired)) {
            return Ok(false);
        }
        info!("{} {} has changed", desired.name_any(), field);
        Ok(true)
    }
}

/// Add entries of `desired` whose keys are missing from `existing`.
/// Existing values are never overwritten.
pub fn defaults_only<V: Clone>(
    existing: &mut Option<BTreeMap<String, V>>,
    desired: &Option<BTreeMap<String, V>>,
) -> bool {
    let Some(desired) = desired else {
        return false;
    };

    let mut changed = false;
    for (key, value) in desired {
        let target = existing.get_or_insert_with(BTreeMap::new);
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Compare resource requirements by quantity value, so "1000m" equals "1"
/// and "1Gi" equals "1024Mi".
pub fn resources_equal(a: &Option<ResourceRequirements>, b: &Option<ResourceRequirements>) -> bool {
    let empty = ResourceRequirements::default();
    let a = a.as_ref().unwrap_or(&empty);
    let b = b.as_ref().unwrap_or(&empty);

    resource_list_equal(&a.limits, &b.limits)
        && resource_list_equal(&a.requests, &b.requests)
        && a.claims == b.claims
}

fn resource_list_equal(
    a: &Option<BTreeMap<String, Quantity>>,
    b: &Option<BTreeMap<String, Quantity>>,
) -> bool {
    let empty = BTreeMap::new();
    let a = a.as_ref().unwrap_or(&empty);
    let b = b.as_ref().unwrap_or(&empty);

    a.len() == b.len()
        && a.iter()
            .all(|(name, qa)| b.get(name).is_some_and(|qb| quantities_equal(qa, qb)))
}

pub fn quantities_equal(a: &Quantity, b: &Quantity) -> bool {
    match (parse_quantity(&a.0), parse_quantity(&b.0)) {
        (Some(x), Some(y)) => (x - y).abs() <= f64::EPSILON * 16.0 * x.abs().max(y.abs()),
        _ => a.0 == b.0,
    }
}

/// Parse a Kubernetes quantity ("250m", "1.5Gi", "2e3") into its numeric value.
fn parse_quantity(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
        .unwrap_or(raw.len());
    let (number, suffix) = raw.split_at(split);
    let number: f64 = number.parse().ok()?;

    let multiplier = match suffix {
        "" => 1.0,
        "n" => 1e-9,
        "u" => 1e-6,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        "Ki" => 1024f64,
        "Mi" => 1024f64.powi(2),
        "Gi" => 1024f64.powi(3),
        "Ti" => 1024f64.powi(4),
        "Pi" => 1024f64.powi(5),
        "Ei" => 1024f64.powi(6),
        exp if exp.starts_with(['e', 'E']) => 10f64.powi(exp[1..].parse().ok()?),
        _ => return None,
    };
    Some(number * multiplier)
}
