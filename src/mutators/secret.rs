// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret mutators.
//!
//! Desired secrets are expressed through `string_data`. The API server folds
//! `string_data` into `data` on write, so existing values are read from both,
//! with `string_data` taking precedence.

use crate::error::Result;
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::info;

fn effective_value(secret: &Secret, key: &str) -> Option<String> {
    if let Some(value) = secret.string_data.as_ref().and_then(|s| s.get(key)) {
        return Some(value.clone());
    }
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .map(|bytes| String::from_utf8_lossy(&bytes.0).into_owned())
}

fn effective_string_data(secret: &Secret) -> BTreeMap<String, String> {
    let mut values: BTreeMap<String, String> = secret
        .data
        .iter()
        .flatten()
        .map(|(k, v)| (k.clone(), String::from_utf8_lossy(&v.0).into_owned()))
        .collect();
    if let Some(string_data) = &secret.string_data {
        values.extend(string_data.clone());
    }
    values
}

/// Only add keys the existing secret lacks. Values already present are user
/// owned and never touched.
pub fn defaults_only(existing: &mut Secret, desired: &Secret) -> Result<bool> {
    let mut changed = false;
    for (key, value) in desired.string_data.iter().flatten() {
        if effective_value(existing, key).is_none() {
            existing
                .string_data
                .get_or_insert_with(BTreeMap::new)
                .insert(key.clone(), value.clone());
            changed = true;
        }
    }
    Ok(changed)
}

/// Reconcile a single key to its desired string value.
pub fn reconcile_field(key: &'static str) -> impl Fn(&mut Secret, &Secret) -> Result<bool> + Send + Sync {
    move |existing: &mut Secret, desired: &Secret| {
        let want = desired
            .string_data
            .as_ref()
            .and_then(|s| s.get(key))
            .cloned()
            .unwrap_or_default();
        if effective_value(existing, key).as_ref() == Some(&want) {
            return Ok(false);
        }

        info!("Secret/{} key {} has changed", desired.name_any(), key);
        existing
            .string_data
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), want);
        Ok(true)
    }
}

/// Make the secret hold exactly the desired string data.
pub fn string_data(existing: &mut Secret, desired: &Secret) -> Result<bool> {
    let want = desired.string_data.clone().unwrap_or_default();
    if effective_string_data(existing) == want {
        return Ok(false);
    }

    info!("Secret/{} data has changed", desired.name_any());
    existing.data = None;
    existing.string_data = Some(want);
    Ok(true)
}
