// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::mutators::fields::replace_if_differs;
use crate::types::openshift::ImageStream;
use kube::ResourceExt;
use tracing::info;

/// Merge tag references by name: desired tags missing from the existing stream
/// are appended, tags present in both get their source and import policy
/// reconciled. Tags only present in the existing stream are kept.
pub fn tags(existing: &mut ImageStream, desired: &ImageStream) -> Result<bool> {
    let mut changed = false;

    for tag in &desired.spec.tags {
        match existing.spec.tags.iter_mut().find(|t| t.name == tag.name) {
            Some(current) => {
                changed |= replace_if_differs(&mut current.from, &tag.from);
                changed |= replace_if_differs(&mut current.import_policy, &tag.import_policy);
            }
            None => {
                info!("ImageStream/{} adding tag {}", desired.name_any(), tag.name);
                existing.spec.tags.push(tag.clone());
                changed = true;
            }
        }
    }
    Ok(changed)
}
