// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment mutators. Each one governs a single part of the object so that
//! callers choose exactly which fields Steward owns after creation.

use crate::error::{Result, StewardError};
use crate::mutators::fields::{merge_map, replace_if_differs, resources_equal};
use crate::reconcile::mutator::MutatorChain;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    Container, EnvVar, PodSpec, PodTemplateSpec, Volume, VolumeMount,
};
use kube::ResourceExt;
use std::collections::HashSet;
use tracing::{info, warn};

/// The mutators used for most workloads. Replicas are deliberately absent.
pub fn generic_deployment_mutators() -> MutatorChain<Deployment> {
    MutatorChain::new()
        .with(annotations)
        .with(container_resources)
        .with(affinity)
        .with(tolerations)
        .with(pod_template_labels)
        .with(priority_class)
        .with(topology_spread_constraints)
        .with(pod_template_annotations)
        .with(args)
        .with(probes)
        .with(container_images)
        .with(init_container_images)
}

fn describe(d: &Deployment) -> String {
    format!("Deployment/{}", d.name_any())
}

fn pod_template(d: &Deployment) -> Option<&PodTemplateSpec> {
    d.spec.as_ref().map(|s| &s.template)
}

fn pod_template_mut(d: &mut Deployment) -> &mut PodTemplateSpec {
    &mut d.spec.get_or_insert_with(Default::default).template
}

fn pod_spec(d: &Deployment) -> Option<&PodSpec> {
    pod_template(d)?.spec.as_ref()
}

fn pod_spec_mut(d: &mut Deployment) -> &mut PodSpec {
    pod_template_mut(d).spec.get_or_insert_with(Default::default)
}

fn containers(d: &Deployment) -> &[Container] {
    pod_spec(d).map(|s| s.containers.as_slice()).unwrap_or_default()
}

fn init_containers(d: &Deployment) -> &[Container] {
    pod_spec(d)
        .and_then(|s| s.init_containers.as_deref())
        .unwrap_or_default()
}

/// Sync one pod spec field, treating a missing pod spec as the field's default.
fn sync_pod_spec_field<T: PartialEq + Clone + Default>(
    existing: &mut Deployment,
    desired: &Deployment,
    path: &str,
    field: fn(&PodSpec) -> &T,
    field_mut: fn(&mut PodSpec) -> &mut T,
) -> bool {
    let default = T::default();
    let want = pod_spec(desired).map(field).unwrap_or(&default);
    let have = pod_spec(existing).map(field).unwrap_or(&default);
    if have == want {
        return false;
    }

    info!("{} {} has changed", describe(desired), path);
    *field_mut(pod_spec_mut(existing)) = want.clone();
    true
}

/// Containers of both objects paired by index; their counts must match.
fn paired_containers<'a>(
    existing: &'a mut Deployment,
    desired: &'a Deployment,
) -> Result<impl Iterator<Item = (&'a mut Container, &'a Container)>> {
    let want = containers(desired);
    if containers(existing).len() != want.len() {
        return Err(StewardError::InvariantViolation {
            object: describe(desired),
            reason: format!(
                "existing has {} containers, desired has {}",
                containers(existing).len(),
                want.len()
            ),
        });
    }
    Ok(pod_spec_mut(existing).containers.iter_mut().zip(want))
}

pub fn annotations(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    Ok(merge_map(
        &mut existing.metadata.annotations,
        &desired.metadata.annotations,
    ))
}

/// Reconcile the replica count only when the desired object sets one, leaving
/// it to an autoscaler otherwise.
pub fn replicas(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let Some(want) = desired.spec.as_ref().and_then(|s| s.replicas) else {
        return Ok(false);
    };

    let spec = existing.spec.get_or_insert_with(Default::default);
    if spec.replicas == Some(want) {
        return Ok(false);
    }
    spec.replicas = Some(want);
    Ok(true)
}

/// Reconcile resources of a single-container deployment.
pub fn container_resources(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let want = containers(desired);
    if want.len() != 1 {
        return Err(StewardError::InvariantViolation {
            object: describe(desired),
            reason: format!(
                "desired spec.template.spec.containers has {} entries, expected 1",
                want.len()
            ),
        });
    }

    let mut changed = false;
    if containers(existing).len() != 1 {
        info!(
            "{} spec.template.spec.containers length changed to {}, replacing containers",
            describe(desired),
            containers(existing).len()
        );
        pod_spec_mut(existing).containers = want.to_vec();
        changed = true;
    }

    let container = &mut pod_spec_mut(existing).containers[0];
    if !resources_equal(&container.resources, &want[0].resources) {
        info!(
            "{} spec.template.spec.containers[0].resources have changed",
            describe(desired)
        );
        container.resources = want[0].resources.clone();
        changed = true;
    }

    Ok(changed)
}

pub fn affinity(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    Ok(sync_pod_spec_field(
        existing,
        desired,
        "spec.template.spec.affinity",
        |s| &s.affinity,
        |s| &mut s.affinity,
    ))
}

pub fn tolerations(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    Ok(sync_pod_spec_field(
        existing,
        desired,
        "spec.template.spec.tolerations",
        |s| &s.tolerations,
        |s| &mut s.tolerations,
    ))
}

pub fn priority_class(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    Ok(sync_pod_spec_field(
        existing,
        desired,
        "spec.template.spec.priorityClassName",
        |s| &s.priority_class_name,
        |s| &mut s.priority_class_name,
    ))
}

pub fn topology_spread_constraints(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    Ok(sync_pod_spec_field(
        existing,
        desired,
        "spec.template.spec.topologySpreadConstraints",
        |s| &s.topology_spread_constraints,
        |s| &mut s.topology_spread_constraints,
    ))
}

pub fn pod_template_labels(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let Some(want) = pod_template(desired).and_then(|t| t.metadata.as_ref()) else {
        return Ok(false);
    };
    let meta = pod_template_mut(existing)
        .metadata
        .get_or_insert_with(Default::default);
    Ok(merge_map(&mut meta.labels, &want.labels))
}

pub fn pod_template_annotations(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let Some(want) = pod_template(desired).and_then(|t| t.metadata.as_ref()) else {
        return Ok(false);
    };
    let meta = pod_template_mut(existing)
        .metadata
        .get_or_insert_with(Default::default);
    Ok(merge_map(&mut meta.annotations, &want.annotations))
}

pub fn strategy(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let want = desired.spec.as_ref().and_then(|s| s.strategy.clone());
    let spec = existing.spec.get_or_insert_with(Default::default);
    Ok(replace_if_differs(&mut spec.strategy, &want))
}

pub fn args(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let mut changed = false;
    for (have, want) in paired_containers(existing, desired)? {
        changed |= replace_if_differs(&mut have.args, &want.args);
    }
    Ok(changed)
}

pub fn probes(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let mut changed = false;
    for (have, want) in paired_containers(existing, desired)? {
        changed |= replace_if_differs(&mut have.liveness_probe, &want.liveness_probe);
        changed |= replace_if_differs(&mut have.readiness_probe, &want.readiness_probe);
    }
    Ok(changed)
}

pub fn container_images(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let mut changed = false;
    for (have, want) in paired_containers(existing, desired)? {
        if replace_if_differs(&mut have.image, &want.image) {
            info!(
                "{} container {} image changed to {}",
                describe(desired),
                want.name,
                want.image.as_deref().unwrap_or_default()
            );
            changed = true;
        }
    }
    Ok(changed)
}

/// Reconcile init container images, appending init containers missing from existing.
pub fn init_container_images(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let want = init_containers(desired);
    if want.is_empty() {
        return Ok(false);
    }

    let have = pod_spec_mut(existing)
        .init_containers
        .get_or_insert_with(Vec::new);
    let mut changed = false;

    for (idx, container) in want.iter().enumerate() {
        match have.get_mut(idx) {
            Some(current) => changed |= replace_if_differs(&mut current.image, &container.image),
            None => {
                info!("{} adding init container {}", describe(desired), container.name);
                have.push(container.clone());
                changed = true;
            }
        }
    }
    Ok(changed)
}

/// Strict volume reconciliation: volumes not in the desired object are removed.
/// Order is not significant.
pub fn volumes(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let sorted = |d: &Deployment| {
        let mut v = pod_spec(d)
            .and_then(|s| s.volumes.clone())
            .unwrap_or_default();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    };

    if sorted(existing) == sorted(desired) {
        return Ok(false);
    }
    info!("{} spec.template.spec.volumes have changed", describe(desired));
    pod_spec_mut(existing).volumes = pod_spec(desired).and_then(|s| s.volumes.clone());
    Ok(true)
}

/// Strict volume mount reconciliation for every container.
/// Skipped with a warning when container counts differ.
pub fn container_volume_mounts(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    if containers(existing).len() != containers(desired).len() {
        warn!(
            "not reconciling {} volume mounts: existing and desired do not have the same number of containers",
            describe(desired)
        );
        return Ok(false);
    }

    let mut changed = false;
    for (have, want) in paired_containers(existing, desired)? {
        changed |= replace_if_differs(&mut have.volume_mounts, &want.volume_mounts);
    }
    Ok(changed)
}

/// Init containers as a whole: extras are trimmed, missing ones appended and
/// differing ones replaced.
pub fn pod_init_containers(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let want = init_containers(desired);
    if init_containers(existing) == want {
        return Ok(false);
    }

    let have = pod_spec_mut(existing)
        .init_containers
        .get_or_insert_with(Vec::new);
    let mut changed = false;

    if have.len() > want.len() {
        have.truncate(want.len());
        changed = true;
    }
    for (idx, container) in want.iter().enumerate() {
        match have.get_mut(idx) {
            Some(current) => {
                if replace_if_differs(current, container) {
                    info!("{} init container {} has changed", describe(desired), container.name);
                    changed = true;
                }
            }
            None => {
                info!("{} adding init container {}", describe(desired), container.name);
                have.push(container.clone());
                changed = true;
            }
        }
    }
    Ok(changed)
}

/// Strict volume mount reconciliation for every init container.
/// Skipped with a warning when init container counts differ.
pub fn init_container_volume_mounts(existing: &mut Deployment, desired: &Deployment) -> Result<bool> {
    let want = init_containers(desired);
    if init_containers(existing).len() != want.len() {
        warn!(
            "not reconciling {} init container volume mounts: existing and desired do not have the same number of init containers",
            describe(desired)
        );
        return Ok(false);
    }

    let mut changed = false;
    let have = pod_spec_mut(existing).init_containers.iter_mut().flatten();
    for (have, want) in have.zip(want) {
        changed |= replace_if_differs(&mut have.volume_mounts, &want.volume_mounts);
    }
    Ok(changed)
}

/// Reconcile only the named volumes: added, updated or removed to follow desired.
/// Other volumes are left alone.
pub fn weak_volumes(
    names: &'static [&'static str],
) -> impl Fn(&mut Deployment, &Deployment) -> Result<bool> + Send + Sync {
    move |existing: &mut Deployment, desired: &Deployment| {
        let want = pod_spec(desired)
            .and_then(|s| s.volumes.as_deref())
            .unwrap_or_default();
        let have = &mut pod_spec_mut(existing).volumes;
        let mut changed = false;

        for name in names {
            if reconcile_named(have, want, name, |v: &Volume| v.name.as_str()) {
                info!("{} volume {} has changed", describe(desired), name);
                changed = true;
            }
        }
        Ok(changed)
    }
}

/// Reconcile only the named volume mounts of every container.
/// Skipped with a warning when container counts differ.
pub fn weak_container_volume_mounts(
    names: &'static [&'static str],
) -> impl Fn(&mut Deployment, &Deployment) -> Result<bool> + Send + Sync {
    move |existing: &mut Deployment, desired: &Deployment| {
        if containers(existing).len() != containers(desired).len() {
            warn!(
                "not reconciling {} volume mounts: existing and desired do not have the same number of containers",
                describe(desired)
            );
            return Ok(false);
        }

        let mut changed = false;
        for (have, want) in paired_containers(existing, desired)? {
            changed |= reconcile_named_mounts(have, want, names);
        }
        Ok(changed)
    }
}

/// Reconcile only the named volume mounts of every init container.
/// Skipped with a warning when init container counts differ.
pub fn weak_init_container_volume_mounts(
    names: &'static [&'static str],
) -> impl Fn(&mut Deployment, &Deployment) -> Result<bool> + Send + Sync {
    move |existing: &mut Deployment, desired: &Deployment| {
        let want = init_containers(desired);
        if init_containers(existing).len() != want.len() {
            warn!(
                "not reconciling {} init container volume mounts: existing and desired do not have the same number of init containers",
                describe(desired)
            );
            return Ok(false);
        }

        let mut changed = false;
        let have = pod_spec_mut(existing).init_containers.iter_mut().flatten();
        for (have, want) in have.zip(want) {
            changed |= reconcile_named_mounts(have, want, names);
        }
        Ok(changed)
    }
}

fn reconcile_named_mounts(have: &mut Container, want: &Container, names: &[&str]) -> bool {
    let want_mounts = want.volume_mounts.as_deref().unwrap_or_default();
    let mut changed = false;
    for name in names {
        changed |= reconcile_named(
            &mut have.volume_mounts,
            want_mounts,
            name,
            |m: &VolumeMount| m.name.as_str(),
        );
    }
    changed
}

/// Make the item called `name` in existing follow desired: added, replaced,
/// removed or left alone. Items with other names are untouched.
fn reconcile_named<T: PartialEq + Clone>(
    existing: &mut Option<Vec<T>>,
    desired: &[T],
    name: &str,
    key: fn(&T) -> &str,
) -> bool {
    let want = desired.iter().find(|item| key(item) == name);
    let have_idx = existing
        .as_deref()
        .unwrap_or_default()
        .iter()
        .position(|item| key(item) == name);

    match (have_idx, want) {
        (None, None) => false,
        (Some(idx), None) => {
            if let Some(items) = existing.as_mut() {
                items.remove(idx);
            }
            true
        }
        (None, Some(want)) => {
            existing.get_or_insert_with(Vec::new).push(want.clone());
            true
        }
        (Some(idx), Some(want)) => match existing.as_mut() {
            Some(items) => replace_if_differs(&mut items[idx], want),
            None => false,
        },
    }
}

/// Reconcile one environment variable in every container and init container:
/// added when only desired has it, updated when they differ, removed when only
/// existing has it. Skipped with a warning when container counts differ.
pub fn env_var(name: &'static str) -> impl Fn(&mut Deployment, &Deployment) -> Result<bool> + Send + Sync {
    move |existing: &mut Deployment, desired: &Deployment| {
        if containers(existing).len() != containers(desired).len()
            || init_containers(existing).len() != init_containers(desired).len()
        {
            warn!(
                "not reconciling {} env var {}: existing and desired do not have the same number of containers",
                describe(desired),
                name
            );
            return Ok(false);
        }

        let want_init = init_containers(desired).to_vec();
        let want = containers(desired).to_vec();
        let spec = pod_spec_mut(existing);
        let mut changed = false;

        if let Some(have_init) = spec.init_containers.as_mut() {
            for (have, want) in have_init.iter_mut().zip(&want_init) {
                changed |= reconcile_env_var(&mut have.env, &want.env, name);
            }
        }
        for (have, want) in spec.containers.iter_mut().zip(&want) {
            changed |= reconcile_env_var(&mut have.env, &want.env, name);
        }
        Ok(changed)
    }
}

fn reconcile_env_var(existing: &mut Option<Vec<EnvVar>>, desired: &Option<Vec<EnvVar>>, name: &str) -> bool {
    reconcile_named(
        existing,
        desired.as_deref().unwrap_or_default(),
        name,
        |e: &EnvVar| e.name.as_str(),
    )
}

/// Drop repeated env vars, keeping the first occurrence of each name.
pub fn remove_duplicate_env_vars(existing: &mut Deployment, _desired: &Deployment) -> Result<bool> {
    let Some(spec) = existing
        .spec
        .as_mut()
        .and_then(|s| s.template.spec.as_mut())
    else {
        return Ok(false);
    };

    let mut changed = false;
    for container in spec.containers.iter_mut() {
        let Some(env) = container.env.as_mut() else {
            continue;
        };
        let mut seen = HashSet::new();
        let before = env.len();
        env.retain(|e| seen.insert(e.name.clone()));
        changed |= env.len() != before;
    }
    Ok(changed)
}
