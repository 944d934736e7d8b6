// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The create/update/delete state machine shared by every managed kind.

use crate::error::{Result, StewardError};
use crate::kubernetes::discovery::KindAvailability;
use crate::kubernetes::store::ObjectStore;
use crate::reconcile::deletion::{deletion_propagation_policy, is_tagged_for_deletion};
use crate::reconcile::metadata::{ensure_object_meta, ensure_owner_reference};
use crate::reconcile::mutator::Mutator;
use crate::reconcile::owner::Owner;
use kube::{Resource, ResourceExt};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// What a single reconcile call did. Exactly one per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    /// Nothing to write: already in the desired state, or tagged and absent
    Unchanged,
    /// The kind is not installed in the cluster; nothing was read or written
    Skipped,
}

/// Reconciles desired objects of one kind against the store on behalf of an owner.
pub struct Reconciler<K> {
    store: Arc<dyn ObjectStore<K>>,
    owner: Owner,
    mutator: Box<dyn Mutator<K>>,
}

impl<K> Reconciler<K>
where
    K: Resource<DynamicType = ()> + Clone + Debug + Send + Sync + 'static,
{
    pub fn new(
        store: Arc<dyn ObjectStore<K>>,
        owner: Owner,
        mutator: impl Mutator<K> + 'static,
    ) -> Self {
        Self {
            store,
            owner,
            mutator: Box::new(mutator),
        }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Drive the persisted object towards `desired`, issuing at most one write.
    #[instrument(skip(self, desired), fields(kind = %K::kind(&()), name = %desired.name_any()))]
    pub async fn reconcile(&self, mut desired: K) -> Result<Outcome> {
        let kind = K::kind(&());
        let Some(name) = desired.meta().name.clone() else {
            return Err(StewardError::InvalidObject {
                kind: kind.to_string(),
                reason: "desired object has no name".to_string(),
            });
        };

        let namespace = self.owner.namespace().to_string();
        desired.meta_mut().namespace = Some(namespace.clone());

        let existing = self.store.get(&namespace, &name).await?;
        let tagged = is_tagged_for_deletion(&desired);

        match (existing, tagged) {
            (None, true) => {
                debug!("{} {}/{} tagged for deletion and absent", kind, namespace, name);
                Ok(Outcome::Unchanged)
            }
            (Some(existing), true) => {
                // The controller reference is not consulted before deleting.
                let propagation = deletion_propagation_policy(&desired);
                self.store.delete(&existing, propagation).await?;
                info!("Deleted object '{}/{}' in {}", kind, name, namespace);
                Ok(Outcome::Deleted)
            }
            (None, false) => {
                ensure_owner_reference(&mut desired, &self.owner)?;
                self.store.create(&desired).await?;
                info!("Created object '{}/{}' in {}", kind, name, namespace);
                Ok(Outcome::Created)
            }
            (Some(mut existing), false) => {
                let mut changed = ensure_object_meta(&mut existing, &desired);
                changed |= ensure_owner_reference(&mut existing, &self.owner)?;
                changed |= self.mutator.mutate(&mut existing, &desired)?;

                if !changed {
                    debug!("{} {}/{} is up to date", kind, namespace, name);
                    return Ok(Outcome::Unchanged);
                }

                self.store.update(&existing).await?;
                info!("Updated object '{}/{}' in {}", kind, name, namespace);
                Ok(Outcome::Updated)
            }
        }
    }

    /// Like [`Reconciler::reconcile`], for kinds that may not be installed.
    /// When the kind is unavailable nothing is read or written.
    pub async fn reconcile_optional(
        &self,
        desired: K,
        availability: &KindAvailability,
    ) -> Result<Outcome> {
        let group_version = K::api_version(&());
        let kind = K::kind(&());

        if !availability.is_available(&group_version, &kind).await? {
            debug!(
                "{} ({}) is not installed in the cluster, skipping '{}'",
                kind,
                group_version,
                desired.name_any()
            );
            return Ok(Outcome::Skipped);
        }

        self.reconcile(desired).await
    }
}
