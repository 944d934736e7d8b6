// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The custom resource every managed object is subordinate to.

use crate::error::{Result, StewardError};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Resource, ResourceExt};

/// Identity of the owning custom resource: its namespace and the controller
/// reference stamped on every managed object.
#[derive(Clone, Debug, PartialEq)]
pub struct Owner {
    namespace: String,
    reference: OwnerReference,
}

impl Owner {
    /// Build an owner from a persisted, namespaced resource.
    /// The resource must carry a name and uid.
    pub fn from_resource<O>(owner: &O) -> Result<Self>
    where
        O: Resource<DynamicType = ()>,
    {
        let describe = || format!("{}/{}", O::kind(&()), owner.name_any());

        let namespace = owner
            .namespace()
            .ok_or_else(|| StewardError::InvalidOwner(format!("{} has no namespace", describe())))?;

        let reference = owner.controller_owner_ref(&()).ok_or_else(|| {
            StewardError::InvalidOwner(format!("{} has no name or uid", describe()))
        })?;

        Ok(Owner {
            namespace,
            reference,
        })
    }

    /// Namespace all managed objects live in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn reference(&self) -> &OwnerReference {
        &self.reference
    }

    pub fn uid(&self) -> &str {
        &self.reference.uid
    }

    /// "Kind/name" of the owner, for logs and errors
    pub fn describe(&self) -> String {
        format!("{}/{}", self.reference.kind, self.reference.name)
    }
}
