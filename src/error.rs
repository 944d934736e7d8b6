// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StewardError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("{kind} {namespace}/{name} is already controlled by {controller}")]
    OwnershipConflict {
        kind: String,
        namespace: String,
        name: String,
        controller: String,
    },

    #[error("Invalid owner: {0}")]
    InvalidOwner(String),

    #[error("Invalid {kind} object: {reason}")]
    InvalidObject { kind: String, reason: String },

    #[error("Failed to discover {kind} in {group_version}: {source}")]
    CapabilityProbe {
        group_version: String,
        kind: String,
        #[source]
        source: kube::Error,
    },

    #[error("Refusing to reconcile {object}: {reason}")]
    InvariantViolation { object: String, reason: String },
}

impl StewardError {
    /// True for an optimistic-concurrency failure reported by the API server
    pub fn is_conflict(&self) -> bool {
        matches!(self, StewardError::KubeError(kube::Error::Api(e)) if e.code == 409)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StewardError::KubeError(kube::Error::Api(e)) if e.code == 404)
    }
}

pub type Result<T> = std::result::Result<T, StewardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::api_error;

    #[test]
    fn test_conflict_is_classified() {
        let err = StewardError::from(api_error(409, "Conflict"));
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_is_classified() {
        let err = StewardError::from(api_error(404, "NotFound"));
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_ownership_conflict_message_names_object() {
        let err = StewardError::OwnershipConflict {
            kind: "Service".to_string(),
            namespace: "apps".to_string(),
            name: "web".to_string(),
            controller: "Other/foreign".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Service apps/web is already controlled by Other/foreign"
        );
    }
}
