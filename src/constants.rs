// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Annotation keys set on desired objects by Steward
pub mod annotations {
    /// When set to "true", the object must not exist
    pub const DELETE: &str = "steward.dev/delete";
    /// Propagation policy used when deleting a tagged object (optional)
    pub const DELETE_PROPAGATION_POLICY: &str = "steward.dev/delete-propagation-policy";
}

/// The operator name, used as field manager on writes
pub const OPERATOR_NAME: &str = "steward";

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

