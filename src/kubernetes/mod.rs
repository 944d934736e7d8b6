// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for object persistence and kind discovery.

pub mod crd;
pub mod discovery;
pub mod store;

pub use crd::wait_for_kind;
pub use discovery::{DiscoveryProbe, KindAvailability, KindProbe};
pub use store::{KubeStore, ObjectStore};
