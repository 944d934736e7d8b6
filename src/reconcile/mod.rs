// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The generic reconciliation engine: deletion tags, metadata merging,
//! mutation policies and the create/update/delete state machine.

pub mod deletion;
pub mod engine;
pub mod metadata;
pub mod mutator;
pub mod owner;

pub use deletion::{is_tagged_for_deletion, tag_for_deletion, tag_for_deletion_with_propagation};
pub use engine::{Outcome, Reconciler};
pub use mutator::{create_only, Mutator, MutatorChain};
pub use owner::Owner;
