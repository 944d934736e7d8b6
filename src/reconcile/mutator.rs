// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mutation policies: units of diff/repair logic applied to an existing object.

use crate::error::Result;

/// Corrects divergences between an existing object and its desired state.
///
/// Implementations mutate `existing` in place and report whether they changed
/// anything. Applying a mutator a second time to the same pair must report no
/// change.
pub trait Mutator<K>: Send + Sync {
    fn mutate(&self, existing: &mut K, desired: &K) -> Result<bool>;
}

impl<K, F> Mutator<K> for F
where
    F: Fn(&mut K, &K) -> Result<bool> + Send + Sync,
{
    fn mutate(&self, existing: &mut K, desired: &K) -> Result<bool> {
        self(existing, desired)
    }
}

/// Never updates an object once it exists.
pub fn create_only<K>(_existing: &mut K, _desired: &K) -> Result<bool> {
    Ok(false)
}

/// An ordered list of mutators acting as one.
///
/// Every member runs, in order, even after an earlier one reported a change,
/// so later members see the corrections made by earlier ones. The chain
/// reports a change if any member did. The first error aborts the chain.
pub struct MutatorChain<K> {
    mutators: Vec<Box<dyn Mutator<K>>>,
}

impl<K> MutatorChain<K> {
    pub fn new() -> Self {
        Self {
            mutators: Vec::new(),
        }
    }

    pub fn with(mut self, mutator: impl Mutator<K> + 'static) -> Self {
        self.mutators.push(Box::new(mutator));
        self
    }

    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }
}

impl<K> Default for MutatorChain<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, M> FromIterator<M> for MutatorChain<K>
where
    M: Mutator<K> + 'static,
{
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |chain, m| chain.with(m))
    }
}

impl<K> Mutator<K> for MutatorChain<K> {
    fn mutate(&self, existing: &mut K, desired: &K) -> Result<bool> {
        let mut changed = false;
        for mutator in &self.mutators {
            changed |= mutator.mutate(existing, desired)?;
        }
        Ok(changed)
    }
}
