// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed entry points for every kind an owner can manage.

pub mod owned;

pub use owned::OwnedResources;
