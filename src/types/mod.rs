// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource definitions: the AppStack owner and the optional
//! third-party kinds managed on its behalf.

pub mod app_stack;
pub mod monitoring;
pub mod openshift;
