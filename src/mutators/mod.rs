// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reusable mutation policies, grouped by the kind they apply to.

pub mod config_map;
pub mod deployment;
pub mod fields;
pub mod hpa;
pub mod image_stream;
pub mod monitoring;
pub mod pdb;
pub mod rbac;
pub mod secret;
pub mod service;
pub mod service_account;
