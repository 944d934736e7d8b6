// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single-container application and its supporting objects, all owned by
/// the AppStack.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "steward.dev", version = "v1alpha1", kind = "AppStack")]
#[kube(namespaced)]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct AppStackSpec {
    pub image: String,
    /// Left to an autoscaler when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    pub port: i32,
    #[serde(default)]
    pub pod_disruption_budget: bool,
    #[serde(default)]
    pub monitoring: bool,
}

impl AppStack {
    /// Labels shared by every object of this stack; also the pod selector
    pub fn selector_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("app.kubernetes.io/name".to_string(), self.name_any()),
            (
                "app.kubernetes.io/managed-by".to_string(),
                crate::constants::OPERATOR_NAME.to_string(),
            ),
        ])
    }
}
