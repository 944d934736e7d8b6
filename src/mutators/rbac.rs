// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::mutators::fields::replace_field;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};

pub fn role_rules(existing: &mut Role, desired: &Role) -> Result<bool> {
    replace_field("rules", |r: &Role| &r.rules, |r: &mut Role| &mut r.rules)(existing, desired)
}

pub fn role_binding_subjects(existing: &mut RoleBinding, desired: &RoleBinding) -> Result<bool> {
    replace_field(
        "subjects",
        |b: &RoleBinding| &b.subjects,
        |b: &mut RoleBinding| &mut b.subjects,
    )(existing, desired)
}

pub fn role_binding_role_ref(existing: &mut RoleBinding, desired: &RoleBinding) -> Result<bool> {
    replace_field(
        "roleRef",
        |b: &RoleBinding| &b.role_ref,
        |b: &mut RoleBinding| &mut b.role_ref,
    )(existing, desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::rbac::v1::{PolicyRule, RoleRef, Subject};

    fn binding(role: &str, account: &str) -> RoleBinding {
        RoleBinding {
            role_ref: RoleRef {
                api_group: "rbac.authorization.k8s.io".to_string(),
                kind: "Role".to_string(),
                name: role.to_string(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".to_string(),
                name: account.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_role_rules() {
        let mut existing = Role::default();
        let desired = Role {
            rules: Some(vec![PolicyRule {
                api_groups: Some(vec![String::new()]),
                resources: Some(vec!["configmaps".to_string()]),
                verbs: vec!["get".to_string(), "list".to_string()],
                ..Default::default()
            }]),
            ..Default::default()
        };

        assert!(role_rules(&mut existing, &desired).unwrap());
        assert!(!role_rules(&mut existing, &desired).unwrap());
        assert_eq!(existing.rules, desired.rules);
    }

    #[test]
    fn test_role_binding() {
        let mut existing = binding("reader", "shop");
        let desired = binding("writer", "cart");

        assert!(role_binding_subjects(&mut existing, &desired).unwrap());
        assert_eq!(existing.role_ref.name, "reader");
        assert!(role_binding_role_ref(&mut existing, &desired).unwrap());
        assert_eq!(existing, desired);
    }
}
