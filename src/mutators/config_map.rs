// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::mutators::fields::replace_field;
use k8s_openapi::api::core::v1::ConfigMap;

pub fn data(existing: &mut ConfigMap, desired: &ConfigMap) -> Result<bool> {
    replace_field("data", |c: &ConfigMap| &c.data, |c: &mut ConfigMap| &mut c.data)(existing, desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_data_is_replaced() {
        let mut existing = ConfigMap {
            data: Some(BTreeMap::from([("a".to_string(), "1".to_string())])),
            ..Default::default()
        };
        let desired = ConfigMap {
            data: Some(BTreeMap::from([("b".to_string(), "2".to_string())])),
            ..Default::default()
        };

        assert!(data(&mut existing, &desired).unwrap());
        assert_eq!(existing.data, desired.data);
        assert!(!data(&mut existing, &desired).unwrap());
    }
}
