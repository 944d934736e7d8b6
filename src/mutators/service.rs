// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::mutators::fields::replace_if_differs;
use k8s_openapi::api::core::v1::Service;
use kube::ResourceExt;
use tracing::info;

pub fn ports(existing: &mut Service, desired: &Service) -> Result<bool> {
    let want = desired.spec.as_ref().and_then(|s| s.ports.clone());
    let spec = existing.spec.get_or_insert_with(Default::default);
    if !replace_if_differs(&mut spec.ports, &want) {
        return Ok(false);
    }
    info!("Service/{} ports have changed", desired.name_any());
    Ok(true)
}

pub fn selector(existing: &mut Service, desired: &Service) -> Result<bool> {
    let want = desired.spec.as_ref().and_then(|s| s.selector.clone());
    let spec = existing.spec.get_or_insert_with(Default::default);
    if !replace_if_differs(&mut spec.selector, &want) {
        return Ok(false);
    }
    info!("Service/{} selector has changed", desired.name_any());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ServicePort, ServiceSpec};
    use std::collections::BTreeMap;

    fn service(port: i32, app: &str) -> Service {
        Service {
            spec: Some(ServiceSpec {
                ports: Some(vec![ServicePort {
                    name: Some("http".to_string()),
                    port,
                    ..Default::default()
                }]),
                selector: Some(BTreeMap::from([("app".to_string(), app.to_string())])),
                cluster_ip: Some("10.0.0.12".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_ports() {
        let mut existing = service(80, "shop");

        assert!(!ports(&mut existing, &service(80, "shop")).unwrap());
        assert!(ports(&mut existing, &service(8080, "shop")).unwrap());
        assert_eq!(existing.spec.as_ref().unwrap().ports.as_ref().unwrap()[0].port, 8080);
    }

    #[test]
    fn test_selector_leaves_other_fields() {
        let mut existing = service(80, "shop");
        let mut desired = service(80, "cart");
        desired.spec.as_mut().unwrap().cluster_ip = None;

        assert!(selector(&mut existing, &desired).unwrap());
        assert!(!selector(&mut existing, &desired).unwrap());
        let spec = existing.spec.unwrap();
        assert_eq!(spec.selector.unwrap().get("app").unwrap(), "cart");
        assert_eq!(spec.cluster_ip.as_deref(), Some("10.0.0.12"));
    }
}
