// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::mutators::fields::replace_if_differs;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use kube::ResourceExt;
use tracing::info;

/// Reconcile replica bounds and metrics of an autoscaler.
pub fn horizontal_pod_autoscaler(
    existing: &mut HorizontalPodAutoscaler,
    desired: &HorizontalPodAutoscaler,
) -> Result<bool> {
    let want = desired.spec.clone().unwrap_or_default();
    let spec = existing.spec.get_or_insert_with(Default::default);

    let mut changed = false;
    changed |= replace_if_differs(&mut spec.min_replicas, &want.min_replicas);
    changed |= replace_if_differs(&mut spec.max_replicas, &want.max_replicas);
    changed |= replace_if_differs(&mut spec.metrics, &want.metrics);

    if changed {
        info!("HorizontalPodAutoscaler/{} spec has changed", desired.name_any());
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HPA: &str = r#"
apiVersion: autoscaling/v2
kind: HorizontalPodAutoscaler
metadata:
  name: shop
spec:
  scaleTargetRef:
    apiVersion: apps/v1
    kind: Deployment
    name: shop
  minReplicas: 1
  maxReplicas: 5
  metrics:
    - type: Resource
      resource:
        name: cpu
        target:
          type: Utilization
          averageUtilization: 85
"#;

    fn hpa() -> HorizontalPodAutoscaler {
        serde_yaml::from_str(HPA).unwrap()
    }

    #[test]
    fn test_unchanged() {
        let mut existing = hpa();
        assert!(!horizontal_pod_autoscaler(&mut existing, &hpa()).unwrap());
    }

    #[test]
    fn test_bounds_and_metrics() {
        let mut existing = hpa();
        let mut desired = hpa();
        let spec = desired.spec.as_mut().unwrap();
        spec.min_replicas = Some(2);
        spec.max_replicas = 10;
        spec.metrics = None;

        assert!(horizontal_pod_autoscaler(&mut existing, &desired).unwrap());
        assert_eq!(existing, desired);
        assert!(!horizontal_pod_autoscaler(&mut existing, &desired).unwrap());
    }
}
