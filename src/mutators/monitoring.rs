// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The monitoring kinds are fully owned by Steward: their spec is replaced.

use crate::error::Result;
use crate::mutators::fields::replace_field;
use crate::types::monitoring::{GrafanaDashboard, PodMonitor, PrometheusRule, ServiceMonitor};

pub fn prometheus_rule(existing: &mut PrometheusRule, desired: &PrometheusRule) -> Result<bool> {
    replace_field(
        "spec",
        |r: &PrometheusRule| &r.spec,
        |r: &mut PrometheusRule| &mut r.spec,
    )(existing, desired)
}

pub fn service_monitor(existing: &mut ServiceMonitor, desired: &ServiceMonitor) -> Result<bool> {
    replace_field(
        "spec",
        |m: &ServiceMonitor| &m.spec,
        |m: &mut ServiceMonitor| &mut m.spec,
    )(existing, desired)
}

pub fn pod_monitor(existing: &mut PodMonitor, desired: &PodMonitor) -> Result<bool> {
    replace_field(
        "spec",
        |m: &PodMonitor| &m.spec,
        |m: &mut PodMonitor| &mut m.spec,
    )(existing, desired)
}

pub fn grafana_dashboard(existing: &mut GrafanaDashboard, desired: &GrafanaDashboard) -> Result<bool> {
    replace_field(
        "spec",
        |d: &GrafanaDashboard| &d.spec,
        |d: &mut GrafanaDashboard| &mut d.spec,
    )(existing, desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::monitoring::{GrafanaDashboardSpec, PrometheusRuleSpec, Rule, RuleGroup};

    #[test]
    fn test_prometheus_rule_spec_replaced() {
        let mut existing = PrometheusRule::new("shop", PrometheusRuleSpec::default());
        let desired = PrometheusRule::new(
            "shop",
            PrometheusRuleSpec {
                groups: vec![RuleGroup {
                    name: "shop.rules".to_string(),
                    rules: vec![Rule {
                        alert: Some("ShopDown".to_string()),
                        expr: "up{job=\"shop\"} == 0".to_string(),
                        for_: Some("5m".to_string()),
                        ..Default::default()
                    }],
                }],
            },
        );

        assert!(prometheus_rule(&mut existing, &desired).unwrap());
        assert_eq!(existing.spec, desired.spec);
        assert!(!prometheus_rule(&mut existing, &desired).unwrap());
    }

    #[test]
    fn test_grafana_dashboard_unchanged() {
        let spec = GrafanaDashboardSpec {
            json: "{}".to_string(),
            name: Some("shop.json".to_string()),
        };
        let mut existing = GrafanaDashboard::new("shop", spec.clone());

        assert!(!grafana_dashboard(&mut existing, &GrafanaDashboard::new("shop", spec)).unwrap());
    }
}
