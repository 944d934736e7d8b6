// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! AppStack reconciler - builds the objects of every AppStack and keeps them in sync.

use crate::config::Config;
use crate::error::{Result, StewardError};
use crate::mutators;
use crate::reconcile::{MutatorChain, Outcome, Owner};
use crate::resources::OwnedResources;
use crate::types::app_stack::AppStack;
use crate::types::monitoring::{self, ServiceMonitor, ServiceMonitorSpec};
use futures::StreamExt;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, Service, ServiceAccount, ServicePort,
    ServiceSpec,
};
use k8s_openapi::api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::{
    api::ObjectMeta,
    runtime::{controller::Action, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const HTTP_PORT_NAME: &str = "http";
const TCP: &str = "TCP";
const METRICS_PATH: &str = "/metrics";

pub struct AppStackReconciler {
    client: Client,
    config: Config,
}

impl AppStackReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let (stacks, deployments, services) = match &self.config.watch_namespace {
            Some(ns) => (
                Api::<AppStack>::namespaced(self.client.clone(), ns),
                Api::<Deployment>::namespaced(self.client.clone(), ns),
                Api::<Service>::namespaced(self.client.clone(), ns),
            ),
            None => (
                Api::<AppStack>::all(self.client.clone()),
                Api::<Deployment>::all(self.client.clone()),
                Api::<Service>::all(self.client.clone()),
            ),
        };
        let context = Arc::new(self);

        Controller::new(stacks, WatcherConfig::default())
            .owns(deployments, WatcherConfig::default())
            .owns(services, WatcherConfig::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled app stack: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

#[instrument(skip(stack, ctx), fields(namespace = %stack.namespace().unwrap_or_default(), name = %stack.name_any()))]
async fn reconcile(stack: Arc<AppStack>, ctx: Arc<AppStackReconciler>) -> Result<Action> {
    if stack.metadata.deletion_timestamp.is_some() {
        debug!("AppStack is being deleted, owned objects are garbage collected");
        return Ok(Action::await_change());
    }

    let owner = Owner::from_resource(&*stack)?;
    let resources = OwnedResources::new(ctx.client.clone(), owner);
    let spec = &stack.spec;

    let results = vec![
        (
            "ServiceAccount",
            resources
                .reconcile_service_account(
                    service_account(&stack),
                    mutators::service_account::image_pull_secrets,
                )
                .await,
        ),
        (
            "Deployment",
            resources
                .reconcile_deployment(deployment(&stack), deployment_mutators())
                .await,
        ),
        (
            "Service",
            resources
                .reconcile_service(service(&stack), service_mutators())
                .await,
        ),
        (
            "PodDisruptionBudget",
            resources
                .reconcile_pod_disruption_budget(
                    pod_disruption_budget(&stack),
                    mutators::pdb::pod_disruption_budget,
                    spec.pod_disruption_budget,
                )
                .await,
        ),
        (
            "ServiceMonitor",
            resources
                .reconcile_service_monitor(
                    service_monitor(&stack),
                    mutators::monitoring::service_monitor,
                    spec.monitoring,
                )
                .await,
        ),
    ];

    first_error(results)?;
    Ok(Action::requeue(ctx.config.requeue_interval))
}

fn error_policy(stack: Arc<AppStack>, error: &StewardError, ctx: Arc<AppStackReconciler>) -> Action {
    error!(
        "Reconciliation of AppStack {}/{} failed: {}",
        stack.namespace().unwrap_or_default(),
        stack.name_any(),
        error
    );
    Action::requeue(ctx.config.error_requeue)
}

/// Log every outcome and return the first failure, if any.
fn first_error(results: Vec<(&str, Result<Outcome>)>) -> Result<()> {
    let mut first = None;
    for (kind, result) in results {
        match result {
            Ok(Outcome::Unchanged) => debug!("{} is up to date", kind),
            Ok(outcome) => info!("{} {:?}", kind, outcome),
            Err(e) => {
                error!("Failed to reconcile {}: {}", kind, e);
                first.get_or_insert(e);
            }
        }
    }
    first.map_or(Ok(()), Err)
}

fn deployment_mutators() -> MutatorChain<Deployment> {
    mutators::deployment::generic_deployment_mutators()
        .with(mutators::deployment::replicas)
        .with(mutators::deployment::remove_duplicate_env_vars)
}

fn service_mutators() -> MutatorChain<Service> {
    MutatorChain::new()
        .with(mutators::service::ports)
        .with(mutators::service::selector)
}

fn metadata(stack: &AppStack) -> ObjectMeta {
    ObjectMeta {
        name: Some(stack.name_any()),
        namespace: stack.namespace(),
        labels: Some(stack.selector_labels()),
        ..Default::default()
    }
}

pub fn service_account(stack: &AppStack) -> ServiceAccount {
    ServiceAccount {
        metadata: metadata(stack),
        ..Default::default()
    }
}

pub fn deployment(stack: &AppStack) -> Deployment {
    let labels = stack.selector_labels();
    Deployment {
        metadata: metadata(stack),
        spec: Some(DeploymentSpec {
            replicas: stack.spec.replicas,
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    service_account_name: Some(stack.name_any()),
                    containers: vec![Container {
                        name: stack.name_any(),
                        image: Some(stack.spec.image.clone()),
                        ports: Some(vec![ContainerPort {
                            name: Some(HTTP_PORT_NAME.to_string()),
                            container_port: stack.spec.port,
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn service(stack: &AppStack) -> Service {
    Service {
        metadata: metadata(stack),
        spec: Some(ServiceSpec {
            selector: Some(stack.selector_labels()),
            ports: Some(vec![ServicePort {
                name: Some(HTTP_PORT_NAME.to_string()),
                port: stack.spec.port,
                protocol: Some(TCP.to_string()),
                target_port: Some(IntOrString::String(HTTP_PORT_NAME.to_string())),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn pod_disruption_budget(stack: &AppStack) -> PodDisruptionBudget {
    PodDisruptionBudget {
        metadata: metadata(stack),
        spec: Some(PodDisruptionBudgetSpec {
            min_available: Some(IntOrString::Int(1)),
            selector: Some(LabelSelector {
                match_labels: Some(stack.selector_labels()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn service_monitor(stack: &AppStack) -> ServiceMonitor {
    ServiceMonitor {
        metadata: metadata(stack),
        spec: ServiceMonitorSpec {
            selector: monitoring::LabelSelector {
                match_labels: Some(stack.selector_labels()),
            },
            endpoints: vec![monitoring::Endpoint {
                port: Some(HTTP_PORT_NAME.to_string()),
                path: Some(METRICS_PATH.to_string()),
                ..Default::default()
            }],
        },
    }
}
