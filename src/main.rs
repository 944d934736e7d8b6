// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::{Client, Resource};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use steward::config::Config;
use steward::kubernetes::{wait_for_kind, DiscoveryProbe};
use steward::reconcilers::AppStackReconciler;
use steward::types::app_stack::AppStack;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Steward operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, requeue_interval={:?}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.requeue_interval
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for the AppStack CRD to become available...");
    let probe = DiscoveryProbe::new(client.clone());
    wait_for_kind(&probe, &AppStack::api_version(&()), &AppStack::kind(&())).await;

    AppStackReconciler::new(client, config).run().await?;

    // The controller only returns when its watch stream ends
    warn!("AppStack reconciler stopped unexpectedly");
    Ok(())
}
