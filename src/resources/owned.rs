// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-kind entry points used by owner controllers.

use crate::error::Result;
use crate::kubernetes::discovery::{DiscoveryProbe, KindAvailability, KindProbe};
use crate::kubernetes::store::{KubeStore, ObjectStore};
use crate::reconcile::deletion::tag_for_deletion;
use crate::reconcile::engine::{Outcome, Reconciler};
use crate::reconcile::mutator::Mutator;
use crate::reconcile::owner::Owner;
use crate::types::monitoring::{GrafanaDashboard, PodMonitor, PrometheusRule, ServiceMonitor};
use crate::types::openshift::{ImageStream, Route};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolumeClaim, Secret, Service, ServiceAccount};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use kube::{Client, Resource, ResourceExt};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::warn;

/// Reconciles the objects owned by one owner during a single pass.
///
/// Kind availability is probed at most once per kind for the lifetime of this
/// value, so build a new one for every pass.
pub struct OwnedResources<S = KubeStore> {
    owner: Owner,
    store: Arc<S>,
    availability: KindAvailability,
}

impl OwnedResources<KubeStore> {
    pub fn new(client: Client, owner: Owner) -> Self {
        let probe = Arc::new(DiscoveryProbe::new(client.clone()));
        Self::with_store(KubeStore::new(client), owner, probe)
    }
}

impl<S> OwnedResources<S>
where
    S: Send + Sync + 'static,
{
    pub fn with_store(store: S, owner: Owner, probe: Arc<dyn KindProbe>) -> Self {
        Self {
            owner,
            store: Arc::new(store),
            availability: KindAvailability::new(probe),
        }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    fn reconciler<K>(&self, mutator: impl Mutator<K> + 'static) -> Reconciler<K>
    where
        S: ObjectStore<K>,
        K: Resource<DynamicType = ()> + Clone + Debug + Send + Sync + 'static,
    {
        Reconciler::new(self.store.clone(), self.owner.clone(), mutator)
    }

    async fn reconcile<K>(&self, desired: K, mutator: impl Mutator<K> + 'static) -> Result<Outcome>
    where
        S: ObjectStore<K>,
        K: Resource<DynamicType = ()> + Clone + Debug + Send + Sync + 'static,
    {
        self.reconciler(mutator).reconcile(desired).await
    }

    async fn reconcile_toggled<K>(
        &self,
        mut desired: K,
        mutator: impl Mutator<K> + 'static,
        enabled: bool,
    ) -> Result<Outcome>
    where
        S: ObjectStore<K>,
        K: Resource<DynamicType = ()> + Clone + Debug + Send + Sync + 'static,
    {
        if !enabled {
            tag_for_deletion(&mut desired);
        }
        self.reconcile(desired, mutator).await
    }

    /// Reconcile a kind that only exists when an add-on is installed. A
    /// disabled object is tagged for deletion so a previous version is removed
    /// once the kind shows up.
    async fn reconcile_optional<K>(
        &self,
        mut desired: K,
        mutator: impl Mutator<K> + 'static,
        enabled: bool,
    ) -> Result<Outcome>
    where
        S: ObjectStore<K>,
        K: Resource<DynamicType = ()> + Clone + Debug + Send + Sync + 'static,
    {
        if !enabled {
            tag_for_deletion(&mut desired);
        }
        let name = desired.name_any();
        let outcome = self
            .reconciler(mutator)
            .reconcile_optional(desired, &self.availability)
            .await?;

        if enabled && outcome == Outcome::Skipped {
            warn!(
                "{} is enabled for {} but {} ({}) is not installed, '{}' was not reconciled",
                K::kind(&()),
                self.owner.describe(),
                K::kind(&()),
                K::api_version(&()),
                name
            );
        }
        Ok(outcome)
    }

    pub async fn reconcile_deployment(
        &self,
        desired: Deployment,
        mutator: impl Mutator<Deployment> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<Deployment>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_service(
        &self,
        desired: Service,
        mutator: impl Mutator<Service> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<Service>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_config_map(
        &self,
        desired: ConfigMap,
        mutator: impl Mutator<ConfigMap> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<ConfigMap>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_secret(
        &self,
        desired: Secret,
        mutator: impl Mutator<Secret> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<Secret>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_service_account(
        &self,
        desired: ServiceAccount,
        mutator: impl Mutator<ServiceAccount> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<ServiceAccount>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_role(
        &self,
        desired: Role,
        mutator: impl Mutator<Role> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<Role>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_role_binding(
        &self,
        desired: RoleBinding,
        mutator: impl Mutator<RoleBinding> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<RoleBinding>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_pod_disruption_budget(
        &self,
        desired: PodDisruptionBudget,
        mutator: impl Mutator<PodDisruptionBudget> + 'static,
        enabled: bool,
    ) -> Result<Outcome>
    where
        S: ObjectStore<PodDisruptionBudget>,
    {
        self.reconcile_toggled(desired, mutator, enabled).await
    }

    pub async fn reconcile_hpa(
        &self,
        desired: HorizontalPodAutoscaler,
        mutator: impl Mutator<HorizontalPodAutoscaler> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<HorizontalPodAutoscaler>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_persistent_volume_claim(
        &self,
        desired: PersistentVolumeClaim,
        mutator: impl Mutator<PersistentVolumeClaim> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<PersistentVolumeClaim>,
    {
        self.reconcile(desired, mutator).await
    }

    pub async fn reconcile_route(
        &self,
        desired: Route,
        mutator: impl Mutator<Route> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<Route>,
    {
        self.reconcile_optional(desired, mutator, true).await
    }

    pub async fn reconcile_image_stream(
        &self,
        desired: ImageStream,
        mutator: impl Mutator<ImageStream> + 'static,
    ) -> Result<Outcome>
    where
        S: ObjectStore<ImageStream>,
    {
        self.reconcile_optional(desired, mutator, true).await
    }

    pub async fn reconcile_prometheus_rule(
        &self,
        desired: PrometheusRule,
        mutator: impl Mutator<PrometheusRule> + 'static,
        enabled: bool,
    ) -> Result<Outcome>
    where
        S: ObjectStore<PrometheusRule>,
    {
        self.reconcile_optional(desired, mutator, enabled).await
    }

    pub async fn reconcile_service_monitor(
        &self,
        desired: ServiceMonitor,
        mutator: impl Mutator<ServiceMonitor> + 'static,
        enabled: bool,
    ) -> Result<Outcome>
    where
        S: ObjectStore<ServiceMonitor>,
    {
        self.reconcile_optional(desired, mutator, enabled).await
    }

    pub async fn reconcile_pod_monitor(
        &self,
        desired: PodMonitor,
        mutator: impl Mutator<PodMonitor> + 'static,
        enabled: bool,
    ) -> Result<Outcome>
    where
        S: ObjectStore<PodMonitor>,
    {
        self.reconcile_optional(desired, mutator, enabled).await
    }

    pub async fn reconcile_grafana_dashboard(
        &self,
        desired: GrafanaDashboard,
        mutator: impl Mutator<GrafanaDashboard> + 'static,
        enabled: bool,
    ) -> Result<Outcome>
    where
        S: ObjectStore<GrafanaDashboard>,
    {
        self.reconcile_optional(desired, mutator, enabled).await
    }
}
