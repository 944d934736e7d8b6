// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persistence of managed objects.

use crate::constants::OPERATOR_NAME;
use crate::error::{Result, StewardError};
use async_trait::async_trait;
use kube::{
    api::{DeleteParams, PostParams, PropagationPolicy},
    Api, Client, Resource, ResourceExt,
};
use k8s_openapi::NamespaceResourceScope;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{debug, instrument};

/// The operations the reconciliation engine needs from the API server.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync {
    /// Fetch an object; `None` when it does not exist
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>>;

    async fn create(&self, obj: &K) -> Result<()>;

    /// Replace an object; fails when its resourceVersion is stale
    async fn update(&self, obj: &K) -> Result<()>;

    /// Delete an object; an already absent object is not an error
    async fn delete(&self, obj: &K, propagation: Option<PropagationPolicy>) -> Result<()>;
}

/// [`ObjectStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, obj: &K) -> Result<(Api<K>, String)>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    {
        let Some(namespace) = obj.namespace() else {
            return Err(StewardError::InvalidObject {
                kind: K::kind(&()).to_string(),
                reason: format!("'{}' has no namespace", obj.name_any()),
            });
        };
        Ok((Api::namespaced(self.client.clone(), &namespace), obj.name_any()))
    }
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl<K> ObjectStore<K> for KubeStore
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    #[instrument(skip(self), fields(kind = %K::kind(&())))]
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn create(&self, obj: &K) -> Result<()> {
        let (api, _) = self.api(obj)?;
        api.create(&post_params(), obj).await?;
        Ok(())
    }

    async fn update(&self, obj: &K) -> Result<()> {
        let (api, name) = self.api(obj)?;
        api.replace(&name, &post_params(), obj).await?;
        Ok(())
    }

    async fn delete(&self, obj: &K, propagation: Option<PropagationPolicy>) -> Result<()> {
        let (api, name) = self.api(obj)?;
        let dp = DeleteParams {
            propagation_policy: propagation,
            ..Default::default()
        };

        match api.delete(&name, &dp).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("{} {} already gone", K::kind(&()), name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
