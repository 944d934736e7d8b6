// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked API server for kube clients and an in-memory object store.

use crate::error::Result;
use crate::kubernetes::store::ObjectStore;
use crate::reconcile::owner::Owner;
use crate::types::app_stack::{AppStack, AppStackSpec};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{ObjectMeta, PropagationPolicy};
use kube::client::Body;
use kube::core::ErrorResponse;
use kube::{Client, Resource, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request method and path.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, status_json(404, "NotFound", "not found")));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// A Status response body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": if code < 400 { "Success" } else { "Failure" },
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// An API error as returned by the kube client
pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{} ({})", reason, code),
        reason: reason.to_string(),
        code,
    })
}

pub fn make_owner_stack(name: &str, namespace: &str, uid: Option<&str>) -> AppStack {
    AppStack {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: uid.map(str::to_string),
            ..Default::default()
        },
        spec: AppStackSpec {
            image: "registry.example.com/shop:1.0".to_string(),
            replicas: None,
            port: 8080,
            pod_disruption_budget: false,
            monitoring: false,
        },
    }
}

/// Owner "AppStack/shop" in namespace "apps"
pub fn make_owner(uid: &str) -> Owner {
    Owner::from_resource(&make_owner_stack("shop", "apps", Some(uid))).unwrap()
}

/// A controller reference to an arbitrary object
pub fn owner_reference(kind: &str, name: &str, uid: &str) -> OwnerReference {
    OwnerReference {
        api_version: "example.com/v1".to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        uid: uid.to_string(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// A write performed against a [`MemoryStore`], by object name
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Create(String),
    Update(String),
    Delete(String, Option<PropagationPolicy>),
}

struct MemoryState<K> {
    objects: BTreeMap<(String, String), K>,
    writes: Vec<Write>,
    reads: usize,
    update_attempts: usize,
    fail_get: Option<kube::Error>,
    fail_update: Option<kube::Error>,
}

/// An in-memory [`ObjectStore`] that records every read and write.
pub struct MemoryStore<K> {
    state: Mutex<MemoryState<K>>,
}

impl<K> MemoryStore<K>
where
    K: Resource + Clone,
{
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                objects: BTreeMap::new(),
                writes: Vec::new(),
                reads: 0,
                update_attempts: 0,
                fail_get: None,
                fail_update: None,
            }),
        }
    }

    /// Seed an object without recording a write
    pub fn insert(&self, obj: K) {
        let key = key_of(&obj);
        self.state.lock().unwrap().objects.insert(key, obj);
    }

    pub fn object(&self, namespace: &str, name: &str) -> Option<K> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn writes(&self) -> Vec<Write> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    pub fn update_attempts(&self) -> usize {
        self.state.lock().unwrap().update_attempts
    }

    pub fn fail_next_get(&self, err: kube::Error) {
        self.state.lock().unwrap().fail_get = Some(err);
    }

    pub fn fail_next_update(&self, err: kube::Error) {
        self.state.lock().unwrap().fail_update = Some(err);
    }
}

impl<K> Default for MemoryStore<K>
where
    K: Resource + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

fn key_of<K: Resource>(obj: &K) -> (String, String) {
    (obj.namespace().unwrap_or_default(), obj.name_any())
}

#[async_trait]
impl<K> ObjectStore<K> for MemoryStore<K>
where
    K: Resource + Clone + Send + Sync,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if let Some(err) = state.fail_get.take() {
            return Err(err.into());
        }
        Ok(state
            .objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create(&self, obj: &K) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = key_of(obj);
        if state.objects.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists").into());
        }
        state.objects.insert(key, obj.clone());
        state.writes.push(Write::Create(obj.name_any()));
        Ok(())
    }

    async fn update(&self, obj: &K) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.update_attempts += 1;
        if let Some(err) = state.fail_update.take() {
            return Err(err.into());
        }
        let key = key_of(obj);
        if !state.objects.contains_key(&key) {
            return Err(api_error(404, "NotFound").into());
        }
        state.objects.insert(key, obj.clone());
        state.writes.push(Write::Update(obj.name_any()));
        Ok(())
    }

    async fn delete(&self, obj: &K, propagation: Option<PropagationPolicy>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.objects.remove(&key_of(obj));
        state.writes.push(Write::Delete(obj.name_any(), propagation));
        Ok(())
    }
}
