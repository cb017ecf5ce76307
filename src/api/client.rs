//! Typed clients for each resource kind.
//!
//! # Responsibilities
//! - Define the remote operations available per kind (`RemoteResourceClient`)
//! - Define load balancer actions and system update lookups (`LoadBalancerActions`)
//! - Implement both over `HttpTransport` with JSON envelopes
//!
//! # Design Decisions
//! - Traits are object-safe (`async_trait`) so reconcilers take `Arc<dyn ...>`
//! - Show and List always request `changes=true` so staged values come back
//! - Every call is counted in metrics by kind, operation and outcome

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;

use crate::api::error::{ApiError, ApiResult};
use crate::api::transport::HttpTransport;
use crate::observability::metrics;
use crate::resources::kind::{Kind, PatchOf, ResourceKind};
use crate::resources::load_balancer::LoadBalancer;
use crate::resources::operation::{ActionRequest, OperationHandle};
use crate::resources::snapshot::{Desired, Snapshot};
use crate::resources::system_update::SystemUpdate;
use crate::staging::delta::AttributeDelta;

/// Remote operations on one resource kind.
#[async_trait]
pub trait RemoteResourceClient<K: ResourceKind>: Send + Sync {
    /// Fetch one resource including its staged values.
    async fn show(&self, id: &str) -> ApiResult<Snapshot<K>>;

    /// Fetch every resource of this kind owned by a load balancer.
    async fn list(&self, load_balancer_id: &str) -> ApiResult<Vec<Snapshot<K>>>;

    async fn create(&self, desired: &Desired<K>) -> ApiResult<Snapshot<K>>;

    /// Update attributes (name/description/tags); never staged.
    async fn update(&self, id: &str, delta: &AttributeDelta) -> ApiResult<Snapshot<K>>;

    async fn delete(&self, id: &str) -> ApiResult<()>;

    /// Start a staged change on an ACTIVE resource.
    async fn create_staged(&self, id: &str, patch: &PatchOf<K>) -> ApiResult<Snapshot<K>>;

    /// Merge changes into an existing staged change.
    async fn update_staged(&self, id: &str, patch: &PatchOf<K>) -> ApiResult<Snapshot<K>>;

    /// Discard the pending staged change.
    async fn cancel_staged(&self, id: &str) -> ApiResult<()>;
}

/// Fleet-wide actions on a load balancer.
#[async_trait]
pub trait LoadBalancerActions: Send + Sync {
    async fn action(&self, load_balancer_id: &str, request: &ActionRequest) -> ApiResult<OperationHandle>;

    async fn show_system_update(&self, id: &str) -> ApiResult<SystemUpdate>;
}

/// `RemoteResourceClient` over HTTP.
pub struct HttpResourceClient<K> {
    transport: HttpTransport,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for HttpResourceClient<K> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: ResourceKind> HttpResourceClient<K> {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            _kind: PhantomData,
        }
    }

    fn item(id: &str) -> [&str; 2] {
        [K::KIND.collection(), id]
    }

    fn staged(id: &str) -> [&str; 3] {
        [K::KIND.collection(), id, "staged"]
    }

    async fn call(
        &self,
        op: &'static str,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ApiResult<Option<Value>> {
        let result = self.transport.request(method, segments, query, body.as_ref()).await;
        metrics::record_api_call(K::KIND, op, &result);
        result
    }

    async fn call_single(
        &self,
        op: &'static str,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ApiResult<Snapshot<K>> {
        let response = self.call(op, method, segments, query, body).await?;
        unwrap_envelope(response, K::KIND.singular(), &segments.join("/"))
    }

    /// Envelope `body` for a write to `segments`.
    fn body<T: Serialize + ?Sized>(segments: &[&str], body: &T) -> ApiResult<Value> {
        envelope(K::KIND.singular(), body, &segments.join("/"))
    }
}

/// Wrap a serializable body in its `{"<key>": ...}` envelope.
fn envelope<T: Serialize + ?Sized>(key: &str, body: &T, path: &str) -> ApiResult<Value> {
    let inner = serde_json::to_value(body).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })?;
    let mut map = Map::new();
    map.insert(key.to_string(), inner);
    Ok(Value::Object(map))
}

/// Take `key` out of a response body and decode it.
fn unwrap_envelope<T: DeserializeOwned>(body: Option<Value>, key: &str, path: &str) -> ApiResult<T> {
    let inner = match body {
        Some(Value::Object(mut map)) => map.remove(key),
        _ => None,
    }
    .ok_or_else(|| ApiError::missing_envelope(path, key))?;

    serde_json::from_value(inner).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

const CHANGES: (&str, &str) = ("changes", "true");

#[async_trait]
impl<K: ResourceKind> RemoteResourceClient<K> for HttpResourceClient<K> {
    async fn show(&self, id: &str) -> ApiResult<Snapshot<K>> {
        self.call_single("show", Method::GET, &Self::item(id), &[CHANGES], None).await
    }

    async fn list(&self, load_balancer_id: &str) -> ApiResult<Vec<Snapshot<K>>> {
        let segments = [K::KIND.collection()];
        let query = [CHANGES, ("load_balancer_id", load_balancer_id)];
        let response = self.call("list", Method::GET, &segments, &query, None).await?;
        unwrap_envelope(response, K::KIND.collection(), K::KIND.collection())
    }

    async fn create(&self, desired: &Desired<K>) -> ApiResult<Snapshot<K>> {
        let segments = [K::KIND.collection()];
        let body = Self::body(&segments, desired)?;
        self.call_single("create", Method::POST, &segments, &[], Some(body)).await
    }

    async fn update(&self, id: &str, delta: &AttributeDelta) -> ApiResult<Snapshot<K>> {
        let segments = Self::item(id);
        let body = Self::body(&segments, delta)?;
        self.call_single("update", Method::PUT, &segments, &[], Some(body)).await
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.call("delete", Method::DELETE, &Self::item(id), &[], None).await?;
        Ok(())
    }

    async fn create_staged(&self, id: &str, patch: &PatchOf<K>) -> ApiResult<Snapshot<K>> {
        let segments = Self::staged(id);
        let body = Self::body(&segments, patch)?;
        self.call_single("create_staged", Method::POST, &segments, &[], Some(body)).await
    }

    async fn update_staged(&self, id: &str, patch: &PatchOf<K>) -> ApiResult<Snapshot<K>> {
        let segments = Self::staged(id);
        let body = Self::body(&segments, patch)?;
        self.call_single("update_staged", Method::PATCH, &segments, &[], Some(body)).await
    }

    async fn cancel_staged(&self, id: &str) -> ApiResult<()> {
        self.call("cancel_staged", Method::DELETE, &Self::staged(id), &[], None).await?;
        Ok(())
    }
}

/// `LoadBalancerActions` over HTTP.
#[derive(Clone)]
pub struct HttpActions {
    transport: HttpTransport,
}

impl HttpActions {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl LoadBalancerActions for HttpActions {
    async fn action(&self, load_balancer_id: &str, request: &ActionRequest) -> ApiResult<OperationHandle> {
        let segments = [Kind::LoadBalancer.collection(), load_balancer_id, "action"];
        let body = serde_json::to_value(request).map_err(|source| ApiError::Decode {
            path: segments.join("/"),
            source,
        })?;

        let result = self
            .transport
            .request(Method::POST, &segments, &[], Some(&body))
            .await;
        metrics::record_api_call(LoadBalancer::KIND, "action", &result);
        result?;

        Ok(OperationHandle {
            load_balancer_id: load_balancer_id.to_string(),
            request: request.clone(),
        })
    }

    async fn show_system_update(&self, id: &str) -> ApiResult<SystemUpdate> {
        let segments = ["system_updates", id];
        let result = self.transport.request(Method::GET, &segments, &[], None).await;
        metrics::record_api_call(LoadBalancer::KIND, "show_system_update", &result);
        unwrap_envelope(result?, "system_update", &segments.join("/"))
    }
}
