//! Remote object client capability and its kube-backed implementation
//!
//! The engine never talks to a cluster directly; it goes through
//! [`RemoteClient`], a three-call capability (`get`, `apply_patch`,
//! `delete`) keyed by [`ResourceCoordinate`]. [`DynamicRemoteClient`] is the
//! production implementation over `Api<DynamicObject>` with Server-Side
//! Apply; tests use [`crate::mock::MockRemoteClient`].

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, DynamicObject, Patch, PatchParams, PropagationPolicy};
use kube::core::{ApiResource, GroupVersionKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use belay_core::ResourceCoordinate;

use crate::error::ClientError;

/// Field manager recorded for Server-Side Apply when the caller does not
/// override it
pub const DEFAULT_FIELD_MANAGER: &str = "belay";

/// Options forwarded verbatim to the server-side apply call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOptions {
    /// Field manager recorded for this apply
    pub field_manager: String,

    /// Take ownership of fields held by other managers
    #[serde(default)]
    pub force_conflicts: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
        }
    }
}

impl ApplyOptions {
    /// Options with a caller-chosen field manager
    pub fn new(field_manager: impl Into<String>) -> Self {
        Self {
            field_manager: field_manager.into(),
            force_conflicts: false,
        }
    }

    /// Take ownership of conflicting fields
    pub fn with_force_conflicts(mut self) -> Self {
        self.force_conflicts = true;
        self
    }
}

/// How dependents are handled when an object is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePropagation {
    /// Leave dependents in place (don't delete them)
    Orphan,

    /// Delete in background (default)
    #[default]
    Background,

    /// Delete in foreground (wait for dependents)
    Foreground,
}

impl DeletePropagation {
    fn as_policy(self) -> PropagationPolicy {
        match self {
            Self::Orphan => PropagationPolicy::Orphan,
            Self::Background => PropagationPolicy::Background,
            Self::Foreground => PropagationPolicy::Foreground,
        }
    }
}

impl std::fmt::Display for DeletePropagation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Orphan => write!(f, "orphan"),
            Self::Background => write!(f, "background"),
            Self::Foreground => write!(f, "foreground"),
        }
    }
}

impl std::str::FromStr for DeletePropagation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orphan" => Ok(Self::Orphan),
            "background" => Ok(Self::Background),
            "foreground" => Ok(Self::Foreground),
            _ => Err(format!("unknown deletion propagation: {}", s)),
        }
    }
}

/// Capability expected from a remote object store.
///
/// One client is constructed per session and shared by every orchestrator
/// invocation; implementations must be safe for concurrent use. The engine
/// adds no locking of its own.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch the current state of the object at `at`.
    /// `Err(ClientError::NotFound)` models absence.
    async fn get(&self, at: &ResourceCoordinate) -> Result<Value, ClientError>;

    /// Server-side apply `body` (a serialized JSON document) and return the
    /// server's resulting object
    async fn apply_patch(
        &self,
        at: &ResourceCoordinate,
        body: &[u8],
        options: &ApplyOptions,
    ) -> Result<Value, ClientError>;

    /// Delete the object at `at`. `Err(ClientError::NotFound)` when it was
    /// already gone.
    async fn delete(
        &self,
        at: &ResourceCoordinate,
        propagation: Option<DeletePropagation>,
    ) -> Result<(), ClientError>;
}

/// Kube-backed client over dynamically-typed objects.
///
/// The `ApiResource` is built straight from the coordinate's GVK; callers
/// whose kinds have irregular plurals can provide their own [`RemoteClient`]
/// implementation instead.
#[derive(Clone)]
pub struct DynamicRemoteClient {
    client: kube::Client,
}

impl DynamicRemoteClient {
    /// Wrap an existing Kubernetes client
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Connect using the ambient kubeconfig/in-cluster configuration
    pub async fn try_default() -> Result<Self, ClientError> {
        Ok(Self {
            client: kube::Client::try_default().await?,
        })
    }

    fn api_for(&self, at: &ResourceCoordinate) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(at.group(), at.version(), at.kind());
        let ar = ApiResource::from_gvk(&gvk);
        match at.namespace() {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }
}

#[async_trait]
impl RemoteClient for DynamicRemoteClient {
    async fn get(&self, at: &ResourceCoordinate) -> Result<Value, ClientError> {
        debug!(object = %at, "get");
        let api = self.api_for(at);
        match api.get_opt(at.name()).await? {
            Some(obj) => {
                serde_json::to_value(&obj).map_err(|e| ClientError::Serialization(e.to_string()))
            }
            None => Err(ClientError::NotFound),
        }
    }

    async fn apply_patch(
        &self,
        at: &ResourceCoordinate,
        body: &[u8],
        options: &ApplyOptions,
    ) -> Result<Value, ClientError> {
        debug!(object = %at, manager = %options.field_manager, force = options.force_conflicts, "server-side apply");
        let json: Value =
            serde_json::from_slice(body).map_err(|e| ClientError::Serialization(e.to_string()))?;

        let api = self.api_for(at);
        let mut params = PatchParams::apply(&options.field_manager);
        params.force = options.force_conflicts;

        let obj = api.patch(at.name(), &params, &Patch::Apply(&json)).await?;
        serde_json::to_value(&obj).map_err(|e| ClientError::Serialization(e.to_string()))
    }

    async fn delete(
        &self,
        at: &ResourceCoordinate,
        propagation: Option<DeletePropagation>,
    ) -> Result<(), ClientError> {
        debug!(object = %at, propagation = ?propagation, "delete");
        let api = self.api_for(at);
        let params = DeleteParams {
            propagation_policy: propagation.map(DeletePropagation::as_policy),
            ..Default::default()
        };

        match api.delete(at.name(), &params).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Err(ClientError::NotFound),
            Err(e) => Err(ClientError::Api(e)),
        }
    }
}
