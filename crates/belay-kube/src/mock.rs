//! Mock remote client for testing
//!
//! Stores objects in memory, useful for unit tests without a cluster.
//! Responses can be scripted per coordinate to simulate a controller
//! reconciling over several polls, and every call is counted so tests can
//! assert exactly how many remote operations an orchestrator issued.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use belay_core::ResourceCoordinate;

use crate::client::{ApplyOptions, DeletePropagation, RemoteClient};
use crate::error::ClientError;

/// Counts of remote operations performed, for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub patches: usize,
    pub deletes: usize,
}

/// In-memory remote client for testing
#[derive(Clone, Default)]
pub struct MockRemoteClient {
    /// Object store: coordinate -> current state
    store: Arc<RwLock<HashMap<String, Value>>>,
    /// Scripted responses, consumed before falling back to the store
    get_script: Arc<RwLock<HashMap<String, VecDeque<Result<Value, ClientError>>>>>,
    patch_script: Arc<RwLock<HashMap<String, VecDeque<Result<Value, ClientError>>>>>,
    delete_script: Arc<RwLock<HashMap<String, VecDeque<Result<(), ClientError>>>>>,
    operations: Arc<RwLock<OperationCounts>>,
}

impl MockRemoteClient {
    /// Create a new empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated objects
    pub fn with_objects(objects: Vec<(ResourceCoordinate, Value)>) -> Self {
        let client = Self::new();
        {
            let mut store = client.store.write().unwrap();
            for (at, object) in objects {
                store.insert(at.to_string(), object);
            }
        }
        client
    }

    /// Put an object into the store
    pub fn insert(&self, at: &ResourceCoordinate, object: Value) {
        self.store.write().unwrap().insert(at.to_string(), object);
    }

    /// Whether the store currently holds an object at `at`
    pub fn contains(&self, at: &ResourceCoordinate) -> bool {
        self.store.read().unwrap().contains_key(&at.to_string())
    }

    /// Queue one `get` response for `at`, served before the store
    pub fn script_get(&self, at: &ResourceCoordinate, response: Result<Value, ClientError>) {
        self.get_script
            .write()
            .unwrap()
            .entry(at.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queue one `apply_patch` response for `at`
    pub fn script_patch(&self, at: &ResourceCoordinate, response: Result<Value, ClientError>) {
        self.patch_script
            .write()
            .unwrap()
            .entry(at.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queue one `delete` response for `at`
    pub fn script_delete(&self, at: &ResourceCoordinate, response: Result<(), ClientError>) {
        self.delete_script
            .write()
            .unwrap()
            .entry(at.to_string())
            .or_default()
            .push_back(response);
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        let mut ops = self.operations.write().unwrap();
        *ops = OperationCounts::default();
    }

    fn pop_script<T>(
        script: &Arc<RwLock<HashMap<String, VecDeque<Result<T, ClientError>>>>>,
        key: &str,
    ) -> Option<Result<T, ClientError>> {
        script
            .write()
            .unwrap()
            .get_mut(key)
            .and_then(|queue| queue.pop_front())
    }
}

#[async_trait]
impl RemoteClient for MockRemoteClient {
    async fn get(&self, at: &ResourceCoordinate) -> Result<Value, ClientError> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.gets += 1;
        }

        let key = at.to_string();
        if let Some(scripted) = Self::pop_script(&self.get_script, &key) {
            return scripted;
        }

        self.store
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(ClientError::NotFound)
    }

    async fn apply_patch(
        &self,
        at: &ResourceCoordinate,
        body: &[u8],
        _options: &ApplyOptions,
    ) -> Result<Value, ClientError> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.patches += 1;
        }

        let key = at.to_string();
        if let Some(scripted) = Self::pop_script(&self.patch_script, &key) {
            if let Ok(object) = &scripted {
                self.store.write().unwrap().insert(key, object.clone());
            }
            return scripted;
        }

        let object: Value =
            serde_json::from_slice(body).map_err(|e| ClientError::Serialization(e.to_string()))?;
        self.store.write().unwrap().insert(key, object.clone());
        Ok(object)
    }

    async fn delete(
        &self,
        at: &ResourceCoordinate,
        _propagation: Option<DeletePropagation>,
    ) -> Result<(), ClientError> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.deletes += 1;
        }

        let key = at.to_string();
        if let Some(scripted) = Self::pop_script(&self.delete_script, &key) {
            if scripted.is_ok() {
                self.store.write().unwrap().remove(&key);
            }
            return scripted;
        }

        self.store
            .write()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or(ClientError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coordinate(name: &str) -> ResourceCoordinate {
        ResourceCoordinate::namespaced("apps", "v1", "Deployment", "default", name)
    }

    #[tokio::test]
    async fn test_mock_patch_then_get() {
        let client = MockRemoteClient::new();
        let at = coordinate("web");
        let doc = json!({"apiVersion": "apps/v1", "kind": "Deployment", "metadata": {"name": "web"}});

        let applied = client
            .apply_patch(&at, &serde_json::to_vec(&doc).unwrap(), &ApplyOptions::default())
            .await
            .unwrap();
        assert_eq!(applied, doc);

        let fetched = client.get(&at).await.unwrap();
        assert_eq!(fetched, doc);

        let counts = client.operation_counts();
        assert_eq!(counts.patches, 1);
        assert_eq!(counts.gets, 1);
    }

    #[tokio::test]
    async fn test_mock_get_not_found() {
        let client = MockRemoteClient::new();
        let result = client.get(&coordinate("missing")).await;
        assert!(matches!(result, Err(ClientError::NotFound)));
    }

    #[tokio::test]
    async fn test_mock_delete_removes_object() {
        let at = coordinate("web");
        let client = MockRemoteClient::with_objects(vec![(at.clone(), json!({"kind": "Deployment"}))]);

        client.delete(&at, None).await.unwrap();
        assert!(!client.contains(&at));

        let again = client.delete(&at, None).await;
        assert!(matches!(again, Err(ClientError::NotFound)));
    }

    #[tokio::test]
    async fn test_mock_scripted_gets_served_in_order() {
        let client = MockRemoteClient::new();
        let at = coordinate("web");
        client.insert(&at, json!({"status": {"phase": "Ready"}}));

        client.script_get(&at, Ok(json!({"status": {"phase": "Pending"}})));
        client.script_get(&at, Err(ClientError::Unavailable("blip".to_string())));

        let first = client.get(&at).await.unwrap();
        assert_eq!(first["status"]["phase"], "Pending");

        let second = client.get(&at).await;
        assert!(matches!(second, Err(ClientError::Unavailable(_))));

        // Script drained: falls back to the store
        let third = client.get(&at).await.unwrap();
        assert_eq!(third["status"]["phase"], "Ready");
    }

    #[tokio::test]
    async fn test_mock_scripted_patch_failure() {
        let client = MockRemoteClient::new();
        let at = coordinate("web");
        client.script_patch(&at, Err(ClientError::Unavailable("conflict".to_string())));

        let result = client
            .apply_patch(&at, b"{}", &ApplyOptions::default())
            .await;
        assert!(matches!(result, Err(ClientError::Unavailable(_))));
        assert!(!client.contains(&at));
    }

    #[tokio::test]
    async fn test_mock_reset_counts() {
        let client = MockRemoteClient::new();
        let _ = client.get(&coordinate("web")).await;
        assert_eq!(client.operation_counts().gets, 1);

        client.reset_counts();
        assert_eq!(client.operation_counts(), OperationCounts::default());
    }
}
