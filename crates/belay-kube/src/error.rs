//! Error types for belay-kube

use std::time::Duration;

use thiserror::Error;

use belay_core::CoreError;

/// Errors surfaced by the remote-object client capability
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The object does not exist on the remote cluster
    #[error("object not found")]
    NotFound,

    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Payload could not be serialized or deserialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport-level failure reaching the remote store
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    /// Check if this is a not-found response (including a Kubernetes 404)
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::NotFound => true,
            ClientError::Api(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }
}

/// Errors from the apply-and-wait path
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApplyError {
    /// A wait condition failed to parse; nothing was sent to the cluster
    #[error("invalid wait condition '{expression}': {message}")]
    InvalidWaitCondition { expression: String, message: String },

    /// The server-side apply call itself failed; no wait was attempted
    #[error("server-side apply failed: {0}")]
    PatchFailed(#[source] ClientError),

    /// The apply succeeded but a condition never became true in budget.
    /// The remote object is left as applied, possibly still reconciling.
    #[error("applied, but '{path}' did not become ready within {timeout:?}")]
    WaitTimeout { path: String, timeout: Duration },

    /// The caller cancelled the operation mid-wait
    #[error("operation cancelled")]
    Cancelled,
}

impl From<CoreError> for ApplyError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::MalformedFieldPath {
                expression,
                message,
            } => ApplyError::InvalidWaitCondition {
                expression,
                message,
            },
        }
    }
}

/// Errors from the delete-and-wait path
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeleteError {
    /// The delete call failed for a reason other than not-found
    #[error("delete failed: {0}")]
    DeleteFailed(#[source] ClientError),

    /// The object was still present when the wait budget ran out
    #[error("deleted, but object was still present after {timeout:?}")]
    WaitTimeoutExceeded { timeout: Duration },

    /// The caller cancelled the operation mid-wait
    #[error("operation cancelled")]
    Cancelled,
}
