//! Belay Kube - cluster-facing half of the belay apply/wait engine
//!
//! This crate provides:
//! - **RemoteClient**: the capability a remote object store must offer
//!   (`get`, `apply_patch`, `delete`), with a kube-backed implementation
//!   over dynamically-typed objects
//! - **SyncEngine**: the apply-and-wait / delete-and-wait orchestrators
//! - **Poll loop**: one shared, tested wait state machine used by both
//! - **MockRemoteClient**: in-memory client for tests, with operation
//!   counters for asserting exactly how many remote calls were made

pub mod client;
pub mod error;
pub mod mock;
pub mod sync;
pub mod waiter;

pub use client::{
    ApplyOptions, DEFAULT_FIELD_MANAGER, DeletePropagation, DynamicRemoteClient, RemoteClient,
};
pub use error::{ApplyError, ClientError, DeleteError};
pub use mock::{MockRemoteClient, OperationCounts};
pub use sync::SyncEngine;
pub use waiter::{PollOutcome, wait_until};
