//! Belay Core - foundational types for the belay apply/wait engine
//!
//! This crate provides the cluster-agnostic half of belay:
//! - `ResourceCoordinate`: identity of one remote object
//! - `FieldPath`: relaxed field-path parsing and evaluation over JSON documents
//! - `WaitPolicy` / `WaitCondition`: how long and how often remote state is re-checked
//! - `CoreError`: error types

pub mod coordinate;
pub mod error;
pub mod fieldpath;
pub mod wait;

pub use coordinate::ResourceCoordinate;
pub use error::{CoreError, Result};
pub use fieldpath::{FieldPath, PathSegment};
pub use wait::{CompiledCondition, WaitCondition, WaitPolicy};
