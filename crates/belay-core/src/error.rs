//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid field path '{expression}': {message}")]
    MalformedFieldPath { expression: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
