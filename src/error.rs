//! # Errors
//!
//! Typed errors for the library surface. Binary plumbing wraps these in
//! `anyhow::Error` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or parse the deployment manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure reported by a [`ParameterStore`](crate::provider::ParameterStore)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterStoreError {
    /// The parameter exists and overwrite was not requested
    #[error("The parameter already exists. To overwrite this value, set the overwrite option in the request to true. ({path})")]
    AlreadyExists { path: String },
    /// Any other transport or service error
    #[error("{0}")]
    Request(String),
}

impl ParameterStoreError {
    /// Whether this error only says the parameter was already seeded
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ParameterStoreError::AlreadyExists { .. })
    }
}

/// Invalid policy or resolution context input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("stage must not be empty")]
    EmptyStage,
}
