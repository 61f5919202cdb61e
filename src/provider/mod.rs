//! # Provider Modules
//!
//! Parameter stores that seeded values are written to.
//!
//! - `aws`: AWS Systems Manager Parameter Store
//! - `memory`: in-process store used by `--dry-run` and tests

use crate::error::ParameterStoreError;
use crate::reconciler::UpsertRequest;
use async_trait::async_trait;

/// Provider trait for remote parameter stores
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Write the parameter described by `request`
    ///
    /// With `overwrite_existing == false` an existing parameter must be
    /// reported as [`ParameterStoreError::AlreadyExists`], never replaced.
    async fn put_parameter(&self, request: &UpsertRequest) -> Result<(), ParameterStoreError>;

    /// Short store name used as a metrics label
    fn name(&self) -> &'static str;
}

pub mod aws;
pub mod memory;

pub use aws::AwsParameterStore;
pub use memory::InMemoryParameterStore;
