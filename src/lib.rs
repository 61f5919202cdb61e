//! ssm-seed Library
//!
//! Seeds a parameter store from the environment declared in a deployment
//! manifest. The binary in `main.rs` is a thin wrapper around [`cli`].
//! Tests are included in the module files (e.g., `reconciler/mod.rs`).

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod policy;
pub mod provider;
pub mod reconciler;
pub mod reference;

pub use config::{load_manifest, Manifest, ManifestLoad, ManifestSource};
pub use error::{ManifestError, ParameterStoreError, PolicyError};
pub use policy::{ResolutionContext, SyncPolicy};
pub use provider::{AwsParameterStore, InMemoryParameterStore, ParameterStore};
pub use reconciler::{
    reconcile, Classification, DeclaredEnvironment, Outcome, Reconciler, RunReport, SkipReason,
    UpsertRequest,
};
pub use reference::ReferencePattern;
