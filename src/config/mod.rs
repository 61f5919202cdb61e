//! # Configuration
//!
//! Deployment manifest model and loader.
//!
//! - `manifest`: serde model of the manifest sections ssm-seed reads
//! - `loader`: file loading with the degrade-to-empty fallback

pub mod loader;
pub mod manifest;

pub use loader::{load_manifest, read_manifest, ManifestLoad, ManifestSource};
pub use manifest::{CustomSection, Manifest, ProviderSection, SecureKeys, SsmSection};
