//! # AWS Providers
//!
//! - `parameter_store`: Systems Manager Parameter Store client

pub mod parameter_store;

pub use parameter_store::AwsParameterStore;
