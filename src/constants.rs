//! # Constants
//!
//! Shared constants used throughout ssm-seed.
//!
//! These values represent reasonable defaults and can be overridden via
//! CLI flags or the deployment manifest where applicable.

/// Manifest file read when `--config` is not given (relative to the working directory)
pub const DEFAULT_MANIFEST_FILE: &str = "serverless.yml";

/// Prefix marking a declared environment value as a Parameter Store reference
pub const DEFAULT_REFERENCE_PREFIX: &str = "${ssm:";

/// Stage used when neither the CLI nor the manifest names one
/// Matches the Serverless Framework default
pub const DEFAULT_STAGE: &str = "dev";

/// Default number of `PutParameter` calls allowed in flight at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default `tracing` filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "ssm_seed=info";

/// Default `tracing` filter with `--verbose`
pub const VERBOSE_LOG_FILTER: &str = "ssm_seed=debug";
