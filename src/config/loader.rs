//! # Manifest Loader
//!
//! Reads the manifest from disk. A missing or unparsable manifest is not
//! fatal: the run degrades to an empty manifest, which leaves nothing to
//! seed. The degraded path is reported as [`ManifestSource::Fallback`].

use super::manifest::Manifest;
use crate::error::ManifestError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where the manifest in a [`ManifestLoad`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// Parsed from this file
    Loaded(PathBuf),
    /// The file could not be used; an empty manifest stands in
    Fallback { path: PathBuf, reason: String },
}

/// Result of [`load_manifest`]
#[derive(Debug, Clone)]
pub struct ManifestLoad {
    pub manifest: Manifest,
    pub source: ManifestSource,
}

impl ManifestLoad {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ManifestSource::Fallback { .. })
    }
}

/// Read and parse the manifest at `path`
///
/// # Errors
///
/// Returns [`ManifestError::Io`] if the file cannot be read and
/// [`ManifestError::Yaml`] if it cannot be parsed.
pub fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Manifest::from_yaml_str(&content)
}

/// Load the manifest, falling back to an empty one on any failure
pub fn load_manifest(path: &Path) -> ManifestLoad {
    match read_manifest(path) {
        Ok(manifest) => {
            debug!("Loaded manifest from {}", path.display());
            ManifestLoad {
                manifest,
                source: ManifestSource::Loaded(path.to_path_buf()),
            }
        }
        Err(e) => {
            warn!(
                "Could not load manifest {}, continuing with an empty environment: {}",
                path.display(),
                e
            );
            ManifestLoad {
                manifest: Manifest::default(),
                source: ManifestSource::Fallback {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            }
        }
    }
}
