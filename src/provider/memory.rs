//! # In-Memory Parameter Store
//!
//! First-write-wins store kept in process memory. Backs `--dry-run` and the
//! test suite; behaves like Parameter Store with `Overwrite=false`.

use crate::error::ParameterStoreError;
use crate::provider::ParameterStore;
use crate::reconciler::{Classification, UpsertRequest};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::info;

/// A stored parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredParameter {
    pub value: String,
    pub classification: Classification,
    pub description: String,
}

/// In-process parameter store
#[derive(Debug, Default)]
pub struct InMemoryParameterStore {
    parameters: RwLock<BTreeMap<String, StoredParameter>>,
}

impl InMemoryParameterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `(path, value)` pairs as plain parameters
    #[must_use]
    pub fn with_parameters<I, K, V>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let parameters = parameters
            .into_iter()
            .map(|(path, value)| {
                let path = path.into();
                let stored = StoredParameter {
                    value: value.into(),
                    classification: Classification::Plain,
                    description: path.clone(),
                };
                (path, stored)
            })
            .collect();
        Self {
            parameters: RwLock::new(parameters),
        }
    }

    pub async fn get(&self, path: &str) -> Option<StoredParameter> {
        self.parameters.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.parameters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.parameters.read().await.is_empty()
    }

    /// Copy of everything stored, keyed by path
    pub async fn snapshot(&self) -> BTreeMap<String, StoredParameter> {
        self.parameters.read().await.clone()
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn put_parameter(&self, request: &UpsertRequest) -> Result<(), ParameterStoreError> {
        let mut parameters = self.parameters.write().await;
        if parameters.contains_key(&request.path) && !request.overwrite_existing {
            return Err(ParameterStoreError::AlreadyExists {
                path: request.path.clone(),
            });
        }

        info!(
            "[in-memory] {} {} ({})",
            if parameters.contains_key(&request.path) {
                "Overwriting"
            } else {
                "Creating"
            },
            request.path,
            request.classification
        );
        parameters.insert(
            request.path.clone(),
            StoredParameter {
                value: request.value.clone(),
                classification: request.classification,
                description: request.description.clone(),
            },
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
