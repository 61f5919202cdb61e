//! Common test utilities for ssm-seed integration tests
//!
//! Provides a recording parameter store and builders for declared
//! environments and resolution contexts.

#![allow(dead_code, reason = "Each test binary uses a different subset")]

use async_trait::async_trait;
use ssm_seed::error::ParameterStoreError;
use ssm_seed::provider::ParameterStore;
use ssm_seed::reconciler::{DeclaredEnvironment, UpsertRequest};
use ssm_seed::ResolutionContext;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// Store that records every request and fails the keys it is told to
#[derive(Debug, Default)]
pub struct RecordingStore {
    requests: Mutex<Vec<UpsertRequest>>,
    failing_keys: BTreeSet<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests for these keys fail with a request error
    pub fn failing(keys: &[&str]) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failing_keys: keys.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// Recorded requests, ordered by key
    pub fn requests(&self) -> Vec<UpsertRequest> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort_by(|a, b| a.key.cmp(&b.key));
        requests
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ParameterStore for RecordingStore {
    async fn put_parameter(&self, request: &UpsertRequest) -> Result<(), ParameterStoreError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing_keys.contains(&request.key) {
            return Err(ParameterStoreError::Request(format!(
                "AccessDeniedException: not authorized to put {}",
                request.path
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn declared(pairs: &[(&str, &str)]) -> DeclaredEnvironment {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

pub fn context(stage: &str, env: &[(&str, &str)]) -> ResolutionContext {
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    ResolutionContext::new(stage, env).unwrap()
}
