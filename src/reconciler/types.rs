//! # Reconciler Types
//!
//! Requests sent to the parameter store and the per-key outcomes of a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Declared environment: variable name to declared value expression
pub type DeclaredEnvironment = BTreeMap<String, String>;

/// How the parameter is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Plain,
    /// Encrypted at rest by the store
    Secure,
}

impl Classification {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Plain => "plain",
            Classification::Secure => "secure",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single create-if-absent write
#[derive(Clone, PartialEq, Eq)]
pub struct UpsertRequest {
    pub key: String,
    /// `/<stage>/<key>`
    pub path: String,
    pub classification: Classification,
    pub value: String,
    pub description: String,
    /// Always false: the first write wins
    pub overwrite_existing: bool,
}

impl UpsertRequest {
    pub fn new(
        stage: &str,
        key: impl Into<String>,
        value: impl Into<String>,
        classification: Classification,
    ) -> Self {
        let key = key.into();
        Self {
            path: parameter_path(stage, &key),
            description: key.clone(),
            key,
            classification,
            value: value.into(),
            overwrite_existing: false,
        }
    }
}

// Values may be secrets, keep them out of logs
impl fmt::Debug for UpsertRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpsertRequest")
            .field("key", &self.key)
            .field("path", &self.path)
            .field("classification", &self.classification)
            .field("value", &"<redacted>")
            .field("description", &self.description)
            .field("overwrite_existing", &self.overwrite_existing)
            .finish()
    }
}

/// Parameter name for `key` under `stage`
#[must_use]
pub fn parameter_path(stage: &str, key: &str) -> String {
    format!("/{stage}/{key}")
}

/// Why a declared key was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Listed in `custom.ssm.ignore`
    Ignored,
    /// Declared value is a literal, not a store reference
    NotReference,
    /// No default and no environment value
    MissingValue,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Ignored => "ignored",
            SkipReason::NotReference => "not_reference",
            SkipReason::MissingValue => "missing_value",
        }
    }
}

/// The current stage is not in the allowed stage list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSkipped {
    pub stage: String,
    pub allowed_stages: Vec<String>,
}

/// Result for one key, or for the whole run when the stage gate closes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    StageSkipped(StageSkipped),
    Upserted {
        key: String,
        path: String,
        classification: Classification,
    },
    Skipped {
        key: String,
        reason: SkipReason,
    },
    Failed {
        key: String,
        message: String,
        /// The store already held a value; usually safe to ignore
        already_exists: bool,
    },
}

impl Outcome {
    /// Key this outcome belongs to; `None` for a stage skip
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Outcome::StageSkipped(_) => None,
            Outcome::Upserted { key, .. }
            | Outcome::Skipped { key, .. }
            | Outcome::Failed { key, .. } => Some(key),
        }
    }
}

/// Counts per outcome kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub upserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Everything that happened in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub stage: String,
    /// Not ordered by key; see [`RunReport::sorted`]
    pub outcomes: Vec<Outcome>,
}

impl RunReport {
    #[must_use]
    pub fn is_stage_skipped(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, Outcome::StageSkipped(_)))
    }

    /// Keys that were written
    #[must_use]
    pub fn upserted(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Upserted { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `(key, reason)` for every skipped key
    #[must_use]
    pub fn skipped(&self) -> Vec<(&str, SkipReason)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Skipped { key, reason } => Some((key.as_str(), *reason)),
                _ => None,
            })
            .collect()
    }

    /// `(key, message)` for every failed key
    #[must_use]
    pub fn failed(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Failed { key, message, .. } => Some((key.as_str(), message.as_str())),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// Failures other than "already exists"
    #[must_use]
    pub fn has_unexpected_failures(&self) -> bool {
        self.outcomes.iter().any(|o| {
            matches!(
                o,
                Outcome::Failed {
                    already_exists: false,
                    ..
                }
            )
        })
    }

    /// Outcome recorded for `key`
    #[must_use]
    pub fn outcome_for(&self, key: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.key() == Some(key))
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for outcome in &self.outcomes {
            match outcome {
                Outcome::Upserted { .. } => summary.upserted += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
                Outcome::Failed { .. } => summary.failed += 1,
                Outcome::StageSkipped(_) => {}
            }
        }
        summary
    }

    /// Copy of the report with outcomes ordered by key
    #[must_use]
    pub fn sorted(&self) -> Self {
        let mut outcomes = self.outcomes.clone();
        outcomes.sort_by(|a, b| a.key().cmp(&b.key()));
        Self {
            stage: self.stage.clone(),
            outcomes,
        }
    }
}
