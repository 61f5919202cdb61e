//! # Sync Policy
//!
//! Inputs that shape a run besides the declared environment:
//! - [`SyncPolicy`]: ignore list, secure keys, allowed stages, default value
//! - [`ResolutionContext`]: current stage and a snapshot of the process environment

use crate::config::Manifest;
use crate::error::PolicyError;
use std::collections::{BTreeSet, HashMap};

/// Filtering and classification rules for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPolicy {
    pub ignore_keys: BTreeSet<String>,
    pub secure_keys: BTreeSet<String>,
    /// Empty allows every stage
    pub allowed_stages: Vec<String>,
    /// Used for every actionable key when set and non-empty
    pub default_value: Option<String>,
}

impl SyncPolicy {
    /// Build the policy from `custom.ssm` plus the CLI default override
    #[must_use]
    pub fn from_manifest(manifest: &Manifest, default_value: Option<String>) -> Self {
        let ssm = manifest.ssm();
        Self {
            ignore_keys: ssm.ignore.unwrap_or_default().into_iter().collect(),
            secure_keys: ssm.secure.map(|s| s.to_set()).unwrap_or_default(),
            allowed_stages: ssm.stages.unwrap_or_default(),
            default_value,
        }
    }

    /// True when `stage` passes the stage gate
    #[must_use]
    pub fn allows_stage(&self, stage: &str) -> bool {
        self.allowed_stages.is_empty() || self.allowed_stages.iter().any(|s| s == stage)
    }

    #[must_use]
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignore_keys.contains(key)
    }

    #[must_use]
    pub fn is_secure(&self, key: &str) -> bool {
        self.secure_keys.contains(key)
    }

    /// The default value, if one was given and it is non-empty
    #[must_use]
    pub fn effective_default(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Stage and environment that values are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    stage: String,
    process_env: HashMap<String, String>,
}

impl ResolutionContext {
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyStage`] if `stage` is empty or whitespace.
    pub fn new(
        stage: impl Into<String>,
        process_env: HashMap<String, String>,
    ) -> Result<Self, PolicyError> {
        let stage = stage.into();
        if stage.trim().is_empty() {
            return Err(PolicyError::EmptyStage);
        }
        Ok(Self { stage, process_env })
    }

    /// Snapshot the current process environment
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyStage`] if `stage` is empty or whitespace.
    pub fn from_process(stage: impl Into<String>) -> Result<Self, PolicyError> {
        Self::new(stage, std::env::vars().collect())
    }

    #[must_use]
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Non-empty environment value for `key`
    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.process_env
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(yaml: &str) -> Manifest {
        Manifest::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_policy_from_manifest() {
        let m = manifest(
            r"
custom:
  ssm:
    secure: [DB_PASSWORD]
    ignore: [LEGACY]
    stages: [dev, prod]
",
        );
        let policy = SyncPolicy::from_manifest(&m, Some("fallback".to_string()));
        assert!(policy.is_secure("DB_PASSWORD"));
        assert!(!policy.is_secure("LEGACY"));
        assert!(policy.is_ignored("LEGACY"));
        assert_eq!(policy.allowed_stages, vec!["dev", "prod"]);
        assert_eq!(policy.effective_default(), Some("fallback"));
    }

    #[test]
    fn test_absent_stages_allow_everything() {
        let m = manifest("custom:\n  ssm:\n    ignore: [A]\n");
        let policy = SyncPolicy::from_manifest(&m, None);
        assert!(policy.allowed_stages.is_empty());
        assert!(policy.allows_stage("dev"));
        assert!(policy.allows_stage("anything"));

        let policy = SyncPolicy::from_manifest(&Manifest::default(), None);
        assert!(policy.allows_stage("prod"));
    }

    #[test]
    fn test_stage_gate() {
        let policy = SyncPolicy {
            allowed_stages: vec!["prod".to_string()],
            ..SyncPolicy::default()
        };
        assert!(policy.allows_stage("prod"));
        assert!(!policy.allows_stage("dev"));
        assert!(!policy.allows_stage("Prod"));
    }

    #[test]
    fn test_empty_default_is_ignored() {
        let policy = SyncPolicy {
            default_value: Some(String::new()),
            ..SyncPolicy::default()
        };
        assert_eq!(policy.effective_default(), None);
    }

    #[test]
    fn test_context_rejects_empty_stage() {
        assert_eq!(
            ResolutionContext::new("", HashMap::new()).unwrap_err(),
            PolicyError::EmptyStage
        );
        assert_eq!(
            ResolutionContext::new("  ", HashMap::new()).unwrap_err(),
            PolicyError::EmptyStage
        );
    }

    #[test]
    fn test_context_env_value_skips_empty() {
        let env = HashMap::from([
            ("FOO".to_string(), "bar".to_string()),
            ("EMPTY".to_string(), String::new()),
        ]);
        let ctx = ResolutionContext::new("dev", env).unwrap();
        assert_eq!(ctx.stage(), "dev");
        assert_eq!(ctx.env_value("FOO"), Some("bar"));
        assert_eq!(ctx.env_value("EMPTY"), None);
        assert_eq!(ctx.env_value("MISSING"), None);
    }
}
