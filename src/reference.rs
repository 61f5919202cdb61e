//! # Reference Expressions
//!
//! A declared environment value such as `${ssm:/dev/DB_PASSWORD}` tells the
//! deployment tool to read the variable from Parameter Store at deploy time.
//! Only keys declared this way need seeding; literal values are left alone.

use crate::constants::DEFAULT_REFERENCE_PREFIX;

/// Matches declared values that point at the parameter store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePattern {
    prefix: String,
}

impl ReferencePattern {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True if `expression` is non-empty and begins with the sentinel prefix
    #[must_use]
    pub fn matches(&self, expression: &str) -> bool {
        !expression.is_empty() && expression.starts_with(&self.prefix)
    }
}

impl Default for ReferencePattern {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_PREFIX)
    }
}
