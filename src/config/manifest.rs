//! # Manifest Model
//!
//! The subset of a Serverless-style `serverless.yml` that ssm-seed reads.
//! Every section is optional; anything else in the document is ignored.
//!
//! ```yaml
//! provider:
//!   stage: dev
//!   region: eu-west-1
//!   environment:
//!     DB_PASSWORD: ${ssm:/dev/DB_PASSWORD~true}
//!     LOG_LEVEL: info
//! custom:
//!   ssm:
//!     secure:
//!       - DB_PASSWORD
//!     ignore:
//!       - LEGACY_TOKEN
//!     stages:
//!       - dev
//!       - prod
//! ```

use crate::error::ManifestError;
use crate::reconciler::DeclaredEnvironment;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Root of the deployment manifest
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Manifest {
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub custom: CustomSection,
}

/// `provider:` section
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ProviderSection {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Raw declared values; scalars are stringified by [`Manifest::declared_environment`]
    #[serde(default)]
    pub environment: Option<BTreeMap<String, Value>>,
}

/// `custom:` section
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CustomSection {
    #[serde(default)]
    pub ssm: Option<SsmSection>,
}

/// `custom.ssm:` section
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SsmSection {
    #[serde(default)]
    pub secure: Option<SecureKeys>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub ignore: Option<Vec<String>>,
    /// `None` when the key is absent, which allows every stage
    #[serde(default, deserialize_with = "one_or_many")]
    pub stages: Option<Vec<String>>,
}

/// A key list written as a bare string (`stages: prod`)
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }),
    )
}

/// `custom.ssm.secure` is written as a list of key names, a mapping of key
/// name to flag, or a single key name
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SecureKeys {
    List(Vec<String>),
    Flags(BTreeMap<String, Value>),
    Single(String),
}

impl SecureKeys {
    /// Key names classified as secure
    #[must_use]
    pub fn to_set(&self) -> BTreeSet<String> {
        match self {
            SecureKeys::List(keys) => keys.iter().cloned().collect(),
            SecureKeys::Single(key) => BTreeSet::from([key.clone()]),
            SecureKeys::Flags(flags) => flags
                .iter()
                .filter(|(_, flag)| is_truthy(flag))
                .map(|(key, _)| key.clone())
                .collect(),
        }
    }
}

impl Manifest {
    /// Parse a manifest document
    ///
    /// An empty or `null` document yields the default (empty) manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Yaml`] if the document is not valid YAML or
    /// does not fit the manifest shape.
    pub fn from_yaml_str(content: &str) -> Result<Self, ManifestError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let manifest: Option<Self> = serde_yaml::from_str(content)?;
        Ok(manifest.unwrap_or_default())
    }

    /// `provider.environment` with every value rendered as a string
    ///
    /// Numbers and booleans are stringified. Nulls and structured values
    /// (sequences, mappings, tagged intrinsics such as `!Ref`) become the
    /// empty string, which never matches a reference expression.
    #[must_use]
    pub fn declared_environment(&self) -> DeclaredEnvironment {
        self.provider
            .environment
            .as_ref()
            .map(|environment| {
                environment
                    .iter()
                    .map(|(key, value)| (key.clone(), scalar_to_string(value)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `custom.ssm`, or an empty section when absent
    #[must_use]
    pub fn ssm(&self) -> SsmSection {
        self.custom.ssm.clone().unwrap_or_default()
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => String::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => true,
    }
}
