use crate::Result;
use camino::Utf8Path;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use strum::Display;

const LOG_TARGET: &str = "    policy";

/// A named, versioned collection of rules with an allow/deny intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    #[serde(default)]
    pub version: PolicyVersion,

    #[serde(default)]
    pub target: PolicyTarget,

    #[serde(rename = "type", default)]
    pub policy_type: PolicyType,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Free-form metadata, never evaluated.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// One named boolean expression plus its classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// The expression evaluated against the policy input.
    pub value: String,

    /// Classification used for reporting, never affects evaluation.
    #[serde(default)]
    pub check: RuleCheck,
}

impl Rule {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_check(mut self, check: RuleCheck) -> Self {
        self.check = check;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PolicyVersion {
    #[serde(rename = "POLICY_VERSION_V2", alias = "v2", alias = "V2")]
    #[strum(serialize = "v2")]
    V2,

    #[default]
    #[serde(rename = "POLICY_VERSION_UNSPECIFIED", other)]
    #[strum(serialize = "unspecified")]
    Unspecified,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PolicyTarget {
    #[serde(rename = "POLICY_TARGET_VET", alias = "vet")]
    #[strum(serialize = "vet")]
    Vet,

    #[default]
    #[serde(rename = "POLICY_TARGET_UNSPECIFIED", other)]
    #[strum(serialize = "unspecified")]
    Unspecified,
}

/// Whether matching packages are explicitly allowed or denied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PolicyType {
    #[serde(rename = "POLICY_TYPE_ALLOW", alias = "allow")]
    #[strum(serialize = "allow")]
    Allow,

    #[serde(rename = "POLICY_TYPE_DENY", alias = "deny")]
    #[strum(serialize = "deny")]
    Deny,

    #[default]
    #[serde(rename = "POLICY_TYPE_UNSPECIFIED", other)]
    #[strum(serialize = "unspecified")]
    Unspecified,
}

/// The kind of check a rule performs.
///
/// Unknown or omitted values become [`RuleCheck::Unspecified`] rather than a
/// guessed check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum RuleCheck {
    #[serde(rename = "RULE_CHECK_VULNERABILITY", alias = "vulnerability")]
    #[strum(serialize = "vulnerability")]
    Vulnerability,

    #[serde(rename = "RULE_CHECK_LICENSE", alias = "license")]
    #[strum(serialize = "license")]
    License,

    #[serde(rename = "RULE_CHECK_POPULARITY", alias = "popularity")]
    #[strum(serialize = "popularity")]
    Popularity,

    #[serde(rename = "RULE_CHECK_MAINTENANCE", alias = "maintenance")]
    #[strum(serialize = "maintenance")]
    Maintenance,

    #[serde(rename = "RULE_CHECK_SCORECARD", alias = "scorecard")]
    #[strum(serialize = "scorecard")]
    Scorecard,

    #[serde(rename = "RULE_CHECK_MALWARE", alias = "malware")]
    #[strum(serialize = "malware")]
    Malware,

    #[serde(rename = "RULE_CHECK_OTHER", alias = "other")]
    #[strum(serialize = "other")]
    Other,

    #[default]
    #[serde(rename = "RULE_CHECK_UNSPECIFIED", other)]
    #[strum(serialize = "unspecified")]
    Unspecified,
}

impl Policy {
    /// Parse a policy from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML, contains fields the schema
    /// does not know about, or declares a rule with an empty expression
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let policy: Self = serde_yaml::from_str(text).map_err(|e| app_err!("parsing policy document: {e}"))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is not a valid policy
    pub fn load(path: &Utf8Path) -> Result<Self> {
        log::debug!(target: LOG_TARGET, "Loading policy from '{path}'");

        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading policy file '{path}'"))?;
        let policy: Self = serde_yaml::from_str(&text).map_err(|e| app_err!("parsing policy file '{path}': {e}"))?;
        policy.validate()?;

        log::debug!(target: LOG_TARGET, "Loaded policy '{}' with {} rule(s)", policy.name, policy.rules.len());
        Ok(policy)
    }

    fn validate(&self) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.value.trim().is_empty() {
                return Err(app_err!(
                    "rule #{} ('{}') of policy '{}' has an empty expression",
                    index + 1,
                    rule.name,
                    self.name
                ));
            }
        }

        Ok(())
    }
}
