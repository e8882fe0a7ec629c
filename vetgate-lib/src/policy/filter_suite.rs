use crate::Result;
use camino::Utf8Path;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use strum::Display;

const LOG_TARGET: &str = "    policy";

/// A legacy collection of filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSuite {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub filters: Vec<Filter>,
}

/// A legacy filter, semantically a rule without an enclosing policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Filter {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub description: String,

    pub value: String,

    #[serde(default)]
    pub check_type: CheckType,

    #[serde(default)]
    pub references: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Filter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// Legacy classification of a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum CheckType {
    #[serde(rename = "CheckTypeVulnerability", alias = "vulnerability")]
    #[strum(serialize = "vulnerability")]
    Vulnerability,

    #[serde(rename = "CheckTypeMalware", alias = "malware")]
    #[strum(serialize = "malware")]
    Malware,

    #[serde(rename = "CheckTypePopularity", alias = "popularity")]
    #[strum(serialize = "popularity")]
    Popularity,

    #[serde(rename = "CheckTypeMaintenance", alias = "maintenance")]
    #[strum(serialize = "maintenance")]
    Maintenance,

    #[serde(rename = "CheckTypeSecurityScorecard", alias = "scorecard")]
    #[strum(serialize = "scorecard")]
    SecurityScorecard,

    #[serde(rename = "CheckTypeLicense", alias = "license")]
    #[strum(serialize = "license")]
    License,

    #[serde(rename = "CheckTypeOther", alias = "other")]
    #[strum(serialize = "other")]
    Other,

    #[default]
    #[serde(rename = "CheckTypeUnknown", other)]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl FilterSuite {
    /// Parse a filter suite from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or contains fields the schema does not know about
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| app_err!("parsing filter suite: {e}"))
    }

    /// Load a filter suite from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is not a valid filter suite
    pub fn load(path: &Utf8Path) -> Result<Self> {
        log::debug!(target: LOG_TARGET, "Loading filter suite from '{path}'");

        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading filter suite file '{path}'"))?;
        serde_yaml::from_str(&text).map_err(|e| app_err!("parsing filter suite file '{path}': {e}"))
    }
}
