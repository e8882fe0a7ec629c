//! Legacy insight data consumed by filter suites

use serde::{Deserialize, Serialize};
use strum::Display;

/// Legacy enrichment document for a package version.
///
/// Every field is optional because the legacy insights service omits
/// whatever it could not collect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageVersionInsight {
    pub licenses: Option<Vec<String>>,
    pub projects: Option<Vec<ProjectInfo>>,
    pub vulnerabilities: Option<Vec<Vulnerability>>,
    pub scorecard: Option<Scorecard>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: Option<String>,

    /// Hosting service, e.g. `github`.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub link: Option<String>,
    pub stars: Option<i64>,
    pub forks: Option<i64>,
    pub issues: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub aliases: Option<Vec<String>>,
    pub severities: Option<Vec<Severity>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Severity {
    #[serde(rename = "type")]
    pub kind: Option<SeverityType>,
    pub score: Option<String>,
    pub risk: Option<SeverityRisk>,
}

/// Scoring system a severity was computed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityType {
    CvssV2,
    CvssV3,
    CvssV4,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// Legacy risk levels, `UNKNOWN` when the service could not classify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityRisk {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub content: Option<ScorecardContent>,
}

/// `OpenSSF` scorecard results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorecardContent {
    pub score: Option<f64>,
    pub checks: Option<Vec<ScorecardCheck>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorecardCheck {
    pub name: Option<String>,
    pub score: Option<f64>,
}
