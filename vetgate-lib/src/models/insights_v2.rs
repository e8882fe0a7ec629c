//! Insight data consumed by policy evaluation

use super::SeverityType;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// Enriched package data attached by the insights service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageVersionInsightV2 {
    #[serde(default)]
    pub licenses: Vec<LicenseMeta>,

    #[serde(default)]
    pub vulnerabilities: Vec<VulnerabilityV2>,

    #[serde(default)]
    pub project_insights: Vec<ProjectInsight>,
}

/// A license detected for a package version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseMeta {
    /// SPDX identifier or expression, e.g. `MIT OR Apache-2.0`.
    #[serde(default)]
    pub license_id: String,

    #[serde(default)]
    pub name: String,
}

impl LicenseMeta {
    #[must_use]
    pub fn new(license_id: impl Into<String>) -> Self {
        Self {
            license_id: license_id.into(),
            name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityV2 {
    pub id: String,

    /// Identifiers of the same vulnerability in other databases (CVE, GHSA, ...).
    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub severities: Vec<SeverityV2>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityV2 {
    #[serde(rename = "type", default)]
    pub kind: SeverityType,

    /// Numeric score as published, usually a CVSS base score such as `9.8`.
    #[serde(default)]
    pub score: String,

    #[serde(default)]
    pub risk: Risk,
}

/// Risk classification of a vulnerability severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Risk {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// Popularity and activity data of a source project backing a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInsight {
    pub name: Option<String>,
    pub url: Option<String>,

    #[serde(rename = "type", default)]
    pub source_type: ProjectSourceType,

    pub stars: Option<i64>,
    pub forks: Option<i64>,
    pub issues: Option<i64>,
    pub contributors: Option<i64>,
}

/// Ecosystem codes exposed to policy expressions through the `Ecosystem` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[repr(i32)]
pub enum PolicyEcosystem {
    #[default]
    #[strum(serialize = "ECOSYSTEM_UNSPECIFIED")]
    Unspecified = 0,
    #[strum(serialize = "ECOSYSTEM_MAVEN")]
    Maven = 1,
    #[strum(serialize = "ECOSYSTEM_NPM")]
    Npm = 2,
    #[strum(serialize = "ECOSYSTEM_PYPI")]
    PyPI = 3,
    #[strum(serialize = "ECOSYSTEM_GO")]
    Go = 4,
    #[strum(serialize = "ECOSYSTEM_RUBYGEMS")]
    RubyGems = 5,
    #[strum(serialize = "ECOSYSTEM_CARGO")]
    Cargo = 6,
    #[strum(serialize = "ECOSYSTEM_NUGET")]
    NuGet = 7,
    #[strum(serialize = "ECOSYSTEM_PACKAGIST")]
    Packagist = 8,
    #[strum(serialize = "ECOSYSTEM_GITHUB_ACTIONS")]
    GitHubActions = 9,
    #[strum(serialize = "ECOSYSTEM_TERRAFORM")]
    Terraform = 10,
    #[strum(serialize = "ECOSYSTEM_TERRAFORM_MODULE")]
    TerraformModule = 11,
    #[strum(serialize = "ECOSYSTEM_TERRAFORM_PROVIDER")]
    TerraformProvider = 12,
}

impl PolicyEcosystem {
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }
}

/// Hosting service of a source project, exposed through the `ProjectSourceType` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr)]
#[repr(i32)]
pub enum ProjectSourceType {
    #[serde(rename = "GITHUB", alias = "PROJECT_SOURCE_TYPE_GITHUB")]
    #[strum(serialize = "PROJECT_SOURCE_TYPE_GITHUB")]
    GitHub = 1,
    #[serde(rename = "GITLAB", alias = "PROJECT_SOURCE_TYPE_GITLAB")]
    #[strum(serialize = "PROJECT_SOURCE_TYPE_GITLAB")]
    GitLab = 2,
    #[serde(rename = "BITBUCKET", alias = "PROJECT_SOURCE_TYPE_BITBUCKET")]
    #[strum(serialize = "PROJECT_SOURCE_TYPE_BITBUCKET")]
    Bitbucket = 3,
    #[default]
    #[serde(rename = "UNSPECIFIED", other)]
    #[strum(serialize = "PROJECT_SOURCE_TYPE_UNSPECIFIED")]
    Unspecified = 0,
}

impl ProjectSourceType {
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }
}
