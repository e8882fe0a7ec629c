use crate::expr::{EngineError, EngineResult};
use crate::models::{LicenseMeta, Package, PolicyEcosystem, ProjectInsight, ProjectSourceType, VulnerabilityV2};
use serde::{Deserialize, Serialize};

/// The document policy rules are evaluated against.
///
/// Every field is always present, empty when the package carries no data for it,
/// except `manifest` which is omitted when the package has no manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyInput {
    pub package: PackageInput,
    pub project: ProjectInput,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageInput {
    /// Code from the `Ecosystem` table.
    pub ecosystem: i64,
    pub name: String,
    pub version: String,
    pub licenses: Vec<LicenseInput>,
    pub vulnerabilities: Vec<VulnerabilityInput>,
    pub projects: Vec<ProjectInsightInput>,
    pub attributes: AttributesInput,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LicenseInput {
    pub license_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VulnerabilityInput {
    pub id: String,

    /// First CVE alias, empty when there is none.
    pub cve_id: String,

    /// One of `CRITICAL`, `HIGH`, `MEDIUM`, `LOW`, `UNSPECIFIED`.
    pub severity: String,
    pub cvss_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectInsightInput {
    pub name: String,
    pub url: String,

    /// Code from the `ProjectSourceType` table.
    #[serde(rename = "type")]
    pub source_type: i64,
    pub stars: i64,
    pub forks: i64,
    pub issues: i64,
    pub contributors: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttributesInput {
    /// Whether the package is a direct dependency of the manifest.
    pub direct: bool,
}

/// The project consuming the packages being evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub url: String,

    /// Code from the `ProjectSourceType` table.
    #[serde(rename = "type", default)]
    pub source_type: i64,
}

impl ProjectInput {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, source_type: ProjectSourceType) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            source_type: source_type.code(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestInput {
    pub path: String,

    /// Code from the `Ecosystem` table.
    pub ecosystem: i64,
}

impl PolicyInput {
    /// Project a package into the policy input schema.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingInsights`] when the package carries no
    /// policy insight data.
    pub fn from_package(package: &Package, project: &ProjectInput) -> EngineResult<Self> {
        let insight = package.insights_v2.as_ref().ok_or_else(|| EngineError::MissingInsights {
            package: format!("{}/{}@{}", package.ecosystem(), package.name(), package.version()),
        })?;

        Ok(Self {
            package: PackageInput {
                ecosystem: package.ecosystem().policy_ecosystem().code(),
                name: package.name().to_string(),
                version: package.version().to_string(),
                licenses: insight.licenses.iter().map(LicenseInput::from).collect(),
                vulnerabilities: insight.vulnerabilities.iter().map(VulnerabilityInput::from).collect(),
                projects: insight.project_insights.iter().map(ProjectInsightInput::from).collect(),
                attributes: AttributesInput {
                    direct: package.is_direct(),
                },
            },
            project: project.clone(),
            manifest: package.manifest.as_ref().map(|manifest| ManifestInput {
                path: manifest.path.clone(),
                ecosystem: manifest.ecosystem.policy_ecosystem().code(),
            }),
        })
    }
}

impl ManifestInput {
    /// Stand-in bound to `manifest` when the package has no manifest.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            path: String::new(),
            ecosystem: PolicyEcosystem::Unspecified.code(),
        }
    }
}

impl From<&LicenseMeta> for LicenseInput {
    fn from(license: &LicenseMeta) -> Self {
        Self {
            license_id: license.license_id.clone(),
            name: license.name.clone(),
        }
    }
}

impl From<&VulnerabilityV2> for VulnerabilityInput {
    fn from(vuln: &VulnerabilityV2) -> Self {
        let cve_id = vuln
            .aliases
            .iter()
            .find(|alias| alias.get(..4).is_some_and(|prefix| prefix.eq_ignore_ascii_case("CVE-")))
            .cloned()
            .unwrap_or_default();

        let (severity, cvss_score) = vuln.severities.first().map_or_else(
            || (String::from("UNSPECIFIED"), 0.0),
            |sev| (sev.risk.to_string(), sev.score.trim().parse::<f64>().unwrap_or_default()),
        );

        Self {
            id: vuln.id.clone(),
            cve_id,
            severity,
            cvss_score,
        }
    }
}

impl From<&ProjectInsight> for ProjectInsightInput {
    fn from(project: &ProjectInsight) -> Self {
        Self {
            name: project.name.clone().unwrap_or_default(),
            url: project.url.clone().unwrap_or_default(),
            source_type: project.source_type.code(),
            stars: project.stars.unwrap_or_default(),
            forks: project.forks.unwrap_or_default(),
            issues: project.issues.unwrap_or_default(),
            contributors: project.contributors.unwrap_or_default(),
        }
    }
}
