use crate::models::{Package, ProjectInfo, SeverityRisk, SeverityType, Vulnerability};
use serde::Serialize;
use std::collections::BTreeMap;

/// The document legacy filters are evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterInput {
    pub pkg: FilterPackage,
    pub projects: Vec<FilterProject>,
    pub vulns: FilterVulnerabilities,
    pub scorecard: FilterScorecard,
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterPackage {
    /// Lowercase ecosystem name, e.g. `npm` or `pypi`.
    pub ecosystem: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterProject {
    pub name: String,

    /// `GITHUB` or `UNKNOWN`.
    #[serde(rename = "type")]
    pub kind: String,
    pub stars: i64,
    pub forks: i64,
    pub issues: i64,
}

/// Vulnerabilities bucketed by risk. Every vulnerability is in `all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterVulnerabilities {
    pub all: Vec<FilterVulnerability>,
    pub critical: Vec<FilterVulnerability>,
    pub high: Vec<FilterVulnerability>,
    pub medium: Vec<FilterVulnerability>,
    pub low: Vec<FilterVulnerability>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterVulnerability {
    pub id: String,
    pub cve: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterScorecard {
    pub score: f64,
    pub scores: BTreeMap<String, f64>,
}

impl FilterInput {
    /// Project a package into the legacy filter input schema.
    ///
    /// Never fails, missing insight data renders as empty collections and zero scores.
    #[must_use]
    pub fn from_package(package: &Package) -> Self {
        let mut input = Self {
            pkg: FilterPackage {
                ecosystem: package.ecosystem().to_string().to_lowercase(),
                name: package.name().to_string(),
                version: package.version().to_string(),
            },
            ..Self::default()
        };

        let Some(insight) = &package.insights else {
            return input;
        };

        input.projects = insight.projects.iter().flatten().map(FilterProject::from).collect();
        input.licenses = insight.licenses.clone().unwrap_or_default();

        for vuln in insight.vulnerabilities.iter().flatten() {
            input.vulns.add(vuln);
        }

        if let Some(content) = insight.scorecard.as_ref().and_then(|s| s.content.as_ref()) {
            input.scorecard.score = content.score.unwrap_or_default();
            for check in content.checks.iter().flatten() {
                let _ = input
                    .scorecard
                    .scores
                    .insert(check.name.clone().unwrap_or_default(), check.score.unwrap_or_default());
            }
        }

        input
    }
}

impl FilterVulnerabilities {
    fn add(&mut self, vuln: &Vulnerability) {
        let entry = FilterVulnerability {
            id: vuln.id.clone().unwrap_or_default(),
            cve: vuln
                .aliases
                .iter()
                .flatten()
                .find(|alias| alias.get(..4).is_some_and(|prefix| prefix.eq_ignore_ascii_case("CVE-")))
                .cloned()
                .unwrap_or_default(),
        };

        // risk comes from the first CVSS severity, other scoring systems are ignored
        let risk = vuln
            .severities
            .iter()
            .flatten()
            .find(|sev| matches!(sev.kind, Some(SeverityType::CvssV3 | SeverityType::CvssV2)))
            .and_then(|sev| sev.risk)
            .unwrap_or_default();

        match risk {
            SeverityRisk::Critical => self.critical.push(entry.clone()),
            SeverityRisk::High => self.high.push(entry.clone()),
            SeverityRisk::Medium => self.medium.push(entry.clone()),
            SeverityRisk::Low => self.low.push(entry.clone()),
            SeverityRisk::Unknown => {}
        }

        self.all.push(entry);
    }
}

impl From<&ProjectInfo> for FilterProject {
    fn from(project: &ProjectInfo) -> Self {
        let kind = if project.kind.as_deref().is_some_and(|k| k.eq_ignore_ascii_case("github")) {
            "GITHUB"
        } else {
            "UNKNOWN"
        };

        Self {
            name: project.name.clone().unwrap_or_default(),
            kind: kind.to_string(),
            stars: project.stars.unwrap_or_default(),
            forks: project.forks.unwrap_or_default(),
            issues: project.issues.unwrap_or_default(),
        }
    }
}
