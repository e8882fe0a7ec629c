//! Domain model consumed by the policy engine
//!
//! Manifests and packages arrive here already parsed and enriched by the
//! upstream scanner. The engine never mutates insight data, it only reads it
//! through the projectors in [`crate::input`].
//!
//! Two generations of insight data coexist:
//! - [`PackageVersionInsight`]: the legacy insight document read by filter suites
//! - [`PackageVersionInsightV2`]: the richer document required by policies

mod ecosystem;
mod insights;
mod insights_v2;
mod manifest;
mod package;

pub use ecosystem::Ecosystem;
pub use insights::{
    PackageVersionInsight, ProjectInfo, Scorecard, ScorecardCheck, ScorecardContent, Severity, SeverityRisk, SeverityType, Vulnerability,
};
pub use insights_v2::{
    LicenseMeta, PackageVersionInsightV2, PolicyEcosystem, ProjectInsight, ProjectSourceType, Risk, SeverityV2, VulnerabilityV2,
};
pub use manifest::{ManifestRef, PackageManifest};
pub use package::{Package, PackageDetails};
