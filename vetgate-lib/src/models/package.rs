use super::{Ecosystem, ManifestRef, PackageVersionInsight, PackageVersionInsightV2};
use core::hash::Hasher;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Coordinates of a package version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageDetails {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: String,
}

impl PackageDetails {
    #[must_use]
    pub fn new(ecosystem: Ecosystem, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            ecosystem,
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A package found in a manifest, along with whatever insight data was attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    #[serde(rename = "package_detail")]
    pub details: PackageDetails,

    /// Depth in the dependency tree, zero for direct dependencies.
    #[serde(default)]
    pub depth: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<PackageVersionInsight>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights_v2: Option<PackageVersionInsightV2>,

    /// The manifest this package was found in, set when the package is attached to one.
    #[serde(skip)]
    pub manifest: Option<Arc<ManifestRef>>,
}

impl Package {
    #[must_use]
    pub const fn new(details: PackageDetails) -> Self {
        Self {
            details,
            depth: 0,
            insights: None,
            insights_v2: None,
            manifest: None,
        }
    }

    #[must_use]
    pub const fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub fn with_insights(mut self, insights: PackageVersionInsight) -> Self {
        self.insights = Some(insights);
        self
    }

    #[must_use]
    pub fn with_insights_v2(mut self, insights: PackageVersionInsightV2) -> Self {
        self.insights_v2 = Some(insights);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.details.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.details.version
    }

    #[must_use]
    pub const fn ecosystem(&self) -> Ecosystem {
        self.details.ecosystem
    }

    #[must_use]
    pub const fn is_direct(&self) -> bool {
        self.depth == 0
    }

    /// Stable identity of this package version.
    ///
    /// Case-insensitive over ecosystem, name and version, so the same package
    /// reported by two manifests yields the same identity.
    #[must_use]
    pub fn id(&self) -> String {
        let key = format!(
            "{}/{}/{}",
            self.details.ecosystem.to_string().to_lowercase(),
            self.details.name.to_lowercase(),
            self.details.version.to_lowercase()
        );

        let mut hasher = FxHasher::default();
        hasher.write(key.as_bytes());
        format!("{:016x}", hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_case_insensitive() {
        let a = Package::new(PackageDetails::new(Ecosystem::Npm, "Lodash", "4.17.21"));
        let b = Package::new(PackageDetails::new(Ecosystem::Npm, "lodash", "4.17.21"));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_id_distinguishes_versions_and_ecosystems() {
        let a = Package::new(PackageDetails::new(Ecosystem::Npm, "lodash", "4.17.21"));
        let b = Package::new(PackageDetails::new(Ecosystem::Npm, "lodash", "4.17.20"));
        let c = Package::new(PackageDetails::new(Ecosystem::PyPI, "lodash", "4.17.21"));
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_is_direct() {
        let pkg = Package::new(PackageDetails::new(Ecosystem::Cargo, "serde", "1.0.0"));
        assert!(pkg.is_direct());
        assert!(!pkg.with_depth(2).is_direct());
    }

    #[test]
    fn test_deserialize_without_insights() {
        let pkg: Package =
            serde_json::from_str(r#"{"package_detail": {"ecosystem": "npm", "name": "react", "version": "18.2.0"}}"#).unwrap();
        assert_eq!(pkg.name(), "react");
        assert_eq!(pkg.depth, 0);
        assert!(pkg.insights.is_none());
        assert!(pkg.insights_v2.is_none());
        assert!(pkg.manifest.is_none());
    }
}
