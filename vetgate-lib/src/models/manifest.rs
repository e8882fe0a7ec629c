use super::{Ecosystem, Package};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a package remembers about the manifest it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestRef {
    pub path: String,
    pub ecosystem: Ecosystem,
}

/// A dependency manifest such as `package-lock.json` or `requirements.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    pub path: String,
    pub ecosystem: Ecosystem,

    #[serde(default)]
    packages: Vec<Package>,
}

impl PackageManifest {
    #[must_use]
    pub fn new(path: impl Into<String>, ecosystem: Ecosystem) -> Self {
        Self {
            path: path.into(),
            ecosystem,
            packages: Vec::new(),
        }
    }

    #[must_use]
    pub fn reference(&self) -> ManifestRef {
        ManifestRef {
            path: self.path.clone(),
            ecosystem: self.ecosystem,
        }
    }

    /// Attach a package to this manifest.
    pub fn add_package(&mut self, mut package: Package) {
        package.manifest = Some(Arc::new(self.reference()));
        self.packages.push(package);
    }

    /// Point every package back at this manifest.
    ///
    /// Deserialized manifests carry packages without their manifest reference.
    pub fn link_packages(&mut self) {
        let reference = Arc::new(self.reference());
        for package in &mut self.packages {
            package.manifest = Some(Arc::clone(&reference));
        }
    }

    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }
}
