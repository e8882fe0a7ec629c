//! Package input projection
//!
//! Projects the internal package model into the stable documents that
//! expressions query, so rule authors never depend on how insight data is
//! represented internally.
//!
//! - [`PolicyInput`]: the current schema, requires policy insight data
//! - [`FilterInput`]: the legacy schema, always succeeds

mod cel_value;
mod filter_input;
mod policy_input;

pub use cel_value::{cel_field, encode, to_cel_value};
pub use filter_input::{FilterInput, FilterPackage, FilterProject, FilterScorecard, FilterVulnerabilities, FilterVulnerability};
pub use policy_input::{
    AttributesInput, LicenseInput, ManifestInput, PackageInput, PolicyInput, ProjectInput, ProjectInsightInput, VulnerabilityInput,
};
