use super::PolicyEcosystem;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Package ecosystem as reported by manifest readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
pub enum Ecosystem {
    Maven,
    RubyGems,
    Go,
    #[serde(rename = "npm")]
    #[strum(serialize = "npm")]
    Npm,
    PyPI,
    Cargo,
    NuGet,
    Packagist,
    Hex,
    Pub,
    CycloneDxSbom,
    SpdxSbom,
    GitHubActions,
    Terraform,
    TerraformModule,
    TerraformProvider,
}

impl Ecosystem {
    /// The ecosystem code exposed to policy expressions.
    ///
    /// SBOM containers and ecosystems without a policy code map to
    /// [`PolicyEcosystem::Unspecified`].
    #[must_use]
    pub const fn policy_ecosystem(self) -> PolicyEcosystem {
        match self {
            Self::Maven => PolicyEcosystem::Maven,
            Self::RubyGems => PolicyEcosystem::RubyGems,
            Self::Go => PolicyEcosystem::Go,
            Self::Npm => PolicyEcosystem::Npm,
            Self::PyPI => PolicyEcosystem::PyPI,
            Self::Cargo => PolicyEcosystem::Cargo,
            Self::NuGet => PolicyEcosystem::NuGet,
            Self::Packagist => PolicyEcosystem::Packagist,
            Self::GitHubActions => PolicyEcosystem::GitHubActions,
            Self::Terraform => PolicyEcosystem::Terraform,
            Self::TerraformModule => PolicyEcosystem::TerraformModule,
            Self::TerraformProvider => PolicyEcosystem::TerraformProvider,
            Self::Hex | Self::Pub | Self::CycloneDxSbom | Self::SpdxSbom => PolicyEcosystem::Unspecified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn test_display_matches_reader_names() {
        assert_eq!(Ecosystem::Npm.to_string(), "npm");
        assert_eq!(Ecosystem::PyPI.to_string(), "PyPI");
        assert_eq!(Ecosystem::from_str("npm").unwrap(), Ecosystem::Npm);
    }

    #[test]
    fn test_serde_uses_reader_names() {
        let json = serde_json::to_string(&Ecosystem::Npm).unwrap();
        assert_eq!(json, "\"npm\"");

        let eco: Ecosystem = serde_json::from_str("\"GitHubActions\"").unwrap();
        assert_eq!(eco, Ecosystem::GitHubActions);
    }

    #[test]
    fn test_policy_ecosystem_mapping() {
        assert_eq!(Ecosystem::Npm.policy_ecosystem(), PolicyEcosystem::Npm);
        assert_eq!(Ecosystem::SpdxSbom.policy_ecosystem(), PolicyEcosystem::Unspecified);
    }
}
