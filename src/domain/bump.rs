use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// The bump handed to the version tool.
///
/// Either one of the tool's semver keywords or an explicit target version.
/// When no bump is given the tool infers one from conventional commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
    PreMajor,
    PreMinor,
    PrePatch,
    PreRelease,
    Exact(semver::Version),
}

impl VersionBump {
    /// Parse a bump keyword or an explicit version.
    ///
    /// Keywords are matched case-insensitively; explicit versions may carry a
    /// leading `v` (e.g. "v2.0.0"), which is dropped.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for VersionBump {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            "premajor" => Ok(VersionBump::PreMajor),
            "preminor" => Ok(VersionBump::PreMinor),
            "prepatch" => Ok(VersionBump::PrePatch),
            "prerelease" => Ok(VersionBump::PreRelease),
            _ => {
                let candidate = trimmed.strip_prefix('v').unwrap_or(trimmed);
                semver::Version::parse(candidate)
                    .map(VersionBump::Exact)
                    .map_err(|e| {
                        ReleaseError::version(format!(
                            "'{}' is neither a bump keyword (major, minor, patch, premajor, preminor, prepatch, prerelease) nor a valid version: {}",
                            s, e
                        ))
                    })
            }
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Major => write!(f, "major"),
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Patch => write!(f, "patch"),
            VersionBump::PreMajor => write!(f, "premajor"),
            VersionBump::PreMinor => write!(f, "preminor"),
            VersionBump::PrePatch => write!(f, "prepatch"),
            VersionBump::PreRelease => write!(f, "prerelease"),
            VersionBump::Exact(version) => write!(f, "{}", version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(VersionBump::parse("major").unwrap(), VersionBump::Major);
        assert_eq!(VersionBump::parse("Minor").unwrap(), VersionBump::Minor);
        assert_eq!(VersionBump::parse("PATCH").unwrap(), VersionBump::Patch);
        assert_eq!(
            VersionBump::parse("prerelease").unwrap(),
            VersionBump::PreRelease
        );
    }

    #[test]
    fn test_parse_explicit_version() {
        let bump = VersionBump::parse("2.1.0-beta.3").unwrap();
        assert_eq!(
            bump,
            VersionBump::Exact(semver::Version::parse("2.1.0-beta.3").unwrap())
        );
        assert_eq!(bump.to_string(), "2.1.0-beta.3");
    }

    #[test]
    fn test_parse_explicit_version_with_prefix() {
        let bump = VersionBump::parse("v3.0.0").unwrap();
        assert_eq!(bump.to_string(), "3.0.0");
    }

    #[test]
    fn test_parse_invalid() {
        let err = VersionBump::parse("huge").unwrap_err();
        assert!(err.to_string().contains("'huge'"));
        assert!(VersionBump::parse("1.2").is_err());
        assert!(VersionBump::parse("").is_err());
    }

    #[test]
    fn test_display_keywords_round_trip_through_tool_syntax() {
        assert_eq!(VersionBump::PreMinor.to_string(), "preminor");
        assert_eq!(VersionBump::PrePatch.to_string(), "prepatch");
    }
}
