//! Prerelease identifier handling
//!
//! The identifier is the textual label of a prerelease version, e.g. `beta`
//! in `1.2.3-beta.4`. See https://semver.org/#spec-item-9

use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// A validated prerelease identifier passed to the version tool as `--preid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreReleaseId(String);

impl PreReleaseId {
    /// Parse an identifier, accepting ASCII alphanumerics and hyphens only.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Derive the identifier from a version's prerelease component.
    ///
    /// Only a prerelease with more than one dot-separated segment yields an
    /// identifier, and it is always the first segment:
    /// - "2.0.0-alpha.1" -> Some("alpha")
    /// - "2.0.0-rc"      -> None
    /// - "2.0.0"         -> None
    pub fn derive(version: &semver::Version) -> Option<Self> {
        if version.pre.is_empty() {
            return None;
        }

        let segments: Vec<&str> = version.pre.as_str().split('.').collect();
        if segments.len() > 1 {
            Some(PreReleaseId(segments[0].to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PreReleaseId {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ReleaseError::version("Empty prerelease identifier"));
        }

        if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            Ok(PreReleaseId(s.to_string()))
        } else {
            Err(ReleaseError::version(format!(
                "Invalid prerelease identifier: '{}'",
                s
            )))
        }
    }
}

impl fmt::Display for PreReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
