use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};

/// Registry used when the manifest does not name one.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// The parts of a `package.json` the release pipeline reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,

    pub version: String,

    #[serde(default, rename = "publishConfig")]
    pub publish_config: PublishConfig,
}

/// The `publishConfig` block of a package manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub registry: Option<String>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// The current version, parsed as semver.
    ///
    /// Returns a descriptive error for malformed versions rather than treating
    /// them as "no prerelease".
    pub fn semver(&self) -> Result<semver::Version> {
        semver::Version::parse(self.version.trim()).map_err(|e| {
            ReleaseError::version(format!(
                "Manifest version '{}' is not a valid semantic version: {}",
                self.version, e
            ))
        })
    }

    /// Registry declared under `publishConfig.registry`, or the public npm registry.
    pub fn registry(&self) -> &str {
        self.publish_config
            .registry
            .as_deref()
            .unwrap_or(DEFAULT_REGISTRY)
    }
}

/// Loads the project manifest from `path`.
///
/// # Returns
/// * `Ok(Manifest)` - Parsed manifest
/// * `Err` - If the file is missing, unreadable, or not a valid manifest
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ReleaseError::manifest(format!("Cannot read {}: {}", path.display(), e))
    })?;

    Manifest::from_json(&contents).map_err(|e| {
        ReleaseError::manifest(format!("Cannot parse {}: {}", path.display(), e))
    })
}
