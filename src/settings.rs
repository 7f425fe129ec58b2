//! Configuration resolution
//!
//! Merges command-line overrides over the file config over built-in
//! defaults, once, at process start. The resulting [ReleaseSettings] is
//! passed by reference into every pipeline step and never changes afterwards.

use regex::Regex;

use crate::config::{Config, PipelineCommands};
use crate::domain::{PreReleaseId, VersionBump};
use crate::error::{ReleaseError, Result};
use crate::manifest::Manifest;

pub const DEFAULT_COMMIT_MESSAGE: &str = "chore(release): %v";
pub const DEFAULT_DIST_TAG: &str = "latest";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_SIGN: bool = false;
pub const DEFAULT_PUBLISH: bool = false;

/// Raw values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub version_bump: Option<String>,
    pub commit_message: Option<String>,
    pub dist_tag: Option<String>,
    pub git_branch: Option<String>,
    pub git_remote: Option<String>,
    pub preid: Option<String>,
    pub registry: Option<String>,
    pub sign: Option<bool>,
    pub publish: Option<bool>,
}

/// Resolved settings for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseSettings {
    /// Bump handed to the version tool; `None` lets it infer from commits
    pub version_bump: Option<VersionBump>,
    /// Commit message template, containing `%v` or `%s`
    pub commit_message: String,
    pub dist_tag: String,
    pub release_branch: String,
    pub git_remote: String,
    pub prerelease_id: Option<PreReleaseId>,
    pub registry: String,
    pub sign: bool,
    /// Whether the publish and push steps run after the version bump
    pub publish: bool,
    pub commands: PipelineCommands,
    pub package_name: Option<String>,
    pub current_version: semver::Version,
    default_registry: String,
    derived_prerelease_id: Option<PreReleaseId>,
}

/// One line of the settings report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingRow {
    pub description: &'static str,
    pub value: String,
    pub is_default: bool,
}

impl SettingRow {
    fn new(description: &'static str, value: impl Into<String>, is_default: bool) -> Self {
        SettingRow {
            description,
            value: value.into(),
            is_default,
        }
    }
}

fn validate_commit_message(template: &str) -> Result<()> {
    let placeholder = Regex::new(r"%[vs]")
        .map_err(|e| ReleaseError::config(format!("Invalid placeholder pattern: {}", e)))?;

    if placeholder.is_match(template) {
        Ok(())
    } else {
        Err(ReleaseError::config(format!(
            "Commit message '{}' must contain a version placeholder (%v or %s)",
            template
        )))
    }
}

fn non_empty(name: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        Err(ReleaseError::config(format!("{} must not be empty", name)))
    } else {
        Ok(value)
    }
}

impl ReleaseSettings {
    /// Resolve settings from command-line overrides, the project manifest and
    /// the file config.
    ///
    /// # Returns
    /// * `Ok(ReleaseSettings)` - Fully validated settings
    /// * `Err` - If the manifest version is malformed, the bump or prerelease
    ///   identifier is invalid, or the commit message lacks a placeholder
    pub fn resolve(
        overrides: SettingsOverrides,
        manifest: &Manifest,
        config: &Config,
    ) -> Result<Self> {
        let file = &config.release;
        let current_version = manifest.semver()?;
        let derived_prerelease_id = PreReleaseId::derive(&current_version);

        let version_bump = overrides
            .version_bump
            .as_deref()
            .map(VersionBump::parse)
            .transpose()?;

        let prerelease_id = match overrides.preid.as_deref() {
            Some(preid) => Some(PreReleaseId::parse(preid)?),
            None => derived_prerelease_id.clone(),
        };

        let commit_message = overrides
            .commit_message
            .or_else(|| file.commit_message.clone())
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());
        validate_commit_message(&commit_message)?;

        let dist_tag = overrides
            .dist_tag
            .or_else(|| file.dist_tag.clone())
            .unwrap_or_else(|| DEFAULT_DIST_TAG.to_string());

        let release_branch = overrides
            .git_branch
            .or_else(|| file.branch.clone())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        let git_remote = overrides
            .git_remote
            .or_else(|| file.remote.clone())
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string());

        let default_registry = manifest.registry().to_string();
        let registry = overrides
            .registry
            .or_else(|| file.registry.clone())
            .unwrap_or_else(|| default_registry.clone());

        Ok(ReleaseSettings {
            version_bump,
            commit_message,
            dist_tag: non_empty("Dist tag", dist_tag)?,
            release_branch: non_empty("Release branch", release_branch)?,
            git_remote: non_empty("Git remote", git_remote)?,
            prerelease_id,
            registry: non_empty("Registry", registry)?,
            sign: overrides.sign.or(file.sign).unwrap_or(DEFAULT_SIGN),
            publish: overrides.publish.or(file.publish).unwrap_or(DEFAULT_PUBLISH),
            commands: config.commands.resolve()?,
            package_name: manifest.name.clone(),
            current_version,
            default_registry,
            derived_prerelease_id,
        })
    }

    /// The remote-tracking ref of the release branch, e.g. `origin/master`
    pub fn remote_branch(&self) -> String {
        format!("{}/{}", self.git_remote, self.release_branch)
    }

    /// Every setting with its value and whether it equals the built-in default.
    pub fn report(&self) -> Vec<SettingRow> {
        let bump = self
            .version_bump
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "inferred from conventional commits".to_string());
        let preid = self
            .prerelease_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unset".to_string());

        vec![
            SettingRow::new("Version bump", bump, self.version_bump.is_none()),
            SettingRow::new(
                "Commit message",
                &self.commit_message,
                self.commit_message == DEFAULT_COMMIT_MESSAGE,
            ),
            SettingRow::new("Dist tag", &self.dist_tag, self.dist_tag == DEFAULT_DIST_TAG),
            SettingRow::new(
                "Release branch",
                &self.release_branch,
                self.release_branch == DEFAULT_BRANCH,
            ),
            SettingRow::new(
                "Git remote",
                &self.git_remote,
                self.git_remote == DEFAULT_REMOTE,
            ),
            SettingRow::new(
                "Prerelease identifier",
                preid,
                self.prerelease_id == self.derived_prerelease_id,
            ),
            SettingRow::new(
                "Registry",
                &self.registry,
                self.registry == self.default_registry,
            ),
            SettingRow::new(
                "Sign commit and tag",
                self.sign.to_string(),
                self.sign == DEFAULT_SIGN,
            ),
            SettingRow::new(
                "Publish and push",
                self.publish.to_string(),
                self.publish == DEFAULT_PUBLISH,
            ),
        ]
    }
}
