use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::exec::CommandSpec;

/// File name searched for in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "release.toml";

/// File name searched for in the user config directory.
pub const USER_CONFIG_FILE: &str = "release-pipeline.toml";

/// Represents the complete file configuration for release-pipeline.
///
/// Holds project-level overrides of the command-line defaults and the
/// external commands each pipeline step invokes.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseDefaults,

    #[serde(default)]
    pub commands: CommandsConfig,
}

/// Project-level overrides for release settings.
///
/// Each field, when present, replaces the built-in default; command-line
/// flags still take precedence over these.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReleaseDefaults {
    pub branch: Option<String>,
    pub remote: Option<String>,
    pub dist_tag: Option<String>,
    pub commit_message: Option<String>,
    pub registry: Option<String>,
    pub sign: Option<bool>,
    pub publish: Option<bool>,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// Returns the default working-tree check: porcelain status, empty when clean.
fn default_tree_check() -> Vec<String> {
    argv(&["git", "status", "--porcelain"])
}

/// Returns the default command that builds what the QA suite needs.
fn default_qa_prepare() -> Vec<String> {
    argv(&["npm", "run", "qa:prepare"])
}

/// Returns the default QA suite command.
fn default_qa() -> Vec<String> {
    argv(&["npm", "run", "qa"])
}

/// Returns the default version tool invocation, before computed flags.
fn default_version_tool() -> Vec<String> {
    argv(&["npx", "lerna", "version"])
}

/// Returns the default publish command, before computed flags.
fn default_publish() -> Vec<String> {
    argv(&["npm", "publish"])
}

/// External commands used by the pipeline, each written as
/// `[program, arg, arg, ...]`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CommandsConfig {
    #[serde(default = "default_tree_check")]
    pub tree_check: Vec<String>,

    #[serde(default = "default_qa_prepare")]
    pub qa_prepare: Vec<String>,

    #[serde(default = "default_qa")]
    pub qa: Vec<String>,

    #[serde(default = "default_version_tool")]
    pub version_tool: Vec<String>,

    #[serde(default = "default_publish")]
    pub publish: Vec<String>,

    /// How the tree check's standard output is judged. When unset, output
    /// marks the tree dirty only for the built-in porcelain check.
    pub tree_check_output: Option<TreeCheckOutput>,
}

/// Whether lines printed by the tree check mean the tree is dirty.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TreeCheckOutput {
    /// Any non-blank line is an uncommitted or untracked change
    Dirty,
    /// Only the exit status counts
    Ignore,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        CommandsConfig {
            tree_check: default_tree_check(),
            qa_prepare: default_qa_prepare(),
            qa: default_qa(),
            version_tool: default_version_tool(),
            publish: default_publish(),
            tree_check_output: None,
        }
    }
}

/// Resolved command descriptors, one per configurable step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineCommands {
    pub tree_check: CommandSpec,
    pub qa_prepare: CommandSpec,
    pub qa: CommandSpec,
    pub version_tool: CommandSpec,
    pub publish: CommandSpec,
    pub tree_check_output: TreeCheckOutput,
}

impl CommandsConfig {
    /// Convert the argv lists to descriptors, rejecting empty commands.
    pub fn resolve(&self) -> Result<PipelineCommands> {
        let spec = |name: &str, argv: &[String]| {
            CommandSpec::from_argv(argv).ok_or_else(|| {
                ReleaseError::config(format!("commands.{} must name a program", name))
            })
        };

        let tree_check_output = self.tree_check_output.unwrap_or(
            if self.tree_check == default_tree_check() {
                TreeCheckOutput::Dirty
            } else {
                TreeCheckOutput::Ignore
            },
        );

        Ok(PipelineCommands {
            tree_check: spec("tree_check", &self.tree_check)?,
            qa_prepare: spec("qa_prepare", &self.qa_prepare)?,
            qa: spec("qa", &self.qa)?,
            version_tool: spec("version_tool", &self.version_tool)?,
            publish: spec("publish", &self.publish)?,
            tree_check_output,
        })
    }
}

impl Default for PipelineCommands {
    fn default() -> Self {
        PipelineCommands {
            tree_check: CommandSpec::new("git").args(["status", "--porcelain"]),
            qa_prepare: CommandSpec::new("npm").args(["run", "qa:prepare"]),
            qa: CommandSpec::new("npm").args(["run", "qa"]),
            version_tool: CommandSpec::new("npx").args(["lerna", "version"]),
            publish: CommandSpec::new("npm").arg("publish"),
            tree_check_output: TreeCheckOutput::Dirty,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in current directory
/// 3. `release-pipeline.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| ReleaseError::config(format!("Cannot read {}: {}", path, e)))?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
