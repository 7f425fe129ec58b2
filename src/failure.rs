use std::fmt;

use crate::error::ReleaseError;

/// Why a pipeline step stopped the release.
///
/// Each variant renders the tailored diagnostic shown to the operator; the
/// generic "release failed" banner is printed separately by the caller.
#[derive(Debug)]
pub enum StepFailure {
    /// Uncommitted or untracked files exist
    DirtyWorkingTree { changes: Vec<String> },
    /// The checked-out branch is not the release branch
    WrongBranch { current: String, expected: String },
    /// Fetching from the remote failed (network, auth, unknown remote)
    FetchFailed { remote: String, source: ReleaseError },
    /// Local and remote-tracking branch point at different commits
    OutOfSync {
        branch: String,
        remote_branch: String,
        local_hash: String,
        remote_hash: String,
    },
    /// A git reference resolved to nothing
    UnresolvedRef { reference: String },
    /// An external command failed; `action` names what it was doing
    CommandFailed {
        action: &'static str,
        source: ReleaseError,
    },
}

impl StepFailure {
    pub fn command(action: &'static str, source: ReleaseError) -> Self {
        StepFailure::CommandFailed { action, source }
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFailure::DirtyWorkingTree { changes } => {
                write!(
                    f,
                    "Working tree has uncommitted or untracked changes. Commit or stash them first."
                )?;
                for change in changes.iter().take(10) {
                    write!(f, "\n    {}", change)?;
                }
                if changes.len() > 10 {
                    write!(f, "\n    ... and {} more", changes.len() - 10)?;
                }
                Ok(())
            }
            StepFailure::WrongBranch { current, expected } => write!(
                f,
                "Current branch is '{}' but releases are cut from '{}'. Switch branches or pass --git-branch {}.",
                current, expected, current
            ),
            StepFailure::FetchFailed { remote, source } => write!(
                f,
                "Could not fetch from remote '{}': {}. Check your network connection and credentials.",
                remote, source
            ),
            StepFailure::OutOfSync {
                branch,
                remote_branch,
                local_hash,
                remote_hash,
            } => write!(
                f,
                "Local branch '{}' ({}) and '{}' ({}) point at different commits. Pull or push until they match.",
                branch,
                short_hash(local_hash),
                remote_branch,
                short_hash(remote_hash)
            ),
            StepFailure::UnresolvedRef { reference } => write!(
                f,
                "Could not resolve '{}' to a commit. Make sure the branch exists locally and on the remote.",
                reference
            ),
            StepFailure::CommandFailed { action, source } => {
                write!(f, "Failed to {}: {}", action, source)
            }
        }
    }
}

impl std::error::Error for StepFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StepFailure::FetchFailed { source, .. } | StepFailure::CommandFailed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
