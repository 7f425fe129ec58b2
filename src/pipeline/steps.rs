//! The fixed release step sequence.
//!
//! Each step reads the resolved settings, invokes at most a few external
//! commands through the [StepContext], and returns either a confirmation
//! message or a [StepFailure].

use crate::config::TreeCheckOutput;
use crate::error::Result;
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, OutputMode};
use crate::failure::StepFailure;
use crate::settings::ReleaseSettings;
use crate::ui;

/// Identifies a step; the declaration order is the execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    WorkingTree,
    Branch,
    Fetch,
    Sync,
    QaPrepare,
    Qa,
    VersionBump,
    Publish,
    Push,
}

impl StepKind {
    pub const ALL: [StepKind; 9] = [
        StepKind::WorkingTree,
        StepKind::Branch,
        StepKind::Fetch,
        StepKind::Sync,
        StepKind::QaPrepare,
        StepKind::Qa,
        StepKind::VersionBump,
        StepKind::Publish,
        StepKind::Push,
    ];

    /// Human-readable label shown before the step runs
    pub fn description(&self) -> &'static str {
        match self {
            StepKind::WorkingTree => "Checking the working tree is clean",
            StepKind::Branch => "Checking the release branch is checked out",
            StepKind::Fetch => "Fetching from the remote",
            StepKind::Sync => "Checking local and remote branches are in sync",
            StepKind::QaPrepare => "Preparing the QA suite",
            StepKind::Qa => "Running the QA suite",
            StepKind::VersionBump => "Bumping the version",
            StepKind::Publish => "Publishing the package",
            StepKind::Push => "Pushing the release commit and tags",
        }
    }

    /// Steps that only run when publishing is enabled
    pub fn is_publish_stage(&self) -> bool {
        matches!(self, StepKind::Publish | StepKind::Push)
    }
}

/// What a step can reach while running.
pub struct StepContext<'a> {
    pub settings: &'a ReleaseSettings,
    runner: &'a dyn CommandRunner,
}

impl<'a> StepContext<'a> {
    pub fn new(settings: &'a ReleaseSettings, runner: &'a dyn CommandRunner) -> Self {
        StepContext { settings, runner }
    }

    /// Log the command, then run it.
    pub fn exec(&self, command: &CommandSpec, mode: OutputMode) -> Result<CommandOutput> {
        let label = command.label();
        ui::display_status(&ui::compose(&["Running", label.as_str()]));
        self.runner.run(command, mode)
    }
}

pub type StepResult = std::result::Result<String, StepFailure>;

/// A named action in the release sequence.
pub struct Step {
    pub kind: StepKind,
    action: fn(&StepContext<'_>) -> StepResult,
}

impl Step {
    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    /// Run the action, returning the confirmation message on success
    pub fn run(&self, ctx: &StepContext<'_>) -> StepResult {
        (self.action)(ctx)
    }
}

/// All steps in execution order.
pub fn release_steps() -> Vec<Step> {
    StepKind::ALL
        .iter()
        .map(|&kind| Step {
            kind,
            action: match kind {
                StepKind::WorkingTree => check_working_tree,
                StepKind::Branch => check_branch,
                StepKind::Fetch => fetch_remote,
                StepKind::Sync => check_sync,
                StepKind::QaPrepare => prepare_qa,
                StepKind::Qa => run_qa,
                StepKind::VersionBump => bump_version,
                StepKind::Publish => publish_package,
                StepKind::Push => push_release,
            },
        })
        .collect()
}

fn git() -> CommandSpec {
    CommandSpec::new("git")
}

fn check_working_tree(ctx: &StepContext<'_>) -> StepResult {
    let output = ctx
        .exec(&ctx.settings.commands.tree_check, OutputMode::Captured)
        .map_err(|e| StepFailure::command("check the working tree", e))?;

    if ctx.settings.commands.tree_check_output == TreeCheckOutput::Ignore {
        return Ok("Working tree is clean".to_string());
    }

    let changes: Vec<String> = output
        .stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    if changes.is_empty() {
        Ok("Working tree is clean".to_string())
    } else {
        Err(StepFailure::DirtyWorkingTree { changes })
    }
}

fn check_branch(ctx: &StepContext<'_>) -> StepResult {
    let output = ctx
        .exec(
            &git().args(["rev-parse", "--abbrev-ref", "HEAD"]),
            OutputMode::Captured,
        )
        .map_err(|e| StepFailure::command("determine the current branch", e))?;

    let current = output.trimmed();
    let expected = &ctx.settings.release_branch;
    if current == expected {
        Ok(format!("On release branch '{}'", expected))
    } else {
        Err(StepFailure::WrongBranch {
            current: current.to_string(),
            expected: expected.clone(),
        })
    }
}

fn fetch_remote(ctx: &StepContext<'_>) -> StepResult {
    let remote = &ctx.settings.git_remote;
    ctx.exec(&git().args(["fetch", remote.as_str()]), OutputMode::Inherited)
        .map_err(|source| StepFailure::FetchFailed {
            remote: remote.clone(),
            source,
        })?;

    Ok(format!("Fetched latest refs from '{}'", remote))
}

fn resolve_ref(ctx: &StepContext<'_>, reference: &str) -> std::result::Result<String, StepFailure> {
    let output = ctx
        .exec(&git().args(["rev-parse", reference]), OutputMode::Captured)
        .map_err(|e| StepFailure::command("resolve a git reference", e))?;

    let hash = output.trimmed();
    if hash.is_empty() {
        Err(StepFailure::UnresolvedRef {
            reference: reference.to_string(),
        })
    } else {
        Ok(hash.to_string())
    }
}

fn check_sync(ctx: &StepContext<'_>) -> StepResult {
    let branch = &ctx.settings.release_branch;
    let remote_branch = ctx.settings.remote_branch();

    let local_hash = resolve_ref(ctx, branch)?;
    let remote_hash = resolve_ref(ctx, &remote_branch)?;

    // Plain equality: ahead and behind are both failures.
    if local_hash == remote_hash {
        Ok(format!("'{}' is in sync with '{}'", branch, remote_branch))
    } else {
        Err(StepFailure::OutOfSync {
            branch: branch.clone(),
            remote_branch,
            local_hash,
            remote_hash,
        })
    }
}

fn prepare_qa(ctx: &StepContext<'_>) -> StepResult {
    ctx.exec(&ctx.settings.commands.qa_prepare, OutputMode::Inherited)
        .map_err(|e| StepFailure::command("prepare the QA suite", e))?;
    Ok("QA suite prepared".to_string())
}

fn run_qa(ctx: &StepContext<'_>) -> StepResult {
    ctx.exec(&ctx.settings.commands.qa, OutputMode::Inherited)
        .map_err(|e| StepFailure::command("run the QA suite", e))?;
    Ok("QA suite passed".to_string())
}

/// The version tool invocation with every computed flag.
pub fn version_command(settings: &ReleaseSettings) -> CommandSpec {
    let tool = &settings.commands.version_tool;
    let bump = settings
        .version_bump
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();

    let mut command = tool.clone();
    if !bump.is_empty() {
        command = command.arg(bump.as_str());
    }
    command = command
        .arg("--conventional-commits")
        .args(["--git-remote", settings.git_remote.as_str()])
        .args(["--message", settings.commit_message.as_str()])
        .arg("--no-push");
    if let Some(preid) = &settings.prerelease_id {
        command = command.args(["--preid", preid.as_str()]);
    }

    let tool_line = tool.render();
    let display = ui::compose(&[
        tool_line.as_str(),
        bump.as_str(),
        if settings.prerelease_id.is_some() { "(prerelease)" } else { "" },
    ]);

    command
        .arg(format!("--sign-git-commit={}", settings.sign))
        .arg(format!("--sign-git-tag={}", settings.sign))
        .with_display(display)
}

fn bump_version(ctx: &StepContext<'_>) -> StepResult {
    ctx.exec(&version_command(ctx.settings), OutputMode::Inherited)
        .map_err(|e| StepFailure::command("bump the version", e))?;

    let bump = ctx
        .settings
        .version_bump
        .as_ref()
        .map(|bump| format!("({})", bump))
        .unwrap_or_default();
    Ok(ui::compose(&[
        "Version bumped",
        bump.as_str(),
        if ctx.settings.sign { "and signed" } else { "" },
    ]))
}

/// The publish invocation with dist-tag and registry.
pub fn publish_command(settings: &ReleaseSettings) -> CommandSpec {
    settings
        .commands
        .publish
        .clone()
        .args(["--tag", settings.dist_tag.as_str()])
        .args(["--registry", settings.registry.as_str()])
}

fn publish_package(ctx: &StepContext<'_>) -> StepResult {
    ctx.exec(&publish_command(ctx.settings), OutputMode::Inherited)
        .map_err(|e| StepFailure::command("publish the package", e))?;
    Ok(format!(
        "Published with dist-tag '{}' to {}",
        ctx.settings.dist_tag, ctx.settings.registry
    ))
}

fn push_release(ctx: &StepContext<'_>) -> StepResult {
    let settings = ctx.settings;
    ctx.exec(
        &git().args([
            "push",
            "--follow-tags",
            settings.git_remote.as_str(),
            settings.release_branch.as_str(),
        ]),
        OutputMode::Inherited,
    )
    .map_err(|e| StepFailure::command("push the release commit and tags", e))?;
    Ok(format!(
        "Pushed '{}' and its tags to '{}'",
        settings.release_branch, settings.git_remote
    ))
}
