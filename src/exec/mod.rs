//! External command execution
//!
//! Every collaborator of the pipeline (git, the package script runner, the
//! QA suite, the version tool) is driven as an opaque subprocess through the
//! [CommandRunner] trait. Commands are structured descriptors, never shell
//! strings, so arguments are passed through without any quoting.
//!
//! - [system::SystemRunner]: spawns real processes with `std::process::Command`
//! - [mock::MockRunner]: scripted responses for tests
//!
//! There is no timeout: a subprocess that hangs blocks the pipeline until the
//! operator kills it.

pub mod mock;
pub mod system;

pub use mock::{MockResponse, MockRunner};
pub use system::SystemRunner;

use crate::error::Result;

/// A program plus its argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Friendly text logged instead of the literal command line
    pub display: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            display: None,
        }
    }

    /// Build a descriptor from `[program, args...]`, as stored in the file config.
    ///
    /// Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(CommandSpec {
            program: program.clone(),
            args: args.to_vec(),
            display: None,
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// The literal command line, with whitespace-bearing arguments quoted for readability.
    pub fn render(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.chars().any(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// What gets logged before the command runs.
    pub fn label(&self) -> String {
        self.display.clone().unwrap_or_else(|| self.render())
    }
}

/// How the subprocess's streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Attached to the controlling terminal; for long-running, human-facing steps
    Inherited,
    /// Standard output captured and returned to the caller
    Captured,
}

/// Result of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output; always empty in inherited mode
    pub stdout: String,
}

impl CommandOutput {
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Synchronous command execution.
///
/// Implementations must report a non-zero exit as
/// [crate::error::ReleaseError::CommandFailed] and a failure to start the
/// program as [crate::error::ReleaseError::Spawn]. Nothing is retried.
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec, mode: OutputMode) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &CommandSpec, mode: OutputMode) -> Result<CommandOutput> {
        (**self).run(command, mode)
    }
}
