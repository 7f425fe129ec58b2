use crate::error::{ReleaseError, Result};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, OutputMode};
use std::cell::RefCell;

/// Scripted outcome for a mocked command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Exit 0, with the given standard output
    Success(String),
    /// Non-zero exit with the given code
    Failure(i32),
}

impl MockResponse {
    pub fn stdout(stdout: impl Into<String>) -> Self {
        MockResponse::Success(stdout.into())
    }
}

/// Mock command runner for testing without spawning processes
///
/// Responses are matched against the rendered command line: a scripted key
/// matches the exact line or any line that extends it with more arguments.
/// The first matching key wins. Unscripted commands succeed with no output.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: Vec<(String, MockResponse)>,
    invocations: RefCell<Vec<(CommandSpec, OutputMode)>>,
}

impl MockRunner {
    /// Create a runner with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for commands whose line starts with `command_line`
    pub fn respond(mut self, command_line: impl Into<String>, response: MockResponse) -> Self {
        self.responses.push((command_line.into(), response));
        self
    }

    /// Every command run so far, in order
    pub fn invocations(&self) -> Vec<CommandSpec> {
        self.invocations
            .borrow()
            .iter()
            .map(|(spec, _)| spec.clone())
            .collect()
    }

    /// Rendered command lines run so far, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(|(spec, _)| spec.render())
            .collect()
    }

    /// Output mode used for the first command whose line starts with `prefix`
    pub fn mode_of(&self, prefix: &str) -> Option<OutputMode> {
        self.invocations
            .borrow()
            .iter()
            .find(|(spec, _)| spec.render().starts_with(prefix))
            .map(|(_, mode)| *mode)
    }

    /// Whether any command line starting with `prefix` was run
    pub fn ran(&self, prefix: &str) -> bool {
        self.mode_of(prefix).is_some()
    }

    fn lookup(&self, line: &str) -> Option<&MockResponse> {
        self.responses
            .iter()
            .find(|(key, _)| line == key || line.starts_with(&format!("{} ", key)))
            .map(|(_, response)| response)
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &CommandSpec, mode: OutputMode) -> Result<CommandOutput> {
        self.invocations.borrow_mut().push((command.clone(), mode));

        let line = command.render();
        match self.lookup(&line) {
            Some(MockResponse::Failure(code)) => Err(ReleaseError::CommandFailed {
                command: line,
                code: Some(*code),
            }),
            Some(MockResponse::Success(stdout)) if mode == OutputMode::Captured => {
                Ok(CommandOutput {
                    stdout: stdout.clone(),
                })
            }
            _ => Ok(CommandOutput::default()),
        }
    }
}
