use crate::error::{ReleaseError, Result};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, OutputMode};
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Runs commands as real subprocesses in the current working directory.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec, mode: OutputMode) -> Result<CommandOutput> {
        let spawn_error = |source: io::Error| ReleaseError::Spawn {
            command: spec.render(),
            source,
        };

        match mode {
            OutputMode::Inherited => {
                let status = self
                    .command(spec)
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(spawn_error)?;

                if !status.success() {
                    return Err(ReleaseError::CommandFailed {
                        command: spec.render(),
                        code: status.code(),
                    });
                }

                Ok(CommandOutput::default())
            }
            OutputMode::Captured => {
                let output = self
                    .command(spec)
                    .stdin(Stdio::null())
                    .output()
                    .map_err(spawn_error)?;

                if !output.status.success() {
                    // Captured stderr would otherwise be lost to the operator.
                    io::stderr().write_all(&output.stderr)?;
                    return Err(ReleaseError::CommandFailed {
                        command: spec.render(),
                        code: output.status.code(),
                    });
                }

                Ok(CommandOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                })
            }
        }
    }
}
