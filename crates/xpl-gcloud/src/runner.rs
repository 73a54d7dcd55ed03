use std::process::Command;

use tracing::debug;

use crate::error::{GcloudError, GcloudResult};

/// Captured result of one finished process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external program to completion.
///
/// Implementations report a process that could not be started as
/// [`GcloudError::Spawn`] and return every process that ran, whatever its
/// exit code.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> GcloudResult<CommandOutput>;
}

/// Runs commands as child processes of the current one.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> GcloudResult<CommandOutput> {
        debug!(program, ?args, "spawning");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| GcloudError::Spawn {
                program: program.to_string(),
                source,
            })?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
