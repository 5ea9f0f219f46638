//! Shell command execution
//!
//! Actions are handed to the platform shell (`sh -c` or `cmd /C`) from the
//! workspace root. How much of their output reaches the terminal depends on
//! the verbosity level; captured output is attached to the error when the
//! command fails.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::types::{DoableError, DoableResult};

/// Unified command executor that handles common setup and execution patterns
pub struct CommandExecutor<'a> {
    root: &'a Path,
    verbosity: u8,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(root: &'a Path, verbosity: u8) -> Self {
        Self { root, verbosity }
    }

    /// Build the platform shell invocation for `cmd`
    pub fn shell_command(cmd: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(cmd);
            command
        } else {
            let mut command = Command::new("sh");
            command.arg("-c").arg(cmd);
            command
        }
    }

    /// Run one shell action on behalf of `task`
    pub fn execute_shell_command(&self, task: &str, cmd: &str) -> DoableResult<()> {
        let mut command = Self::shell_command(cmd);
        command.current_dir(self.root);
        command.env("DOABLE_TASK", task);

        debug!(task, cmd, verbosity = self.verbosity, "spawning shell action");

        let (success, code, captured) = match self.verbosity {
            0 => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
                let output = self.output(&mut command, task, cmd)?;
                (output.status.success(), output.status.code(), render(&output))
            }
            1 => {
                command.stdout(Stdio::piped()).stderr(Stdio::inherit());
                let output = self.output(&mut command, task, cmd)?;
                (output.status.success(), output.status.code(), render(&output))
            }
            _ => {
                let status = command
                    .status()
                    .map_err(|e| spawn_error(task, cmd, e))?;
                (status.success(), status.code(), String::new())
            }
        };

        if !success {
            return Err(DoableError::ActionFailed {
                task: task.to_string(),
                command: cmd.to_string(),
                code: code.unwrap_or(-1),
                output: captured,
            });
        }

        Ok(())
    }

    fn output(&self, command: &mut Command, task: &str, cmd: &str) -> DoableResult<Output> {
        command.output().map_err(|e| spawn_error(task, cmd, e))
    }
}

fn spawn_error(task: &str, cmd: &str, e: std::io::Error) -> DoableError {
    DoableError::ActionFailed {
        task: task.to_string(),
        command: cmd.to_string(),
        code: -1,
        output: format!("\n{}", e),
    }
}

/// Captured output formatted for inclusion in an error message
fn render(output: &Output) -> String {
    let mut text = String::new();
    for stream in [&output.stdout, &output.stderr] {
        let chunk = String::from_utf8_lossy(stream);
        let chunk = chunk.trim_end();
        if !chunk.is_empty() {
            text.push('\n');
            text.push_str(chunk);
        }
    }
    text
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_success_runs_in_root() {
        let dir = tempfile::tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path(), 0);
        executor
            .execute_shell_command("touch", "touch created.txt")
            .unwrap();
        assert!(dir.path().join("created.txt").exists());
    }

    #[test]
    fn test_task_name_exported() {
        let dir = tempfile::tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path(), 0);
        executor
            .execute_shell_command("named", "echo $DOABLE_TASK > name.txt")
            .unwrap();
        let name = std::fs::read_to_string(dir.path().join("name.txt")).unwrap();
        assert_eq!(name.trim(), "named");
    }

    #[test]
    fn test_failure_reports_exit_code_and_captured_output() {
        let dir = tempfile::tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path(), 0);
        let err = executor
            .execute_shell_command("lint", "echo broken >&2; exit 3")
            .unwrap_err();
        match err {
            DoableError::ActionFailed {
                task,
                code,
                output,
                ..
            } => {
                assert_eq!(task, "lint");
                assert_eq!(code, 3);
                assert!(output.contains("broken"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_streaming_failure_has_no_captured_output() {
        let dir = tempfile::tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path(), 2);
        let err = executor.execute_shell_command("t", "exit 1").unwrap_err();
        assert!(err.to_string().ends_with("exit code 1"));
    }
}
