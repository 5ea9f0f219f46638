//! High-level task runner
//!
//! This module provides the main task execution logic that coordinates
//! up-to-date checks, parameter substitution, command execution and state
//! recording. Tasks run strictly one after another.

use std::path::Path;

use colored::*;
use tracing::{debug, info};

use crate::configs::project::DEFAULT_VERBOSITY;
use crate::execution::command::CommandExecutor;
use crate::execution::download::Downloader;
use crate::params::{substitute, ParamValues};
use crate::registry::{Invocation, TaskRegistry};
use crate::results::RunSummary;
use crate::state::{digest_file_deps, StateStore};
use crate::task::{Action, TaskDescriptor};
use crate::task_execution::{check_task_status, resolve_task_execution_plan, TaskStatus};
use crate::types::DoableResult;

/// Configuration for the task runner
#[derive(Debug, Clone)]
pub struct TaskRunnerConfig {
    pub verbosity: u8,
    /// Run every task in the plan regardless of up-to-date status
    pub force: bool,
}

impl Default for TaskRunnerConfig {
    fn default() -> Self {
        Self {
            verbosity: DEFAULT_VERBOSITY,
            force: false,
        }
    }
}

pub struct TaskRunner<'a> {
    registry: &'a TaskRegistry,
    root: &'a Path,
    config: TaskRunnerConfig,
    downloader: Downloader,
}

impl<'a> TaskRunner<'a> {
    pub fn new(registry: &'a TaskRegistry, root: &'a Path, config: TaskRunnerConfig) -> Self {
        Self {
            registry,
            root,
            config,
            downloader: Downloader::new(),
        }
    }

    /// Run the requested tasks and everything they depend on.
    ///
    /// Stops at the first failing action. State is saved after every
    /// successful task so completed work survives a later failure.
    pub async fn run(&self, invocations: &[Invocation]) -> DoableResult<RunSummary> {
        let mut state = StateStore::load(self.root)?;
        let plan = resolve_task_execution_plan(
            self.registry,
            invocations,
            self.root,
            &state,
            self.config.force,
        )?;

        let mut summary = RunSummary::default();

        for planned in &plan.tasks {
            let task = self.registry.require(&planned.name)?;

            // Earlier tasks may have produced this task's inputs
            let status = check_task_status(self.root, task, &state, self.config.force)?;
            let reason = match status {
                TaskStatus::UpToDate => {
                    println!("{} {}", "--".bright_black(), task.name.bright_black());
                    debug!(task = %task.name, "skipping up-to-date task");
                    summary.skipped.push(task.name.clone());
                    continue;
                }
                TaskStatus::Run(reason) => reason,
            };

            let record = digest_file_deps(self.root, task)?;

            let task_color = get_task_color(&task.name);
            println!();
            println!(
                "┌─ {} {}",
                "Running task".bold(),
                task.name.color(task_color).bold()
            );
            println!("└─ {} {}", "Reason:".bright_black(), reason);
            info!(task = %task.name, %reason, "running task");

            self.run_task(task, &planned.params).await?;

            state.record(&task.name, record);
            state.save()?;
            summary.executed.push(task.name.clone());
        }

        Ok(summary)
    }

    /// Execute the actions of a single task in order
    async fn run_task(&self, task: &TaskDescriptor, params: &ParamValues) -> DoableResult<()> {
        let values = task.substitution_values(params);
        let executor = CommandExecutor::new(self.root, self.config.verbosity);

        for action in &task.actions {
            match action {
                Action::Shell(template) => {
                    let cmd = substitute(template, &values)?;
                    if self.config.verbosity > 0 {
                        println!("   {} {}", "$".bright_black(), cmd.dimmed());
                    }
                    executor.execute_shell_command(&task.name, &cmd)?;
                }
                Action::Download { url, dest } => {
                    let bytes = self.downloader.download(url, &self.root.join(dest)).await?;
                    if self.config.verbosity > 0 {
                        println!(
                            "   {} {} ({} bytes)",
                            "↓".bright_black(),
                            dest.display(),
                            bytes
                        );
                    }
                }
            }
        }

        println!(
            "{} {}",
            "✓".green().bold(),
            format!("Completed {}", task.name).color(get_task_color(&task.name))
        );
        Ok(())
    }
}

/// Get a consistent color for a task name
pub fn get_task_color(task_name: &str) -> Color {
    let hash = task_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Jewel tones, kept clear of the red/yellow/green used for status
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        },
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 140,
            b: 0,
        },
        Color::TrueColor {
            r: 199,
            g: 21,
            b: 133,
        },
        Color::TrueColor {
            r: 138,
            g: 43,
            b: 226,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::types::DoableError;
    use std::fs;

    fn quiet() -> TaskRunnerConfig {
        TaskRunnerConfig {
            verbosity: 0,
            force: false,
        }
    }

    fn inv(name: &str) -> Invocation {
        Invocation::new(name)
    }

    fn registry() -> TaskRegistry {
        let mut registry = TaskRegistry::new();
        registry
            .register(
                TaskDescriptor::new("generate")
                    .target("input.txt")
                    .uptodate(true)
                    .shell("echo data > input.txt"),
            )
            .unwrap();
        registry
            .register(
                TaskDescriptor::new("build")
                    .file_dep("input.txt")
                    .target("output.txt")
                    .shell("cat %(dependencies)s >> %(targets)s"),
            )
            .unwrap();
        registry
            .register(
                TaskDescriptor::new("greet")
                    .param(crate::params::Param::string("who", "world"))
                    .shell("echo hello %(who)s >> greetings.txt"),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_runs_dependencies_then_skips_when_current() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let runner = TaskRunner::new(&registry, dir.path(), quiet());

        let first = runner.run(&[inv("build")]).await.unwrap();
        assert_eq!(first.executed, vec!["generate", "build"]);
        assert!(first.skipped.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("output.txt")).unwrap(),
            "data\n"
        );

        let second = runner.run(&[inv("build")]).await.unwrap();
        assert!(second.executed.is_empty());
        assert_eq!(second.skipped, vec!["generate", "build"]);
    }

    #[tokio::test]
    async fn test_changed_input_reruns_consumer() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let runner = TaskRunner::new(&registry, dir.path(), quiet());
        runner.run(&[inv("build")]).await.unwrap();

        fs::write(dir.path().join("input.txt"), "changed\n").unwrap();
        let summary = runner.run(&[inv("build")]).await.unwrap();
        assert_eq!(summary.executed, vec!["build"]);
        assert_eq!(summary.skipped, vec!["generate"]);
    }

    #[tokio::test]
    async fn test_force_reruns_everything() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        TaskRunner::new(&registry, dir.path(), quiet())
            .run(&[inv("build")])
            .await
            .unwrap();

        let forced = TaskRunner::new(
            &registry,
            dir.path(),
            TaskRunnerConfig {
                force: true,
                ..quiet()
            },
        );
        let summary = forced.run(&[inv("build")]).await.unwrap();
        assert_eq!(summary.executed, vec!["generate", "build"]);
    }

    #[tokio::test]
    async fn test_params_substituted() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let runner = TaskRunner::new(&registry, dir.path(), quiet());

        let invocations = registry
            .split_invocations(&["greet".to_string(), "--who=doable".to_string()])
            .unwrap();
        runner.run(&invocations).await.unwrap();
        runner.run(&[inv("greet")]).await.unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("greetings.txt")).unwrap(),
            "hello doable\nhello world\n"
        );
    }

    #[tokio::test]
    async fn test_failure_stops_run_and_keeps_earlier_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry();
        registry
            .register(
                TaskDescriptor::new("broken")
                    .task_dep("generate")
                    .shell("exit 2")
                    .shell("touch never.txt"),
            )
            .unwrap();
        let runner = TaskRunner::new(&registry, dir.path(), quiet());

        let err = runner.run(&[inv("broken")]).await.unwrap_err();
        assert!(matches!(err, DoableError::ActionFailed { code: 2, .. }));
        assert!(!dir.path().join("never.txt").exists());

        let state = StateStore::load(dir.path()).unwrap();
        assert!(state.get("generate").is_some());
        assert!(state.get("broken").is_none());
    }

    #[tokio::test]
    async fn test_missing_file_dep_without_producer() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = TaskRegistry::new();
        registry
            .register(TaskDescriptor::new("install").file_dep("installer.sh").shell("true"))
            .unwrap();
        let runner = TaskRunner::new(&registry, dir.path(), quiet());
        let err = runner.run(&[inv("install")]).await.unwrap_err();
        assert!(matches!(err, DoableError::MissingFileDep { .. }));
    }

    #[tokio::test]
    async fn test_download_action_fetches_installer_once() {
        use crate::execution::download::tests::{serve_once, INSTALLER_RESPONSE};

        let dir = tempfile::tempdir().unwrap();
        let url = serve_once(INSTALLER_RESPONSE).await;
        let mut registry = TaskRegistry::new();
        registry
            .register(
                TaskDescriptor::new("download_miniconda")
                    .target("installer.sh")
                    .uptodate(true)
                    .action(Action::Download {
                        url,
                        dest: "installer.sh".into(),
                    }),
            )
            .unwrap();
        registry
            .register(
                TaskDescriptor::new("install_miniconda")
                    .file_dep("installer.sh")
                    .shell("cp %(dependencies)s installed.sh"),
            )
            .unwrap();
        let runner = TaskRunner::new(&registry, dir.path(), quiet());

        let summary = runner.run(&[inv("install_miniconda")]).await.unwrap();
        assert_eq!(summary.executed, vec!["download_miniconda", "install_miniconda"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("installed.sh")).unwrap(),
            "#!/bin/sh\n"
        );

        // The server is gone; an existing installer must not be fetched again
        let summary = runner.run(&[inv("download_miniconda")]).await.unwrap();
        assert_eq!(summary.skipped, vec!["download_miniconda"]);
    }

    #[test]
    fn test_task_color_is_stable() {
        assert_eq!(get_task_color("docs"), get_task_color("docs"));
    }
}
