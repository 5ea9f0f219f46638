//! High-level workspace management interface
//!
//! This module provides the [`WorkspaceManager`] which serves as the primary interface
//! for all operations on a project directory. It loads `doable.yml`, builds the task
//! registry for the current platform, and exposes listing, planning, running and
//! housekeeping on top of it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use doable_core::workspace_manager::{RunOptions, WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> doable_core::types::DoableResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//!     config_path: None,
//!     platform: None,
//! })?;
//!
//! let args = vec!["create_env".to_string(), "--python".to_string(), "3.7".to_string()];
//! let plan = manager.get_execution_plan(&args, false)?;
//! manager.run_tasks(&args, RunOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::configs::project::{load_project_config, validate_verbosity, ProjectConfig, CONFIG_FILE_NAME};
use crate::execution::dependencies::{build_dependency_graph, find_cycles};
use crate::execution::runner::{TaskRunner, TaskRunnerConfig};
use crate::platform::Platform;
use crate::registry::TaskRegistry;
use crate::results::{CleanResult, DependencyGraphResult, RunSummary, TaskInfo, TaskListResult};
use crate::state::StateStore;
use crate::task::TaskDescriptor;
use crate::task_execution::{resolve_task_execution_plan, TaskExecutionPlan};
use crate::types::{DoableError, DoableResult};

/// Configuration for initializing a workspace manager
pub struct WorkspaceManagerConfig {
    pub workspace_root: PathBuf,
    /// Defaults to `<workspace_root>/doable.yml`
    pub config_path: Option<PathBuf>,
    /// Defaults to the platform the binary runs on
    pub platform: Option<Platform>,
}

/// Per-run overrides supplied on the command line
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub verbosity: Option<u8>,
    pub force: bool,
}

pub struct WorkspaceManager {
    pub root: PathBuf,
    pub platform: Platform,
    pub registry: TaskRegistry,
    pub project_config: ProjectConfig,
}

impl WorkspaceManager {
    pub fn new(config: WorkspaceManagerConfig) -> DoableResult<Self> {
        let platform = match config.platform {
            Some(platform) => platform,
            None => Platform::current()?,
        };

        let config_path = config
            .config_path
            .unwrap_or_else(|| config.workspace_root.join(CONFIG_FILE_NAME));
        let project_config = load_project_config(&config_path)?;

        let registry = Self::build_registry(platform, &project_config)?;
        debug!(%platform, tasks = registry.len(), "workspace initialised");

        Ok(Self {
            root: config.workspace_root,
            platform,
            registry,
            project_config,
        })
    }

    /// All tasks in registration order
    pub fn list_tasks(&self) -> TaskListResult {
        TaskListResult {
            tasks: self.registry.iter().map(TaskInfo::from).collect(),
        }
    }

    pub fn task_info(&self, name: &str) -> DoableResult<&TaskDescriptor> {
        self.registry.require(name)
    }

    /// Resolve `args` (task names each followed by its options) into a plan
    pub fn get_execution_plan(&self, args: &[String], force: bool) -> DoableResult<TaskExecutionPlan> {
        let invocations = self.registry.split_invocations(args)?;
        if invocations.is_empty() {
            return Err(DoableError::InvalidParam("no task given".to_string()));
        }
        let state = StateStore::load(&self.root)?;
        resolve_task_execution_plan(&self.registry, &invocations, &self.root, &state, force)
    }

    pub async fn run_tasks(&self, args: &[String], options: RunOptions) -> DoableResult<RunSummary> {
        let invocations = self.registry.split_invocations(args)?;
        if invocations.is_empty() {
            return Err(DoableError::InvalidParam("no task given".to_string()));
        }

        let verbosity = match options.verbosity {
            Some(v) => {
                validate_verbosity(v)?;
                v
            }
            None => self.project_config.verbosity(),
        };

        let runner = TaskRunner::new(
            &self.registry,
            &self.root,
            TaskRunnerConfig {
                verbosity,
                force: options.force,
            },
        );
        runner.run(&invocations).await
    }

    pub fn get_dependency_graph(&self) -> DoableResult<DependencyGraphResult> {
        let graph = build_dependency_graph(&self.registry)?;
        let cycles = find_cycles(&graph);
        Ok(DependencyGraphResult { graph, cycles })
    }

    /// Drop recorded state for one task, or for all tasks when `task` is `None`.
    ///
    /// Returns the names whose state was removed.
    pub fn forget(&self, task: Option<&str>) -> DoableResult<Vec<String>> {
        let mut state = StateStore::load(&self.root)?;
        let forgotten = match task {
            Some(name) => {
                self.registry.require(name)?;
                if state.forget(name) {
                    vec![name.to_string()]
                } else {
                    Vec::new()
                }
            }
            None => {
                let names: Vec<String> = self
                    .registry
                    .names()
                    .filter(|name| state.get(name).is_some())
                    .map(str::to_string)
                    .collect();
                state.forget_all();
                names
            }
        };
        state.save()?;
        Ok(forgotten)
    }

    /// Delete the targets of `tasks`, or of every task when empty
    pub fn clean(&self, tasks: &[String]) -> DoableResult<CleanResult> {
        let selected: Vec<&TaskDescriptor> = if tasks.is_empty() {
            self.registry.iter().collect()
        } else {
            tasks
                .iter()
                .map(|name| self.registry.require(name))
                .collect::<DoableResult<_>>()?
        };

        let mut result = CleanResult::default();
        for task in selected {
            for target in &task.targets {
                let full = self.root.join(target);
                if remove_target(&full)? {
                    result.removed.push(target.clone());
                } else {
                    result.missing.push(target.clone());
                }
            }
        }
        Ok(result)
    }

    /// JSON schema of `doable.yml`
    pub fn config_schema() -> DoableResult<serde_json::Value> {
        Ok(serde_json::to_value(schemars::schema_for!(ProjectConfig))?)
    }

    fn build_registry(platform: Platform, config: &ProjectConfig) -> DoableResult<TaskRegistry> {
        let mut registry = TaskRegistry::builtin(platform)?;

        for task_config in config.tasks.iter().flatten() {
            let task = task_config.clone().into_descriptor()?;
            registry.register(task)?;
        }

        registry.validate()?;
        Ok(registry)
    }
}

/// Remove a target file, or a directory if it is empty
fn remove_target(path: &Path) -> DoableResult<bool> {
    if path.is_dir() {
        match std::fs::remove_dir(path) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Not removing non-empty directory {}: {}", path.display(), e);
                Ok(false)
            }
        }
    } else if path.exists() {
        std::fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
