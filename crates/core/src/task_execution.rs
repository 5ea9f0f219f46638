use std::fmt;
use std::path::{Path, PathBuf};

use crate::execution::dependencies::resolve_execution_order;
use crate::params::{parse_params, ParamValues};
use crate::registry::{Invocation, TaskRegistry};
use crate::state::{digest_file, StateStore};
use crate::task::TaskDescriptor;
use crate::types::DoableResult;

/// Why a task has to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReason {
    Forced,
    /// Declares no `uptodate`, `targets` or `file_dep`
    Untracked,
    UptodateFalse,
    MissingTarget(PathBuf),
    MissingFileDep(PathBuf),
    ChangedFileDep(PathBuf),
    /// Has file dependencies but no successful run on record
    NeverRun,
}

impl fmt::Display for RunReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunReason::Forced => f.write_str("forced"),
            RunReason::Untracked => f.write_str("always runs"),
            RunReason::UptodateFalse => f.write_str("uptodate check is false"),
            RunReason::MissingTarget(p) => write!(f, "target {} missing", p.display()),
            RunReason::MissingFileDep(p) => write!(f, "file dependency {} missing", p.display()),
            RunReason::ChangedFileDep(p) => write!(f, "{} changed", p.display()),
            RunReason::NeverRun => f.write_str("never run"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    UpToDate,
    Run(RunReason),
}

impl TaskStatus {
    pub fn should_run(&self) -> bool {
        matches!(self, TaskStatus::Run(_))
    }
}

/// Decide whether `task` can be skipped.
///
/// A task is up to date only when it declares something to check, every
/// `uptodate` entry is true, every target exists and every file dependency
/// matches the digest recorded at its last successful run.
///
/// Declaring only `targets` is enough to make a task skippable: once every
/// target exists it is up to date, even without `file_dep` or `uptodate`.
pub fn check_task_status(
    root: &Path,
    task: &TaskDescriptor,
    state: &StateStore,
    force: bool,
) -> DoableResult<TaskStatus> {
    if force {
        return Ok(TaskStatus::Run(RunReason::Forced));
    }
    if !task.is_trackable() {
        return Ok(TaskStatus::Run(RunReason::Untracked));
    }
    if task.uptodate.iter().any(|ok| !ok) {
        return Ok(TaskStatus::Run(RunReason::UptodateFalse));
    }

    if let Some(missing) = task.targets.iter().find(|t| !root.join(t).exists()) {
        return Ok(TaskStatus::Run(RunReason::MissingTarget(missing.clone())));
    }

    if task.file_dep.is_empty() {
        return Ok(TaskStatus::UpToDate);
    }

    let Some(record) = state.get(&task.name) else {
        return Ok(TaskStatus::Run(RunReason::NeverRun));
    };

    for dep in &task.file_dep {
        let full = root.join(dep);
        if !full.exists() {
            return Ok(TaskStatus::Run(RunReason::MissingFileDep(dep.clone())));
        }
        let recorded = record.file_dep.get(&dep.display().to_string());
        if recorded != Some(&digest_file(&full)?) {
            return Ok(TaskStatus::Run(RunReason::ChangedFileDep(dep.clone())));
        }
    }

    Ok(TaskStatus::UpToDate)
}

/// One step of an execution plan
#[derive(Debug, Clone)]
pub struct PlannedTask {
    pub name: String,
    pub params: ParamValues,
    pub status: TaskStatus,
}

/// Tasks to execute for a request, dependencies first
#[derive(Debug, Clone)]
pub struct TaskExecutionPlan {
    pub requested: Vec<String>,
    pub tasks: Vec<PlannedTask>,
}

/// Resolve the tasks `invocations` need, parse their parameters and compute
/// each one's current status.
///
/// Tasks pulled in as dependencies get their default parameters. If a task is
/// requested twice the later arguments win.
pub fn resolve_task_execution_plan(
    registry: &TaskRegistry,
    invocations: &[Invocation],
    root: &Path,
    state: &StateStore,
    force: bool,
) -> DoableResult<TaskExecutionPlan> {
    let requested: Vec<String> = invocations.iter().map(|i| i.task.clone()).collect();
    let order = resolve_execution_order(registry, &requested)?;

    let mut tasks = Vec::with_capacity(order.len());
    for name in order {
        let task = registry.require(&name)?;
        let args = invocations
            .iter()
            .rev()
            .find(|i| i.task == name)
            .map(|i| i.args.as_slice())
            .unwrap_or_default();
        let params = parse_params(&task.params, args)?;
        let status = check_task_status(root, task, state, force)?;
        tasks.push(PlannedTask {
            name,
            params,
            status,
        });
    }

    Ok(TaskExecutionPlan { requested, tasks })
}
