//! Result types for workspace operations
//!
//! This module contains all result types returned by workspace manager operations,
//! providing a centralized location for output structures.

use std::path::PathBuf;

use crate::params::Param;
use crate::task::TaskDescriptor;

/// Summary line for one registered task
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: String,
    pub doc: Option<String>,
    pub task_dep: Vec<String>,
    pub params: Vec<Param>,
}

/// Result of listing the registry
#[derive(Debug)]
pub struct TaskListResult {
    pub tasks: Vec<TaskInfo>,
}

/// Result of getting the dependency graph
#[derive(Debug)]
pub struct DependencyGraphResult {
    pub graph: petgraph::Graph<String, ()>,
    pub cycles: Vec<Vec<String>>,
}

/// What a run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Files removed (or already absent) by `clean`
#[derive(Debug, Default)]
pub struct CleanResult {
    pub removed: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

impl From<&TaskDescriptor> for TaskInfo {
    fn from(task: &TaskDescriptor) -> Self {
        Self {
            name: task.name.clone(),
            doc: task.doc.clone(),
            task_dep: task.task_dep.clone(),
            params: task.params.clone(),
        }
    }
}
