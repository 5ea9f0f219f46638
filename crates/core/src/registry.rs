//! The task registry
//!
//! Maps task names to descriptors, preserving registration order so listings
//! and plans are stable between runs.

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::platform::Platform;
use crate::task::TaskDescriptor;
use crate::tasks::builtin_tasks;
use crate::types::{DoableError, DoableResult};

/// A requested task together with the raw arguments that followed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub task: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TaskRegistry {
    tasks: IndexMap<String, TaskDescriptor>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in setup, lint, test and docs tasks
    pub fn builtin(platform: Platform) -> DoableResult<Self> {
        let mut registry = Self::new();
        for task in builtin_tasks(platform) {
            registry.register(task)?;
        }
        Ok(registry)
    }

    /// Add a task; names must be unique
    pub fn register(&mut self, task: TaskDescriptor) -> DoableResult<()> {
        if self.tasks.contains_key(&task.name) {
            return Err(DoableError::DuplicateTask(task.name));
        }
        debug!(task = %task.name, "registered task");
        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TaskDescriptor> {
        self.tasks.get(name)
    }

    /// Like [`get`](Self::get) but unknown names are an error
    pub fn require(&self, name: &str) -> DoableResult<&TaskDescriptor> {
        self.get(name)
            .ok_or_else(|| DoableError::UnknownTask(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The first task listing `path` among its targets
    pub fn producer_of(&self, path: &Path) -> Option<&TaskDescriptor> {
        self.iter().find(|t| t.targets.iter().any(|target| target == path))
    }

    /// Check that every `task_dep` names a registered task
    pub fn validate(&self) -> DoableResult<()> {
        for task in self.iter() {
            for dep in &task.task_dep {
                if !self.contains(dep) {
                    return Err(DoableError::UnknownTask(format!(
                        "{} (required by '{}')",
                        dep, task.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Split a command line like `create_env --name x tests` into per-task
    /// invocations.
    ///
    /// A bare word starts a new invocation unless it is the value of the
    /// preceding option of the current task.
    pub fn split_invocations(&self, args: &[String]) -> DoableResult<Vec<Invocation>> {
        let mut invocations: Vec<Invocation> = Vec::new();
        let mut expects_value = false;

        for arg in args {
            if expects_value {
                if let Some(current) = invocations.last_mut() {
                    current.args.push(arg.clone());
                }
                expects_value = false;
                continue;
            }

            if arg.starts_with('-') {
                let current = invocations.last_mut().ok_or_else(|| {
                    DoableError::InvalidParam(format!("option '{}' given before any task", arg))
                })?;
                if !arg.contains('=') {
                    let task = self.require(&current.task)?;
                    expects_value = task
                        .params
                        .iter()
                        .any(|p| p.matches_flag(arg) && p.takes_value());
                }
                current.args.push(arg.clone());
                continue;
            }

            self.require(arg)?;
            invocations.push(Invocation::new(arg.clone()));
        }

        Ok(invocations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Param;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_registry_names_in_order() {
        let registry = TaskRegistry::builtin(Platform::Linux).unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "download_miniconda",
                "install_miniconda",
                "create_env",
                "install_required_dependencies",
                "install_test_dependencies",
                "install_doc_dependencies",
                "lint",
                "tests",
                "docs",
            ]
        );
        registry.validate().unwrap();
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let mut registry = TaskRegistry::new();
        assert!(registry.is_empty());
        registry.register(TaskDescriptor::new("lint")).unwrap();
        assert!(!registry.is_empty());
        let err = registry.register(TaskDescriptor::new("lint")).unwrap_err();
        assert!(matches!(err, DoableError::DuplicateTask(name) if name == "lint"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_validate_reports_dangling_task_dep() {
        let mut registry = TaskRegistry::new();
        registry
            .register(TaskDescriptor::new("docs").task_dep("build"))
            .unwrap();
        let err = registry.validate().unwrap_err();
        assert!(err.to_string().contains("build (required by 'docs')"));
    }

    #[test]
    fn test_producer_of() {
        let registry = TaskRegistry::builtin(Platform::Darwin).unwrap();
        let producer = registry
            .producer_of(Path::new("Miniconda3-latest-MacOSX-x86_64.sh"))
            .unwrap();
        assert_eq!(producer.name, "download_miniconda");
        assert!(registry.producer_of(Path::new("nope")).is_none());
    }

    #[test]
    fn test_split_invocations() {
        let mut registry = TaskRegistry::new();
        registry
            .register(TaskDescriptor::new("create_env").param(Param::string("name", "env")))
            .unwrap();
        registry.register(TaskDescriptor::new("tests")).unwrap();

        // "tests" is a task name but here it is the value of --name
        let invocations = registry
            .split_invocations(&args(&["create_env", "--name", "tests", "tests"]))
            .unwrap();
        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[0].task, "create_env");
        assert_eq!(invocations[0].args, args(&["--name", "tests"]));
        assert_eq!(invocations[1].task, "tests");
        assert!(invocations[1].args.is_empty());
    }

    #[test]
    fn test_split_invocations_errors() {
        let registry = TaskRegistry::builtin(Platform::Linux).unwrap();
        assert!(matches!(
            registry.split_invocations(&args(&["nope"])),
            Err(DoableError::UnknownTask(_))
        ));
        assert!(matches!(
            registry.split_invocations(&args(&["--location", "/x"])),
            Err(DoableError::InvalidParam(_))
        ));
    }
}
