//! Task descriptors
//!
//! A [`TaskDescriptor`] is plain data: the actions to run, the files it reads
//! and writes, the tasks that must finish first, an up-to-date policy and the
//! command-line parameters its actions are templated with. Descriptors are
//! built fresh for every invocation and never mutated after registration.

use std::fmt;
use std::path::PathBuf;

use crate::params::{Param, ParamValues};

/// A single unit of work inside a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A command line handed to the platform shell after parameter substitution
    Shell(String),
    /// Fetch `url` in-process and write the body to `dest`
    Download { url: String, dest: PathBuf },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shell(cmd) => f.write_str(cmd),
            Action::Download { url, dest } => {
                write!(f, "download {} -> {}", url, dest.display())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDescriptor {
    pub name: String,
    pub doc: Option<String>,
    pub actions: Vec<Action>,
    pub targets: Vec<PathBuf>,
    pub file_dep: Vec<PathBuf>,
    pub task_dep: Vec<String>,
    /// Every entry must be `true` for the task to be skippable
    pub uptodate: Vec<bool>,
    pub params: Vec<Param>,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn shell(mut self, cmd: impl Into<String>) -> Self {
        self.actions.push(Action::Shell(cmd.into()));
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.targets.push(path.into());
        self
    }

    pub fn file_dep(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_dep.push(path.into());
        self
    }

    pub fn task_dep(mut self, name: impl Into<String>) -> Self {
        self.task_dep.push(name.into());
        self
    }

    pub fn uptodate(mut self, value: bool) -> Self {
        self.uptodate.push(value);
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Look up a declared parameter by name
    pub fn find_param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Values available to `%(name)s` placeholders: `targets` and
    /// `dependencies` (space separated paths) plus the task's parameters
    pub fn substitution_values(&self, params: &ParamValues) -> ParamValues {
        let join = |paths: &[PathBuf]| {
            paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut values = ParamValues::new();
        values.insert("targets".to_string(), join(&self.targets));
        values.insert("dependencies".to_string(), join(&self.file_dep));
        values.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        values
    }

    /// Whether the task declares anything an up-to-date check could use.
    ///
    /// Tasks without `uptodate`, `targets` or `file_dep` always run.
    pub fn is_trackable(&self) -> bool {
        !self.uptodate.is_empty() || !self.targets.is_empty() || !self.file_dep.is_empty()
    }
}
