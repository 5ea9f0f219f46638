use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::params::{expand_home, Param, ParamType};
use crate::task::TaskDescriptor;
use crate::types::{DoableError, DoableResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    Single(String),
    Multiple(Vec<String>),
}

impl Command {
    fn into_vec(self) -> Vec<String> {
        match self {
            Command::Single(cmd) => vec![cmd],
            Command::Multiple(cmds) => cmds,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParamConfig {
    pub name: String,
    /// Long flag; defaults to the parameter name
    pub long: Option<String>,
    pub short: Option<char>,
    #[serde(rename = "type", default)]
    pub kind: ParamType,
    pub default: Option<serde_json::Value>,
    pub help: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    pub doc: Option<String>,
    /// Shell commands, run in order
    pub actions: Command,
    pub targets: Option<Vec<String>>,
    pub file_dep: Option<Vec<String>>,
    pub task_dep: Option<Vec<String>>,
    pub uptodate: Option<Vec<bool>>,
    pub params: Option<Vec<ParamConfig>>,
}

impl ParamConfig {
    pub fn into_param(self) -> DoableResult<Param> {
        let default = match self.default {
            None => match self.kind {
                ParamType::String => String::new(),
                ParamType::Integer => "0".to_string(),
                ParamType::Boolean => "false".to_string(),
            },
            Some(serde_json::Value::String(s)) => expand_home(&s),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Bool(b)) => b.to_string(),
            Some(other) => {
                return Err(DoableError::Config(format!(
                    "Parameter '{}' has an unsupported default: {:?}",
                    self.name, other
                )))
            }
        };

        let param = Param {
            long: self.long.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            short: self.short,
            kind: self.kind,
            default: String::new(),
            help: self.help,
        };
        let default = param.validate(&default).map_err(|e| {
            DoableError::Config(format!("Parameter '{}' default: {}", param.name, e))
        })?;

        Ok(Param { default, ..param })
    }
}

impl TaskConfig {
    pub fn into_descriptor(self) -> DoableResult<TaskDescriptor> {
        let mut task = TaskDescriptor::new(self.name);
        task.doc = self.doc;
        for cmd in self.actions.into_vec() {
            task = task.shell(cmd);
        }
        task.targets = self
            .targets
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();
        task.file_dep = self
            .file_dep
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();
        task.task_dep = self.task_dep.unwrap_or_default();
        task.uptodate = self.uptodate.unwrap_or_default();
        task.params = self
            .params
            .unwrap_or_default()
            .into_iter()
            .map(ParamConfig::into_param)
            .collect::<DoableResult<_>>()?;
        Ok(task)
    }
}
