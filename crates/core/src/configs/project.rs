use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::tasks::TaskConfig;
use crate::types::{DoableError, DoableResult};

pub const CONFIG_FILE_NAME: &str = "doable.yml";

/// Streams both stdout and stderr of every action
pub const DEFAULT_VERBOSITY: u8 = 2;

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// 0 captures all action output, 1 captures stdout only, 2 captures nothing
    pub verbosity: Option<u8>,
    /// Tasks registered after the built-in ones
    pub tasks: Option<Vec<TaskConfig>>,
}

impl ProjectConfig {
    pub fn verbosity(&self) -> u8 {
        self.verbosity.unwrap_or(DEFAULT_VERBOSITY)
    }
}

pub fn parse_project_config(yaml_str: &str) -> DoableResult<ProjectConfig> {
    let config: ProjectConfig = serde_yaml::from_str(yaml_str)?;
    if let Some(v) = config.verbosity {
        validate_verbosity(v)?;
    }
    Ok(config)
}

/// Read the config at `path`; a missing file yields the defaults
pub fn load_project_config(path: &Path) -> DoableResult<ProjectConfig> {
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        DoableError::Config(format!(
            "Failed to read project config {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_project_config(&content).map_err(|e| {
        DoableError::Config(format!(
            "Failed to parse project config {}: {}",
            path.display(),
            e
        ))
    })
}

pub fn validate_verbosity(verbosity: u8) -> DoableResult<()> {
    if verbosity > 2 {
        return Err(DoableError::Config(format!(
            "verbosity must be 0, 1 or 2, got {}",
            verbosity
        )));
    }
    Ok(())
}
