use thiserror::Error;

/// The main error type for doable operations
#[derive(Debug, Error)]
pub enum DoableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task '{0}' not found")]
    UnknownTask(String),

    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Circular dependency detected: {0}")]
    DependencyCycle(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Task '{task}' requires '{path}' which does not exist")]
    MissingFileDep { task: String, path: String },

    #[error("Task '{task}': command '{command}' failed with exit code {code}{output}")]
    ActionFailed {
        task: String,
        command: String,
        code: i32,
        output: String,
    },

    #[error("Download error: {0}")]
    Download(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

/// Result type alias for doable operations
pub type DoableResult<T> = Result<T, DoableError>;
