use thiserror::Error;

/// The main error type for closure-task operations
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Target error: {0}")]
    Target(String),
}

/// Result type alias for closure-task operations
pub type TaskResult<T> = Result<T, TaskError>;
