//! Configuration parsing
//!
//! The whole configuration lives in one YAML file: the compiler command in
//! [`workspace`] and the task/target definitions in [`tasks`].

pub mod tasks;
pub mod workspace;

use crate::types::TaskResult;
use workspace::WorkspaceConfig;

/// JSON schema of the configuration file, pretty-printed
pub fn config_schema() -> TaskResult<String> {
    let schema = schemars::schema_for!(WorkspaceConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
