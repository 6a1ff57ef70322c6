use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::tasks::TaskConfig;
use crate::types::TaskResult;

/// Program used when the configuration does not name one.
pub const DEFAULT_COMPILER_PROGRAM: &str = "google-closure-compiler";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    Single(String),
    Multiple(Vec<String>),
}

impl Command {
    /// Split into the program and the arguments that precede every invocation
    pub fn program_and_args(&self) -> Option<(&str, &[String])> {
        match self {
            Command::Single(program) => Some((program.as_str(), &[])),
            Command::Multiple(parts) => parts
                .split_first()
                .map(|(program, rest)| (program.as_str(), rest)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerConfig {
    /// Compiler command, e.g. `["java", "-jar", "closure-compiler.jar"]`.
    pub command: Option<Command>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub compiler: Option<CompilerConfig>,
    /// Task configurations keyed by registered task name.
    #[serde(default)]
    pub tasks: IndexMap<String, TaskConfig>,
}

pub fn parse_workspace_config(yaml_str: &str) -> TaskResult<WorkspaceConfig> {
    let config: WorkspaceConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}
