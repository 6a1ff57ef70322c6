use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use closure_task_protocol::OptionMap;

/// One or more source patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SourceList {
    Single(String),
    Multiple(Vec<String>),
}

impl SourceList {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            SourceList::Single(pattern) => vec![pattern.as_str()],
            SourceList::Multiple(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileGroupConfig {
    #[serde(default)]
    pub src: Option<SourceList>,
    pub dest: Option<String>,
}

/// The `files` entry of a target: either a list of groups or a `dest: src` map
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FilesConfig {
    List(Vec<FileGroupConfig>),
    Map(IndexMap<String, SourceList>),
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetConfig {
    /// Options merged over the task-level options for this target only.
    pub options: Option<OptionMap>,
    pub files: Option<FilesConfig>,
    /// Compact form: a single group declared directly on the target.
    pub src: Option<SourceList>,
    pub dest: Option<String>,
}

impl TargetConfig {
    /// All file groups declared by this target, compact form first
    pub fn file_groups(&self) -> Vec<FileGroupConfig> {
        let mut groups = Vec::new();

        if self.src.is_some() || self.dest.is_some() {
            groups.push(FileGroupConfig {
                src: self.src.clone(),
                dest: self.dest.clone(),
            });
        }

        match &self.files {
            Some(FilesConfig::List(list)) => groups.extend(list.iter().cloned()),
            Some(FilesConfig::Map(map)) => {
                groups.extend(map.iter().map(|(dest, src)| FileGroupConfig {
                    src: Some(src.clone()),
                    dest: Some(dest.clone()),
                }));
            }
            None => {}
        }

        groups
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub description: Option<String>,
    /// Options shared by every target of the task.
    pub options: Option<OptionMap>,
    #[serde(default)]
    pub targets: IndexMap<String, TargetConfig>,
}
