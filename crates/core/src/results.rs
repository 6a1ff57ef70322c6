//! Result types for task operations
//!
//! This module contains the values produced by compiler invocations, task runs
//! and task manager queries, providing a centralized location for output structures.

use thiserror::Error;

/// Settled value of a successful compiler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTarget {
    pub stdout: String,
    pub stderr: String,
    pub destination: Option<String>,
}

/// Settled value of a failed compiler invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("compilation failed with exit code {exit_code}")]
pub struct CompilationError {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub destination: Option<String>,
}

pub type CompilationResult = Result<CompiledTarget, CompilationError>;

/// Outcome of running one task target
#[derive(Debug, Clone)]
pub struct TargetRunReport {
    pub task_name: String,
    pub target: Option<String>,
    /// Messages the task failed with, in the order they were reported.
    pub failures: Vec<String>,
}

impl TargetRunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// `task:target`, or just `task` when no target was named
    pub fn label(&self) -> String {
        match &self.target {
            Some(target) => format!("{}:{}", self.task_name, target),
            None => self.task_name.clone(),
        }
    }
}

/// Outcome of a `run` across one or more targets
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<TargetRunReport>,
    /// Targets that were not run because an earlier one failed.
    pub skipped: Vec<String>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(|report| !report.is_success())
    }

    pub fn failed_targets(&self) -> Vec<String> {
        self.reports
            .iter()
            .filter(|report| !report.is_success())
            .map(TargetRunReport::label)
            .collect()
    }
}

/// A configured task and its targets
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: String,
    pub description: Option<String>,
    pub registered: bool,
    pub targets: Vec<String>,
}

/// Result of listing the configured tasks
#[derive(Debug)]
pub struct TaskListResult {
    pub tasks: Vec<TaskInfo>,
}
