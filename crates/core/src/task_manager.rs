//! High-level task management interface
//!
//! This module provides the [`TaskManager`] which serves as the primary interface
//! for all task operations. It loads the configuration file, registers the
//! built-in tasks and resolves `task[:target]` specs into runnable requests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use closure_task_core::host::ConsoleHost;
//! use closure_task_core::task_manager::{TaskManager, TaskManagerConfig};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # async fn example() -> closure_task_core::types::TaskResult<()> {
//! let manager = TaskManager::new(TaskManagerConfig {
//!     workspace_root: PathBuf::from("."),
//!     config_path: None,
//! })?;
//!
//! // List configured tasks
//! let tasks = manager.list_targets();
//!
//! // Show what a run would do
//! let plan = manager.get_execution_plan("closure-compiler:app")?;
//!
//! // Run every target of a task
//! let host = Arc::new(ConsoleHost::new(".", false));
//! let summary = manager.run("closure-compiler", host, false).await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use closure_task_protocol::TaskHost;

use crate::closure_compiler::ClosureCompilerTask;
use crate::configs::tasks::TaskConfig;
use crate::configs::workspace::{parse_workspace_config, WorkspaceConfig};
use crate::execution::command::ProcessCompiler;
use crate::execution::runner::{TargetRequest, TaskRegistry, TaskRunner};
use crate::files::expand_file_groups;
use crate::options::merge_options;
use crate::results::{RunSummary, TaskInfo, TaskListResult};
use crate::task_execution::{resolve_target_plan, TaskExecutionPlan};
use crate::tasks::parse_target_spec;
use crate::types::{TaskError, TaskResult};

/// Configuration file looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = "closure-task.yml";

/// Configuration for initializing a task manager
pub struct TaskManagerConfig {
    pub workspace_root: PathBuf,
    /// Overrides `<workspace_root>/closure-task.yml`.
    pub config_path: Option<PathBuf>,
}

/// High-level task manager that encapsulates all task operations
pub struct TaskManager {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
    registry: Arc<TaskRegistry>,
    compiler: Arc<ProcessCompiler>,
}

impl TaskManager {
    /// Load the configuration file and register the built-in tasks
    pub fn new(config: TaskManagerConfig) -> TaskResult<Self> {
        let config_path = config
            .config_path
            .unwrap_or_else(|| config.workspace_root.join(CONFIG_FILE_NAME));
        let workspace_config = Self::load_config(&config_path)?;
        Self::from_config(config.workspace_root, workspace_config)
    }

    /// Build from an already parsed configuration
    pub fn from_config(root: PathBuf, config: WorkspaceConfig) -> TaskResult<Self> {
        let compiler = Arc::new(ProcessCompiler::from_config(&root, config.compiler.as_ref())?);

        let mut registry = TaskRegistry::new();
        ClosureCompilerTask::register(&mut registry, compiler.clone());

        Ok(Self {
            root,
            config,
            registry: Arc::new(registry),
            compiler,
        })
    }

    /// List the configured tasks and their targets
    pub fn list_targets(&self) -> TaskListResult {
        let tasks = self
            .config
            .tasks
            .iter()
            .map(|(name, task)| {
                let registered = self.registry.get(name);
                TaskInfo {
                    name: name.clone(),
                    description: task
                        .description
                        .clone()
                        .or_else(|| registered.map(|r| r.description.clone())),
                    registered: registered.is_some(),
                    targets: task.targets.keys().cloned().collect(),
                }
            })
            .collect();

        TaskListResult { tasks }
    }

    /// Resolve what `run` would do for `spec` without starting the compiler
    pub fn get_execution_plan(&self, spec: &str) -> TaskResult<TaskExecutionPlan> {
        let (task_name, requests) = self.resolve_targets(spec)?;
        let targets = requests
            .iter()
            .map(|request| resolve_target_plan(request, &self.root, &self.compiler))
            .collect();

        Ok(TaskExecutionPlan { task_name, targets })
    }

    /// Run every target selected by `spec` in declaration order
    ///
    /// A failing target stops the run unless `force` is set; the targets not
    /// reached are recorded in [`RunSummary::skipped`].
    pub async fn run(
        &self,
        spec: &str,
        host: Arc<dyn TaskHost>,
        force: bool,
    ) -> TaskResult<RunSummary> {
        let (_, requests) = self.resolve_targets(spec)?;
        let runner = TaskRunner::new(self.registry.clone(), host);
        let mut summary = RunSummary::default();

        let mut pending = requests.into_iter();
        for request in pending.by_ref() {
            let report = runner.run_target(request).await?;
            let failed = !report.is_success();
            summary.reports.push(report);

            if failed && !force {
                tracing::debug!("Stopping after failed target");
                break;
            }
        }

        summary.skipped = pending
            .map(|request| match request.target {
                Some(target) => format!("{}:{}", request.task_name, target),
                None => request.task_name,
            })
            .collect();

        Ok(summary)
    }

    // Private helper methods

    fn load_config(config_path: &Path) -> TaskResult<WorkspaceConfig> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            TaskError::Config(format!(
                "Failed to read config {}: {}",
                config_path.display(),
                e
            ))
        })?;

        parse_workspace_config(&content).map_err(|e| {
            TaskError::Config(format!(
                "Failed to parse config {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    fn resolve_targets(&self, spec: &str) -> TaskResult<(String, Vec<TargetRequest>)> {
        let (task_name, target) = parse_target_spec(spec);

        let task = self
            .config
            .tasks
            .get(&task_name)
            .ok_or_else(|| TaskError::Task(format!("Task '{}' is not configured", task_name)))?;

        if !self.registry.contains(&task_name) {
            return Err(TaskError::Task(format!(
                "Task '{}' is configured but no such task is registered",
                task_name
            )));
        }

        let requests = match target {
            Some(target) => {
                if !task.targets.contains_key(&target) {
                    return Err(TaskError::Target(format!(
                        "Target '{}' not found in task '{}'",
                        target, task_name
                    )));
                }
                vec![self.target_request(&task_name, task, &target)?]
            }
            None => task
                .targets
                .keys()
                .map(|target| self.target_request(&task_name, task, target))
                .collect::<TaskResult<Vec<_>>>()?,
        };

        Ok((task_name, requests))
    }

    fn target_request(
        &self,
        task_name: &str,
        task: &TaskConfig,
        target: &str,
    ) -> TaskResult<TargetRequest> {
        let target_config = task.targets.get(target).ok_or_else(|| {
            TaskError::Target(format!("Target '{}' not found in task '{}'", target, task_name))
        })?;

        let files = expand_file_groups(&self.root, &target_config.file_groups())?;
        let options = merge_options(
            task.options
                .iter()
                .chain(target_config.options.iter()),
        );

        Ok(TargetRequest {
            task_name: task_name.to_string(),
            target: Some(target.to_string()),
            files,
            options,
        })
    }
}
