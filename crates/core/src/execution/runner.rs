//! Task registry and runner
//!
//! Tasks register a handler under a name. Running a target builds a
//! [`TaskContext`] (files, options, host) and hands it to the handler. A
//! handler that finishes synchronously simply returns; a handler with
//! outstanding work calls [`TaskContext::async_done`] and signals the returned
//! [`AsyncDone`] once that work has settled.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use tokio::sync::oneshot;

use closure_task_protocol::{FileGroup, OptionMap, TaskHost};

use crate::options::merge_options;
use crate::results::TargetRunReport;
use crate::types::{TaskError, TaskResult};

/// A task that runs once per configured target
pub trait MultiTask: Send + Sync {
    fn run(&self, ctx: TaskContext);
}

#[derive(Clone)]
pub struct RegisteredTask {
    pub name: String,
    pub description: String,
    pub handler: Arc<dyn MultiTask>,
}

impl std::fmt::Debug for RegisteredTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTask")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registered task handlers, in registration order
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: IndexMap<String, RegisteredTask>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any earlier registration
    pub fn register_multi_task(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn MultiTask>,
    ) {
        let name = name.into();
        let task = RegisteredTask {
            name: name.clone(),
            description: description.into(),
            handler,
        };
        if self.tasks.insert(name.clone(), task).is_some() {
            tracing::debug!(task = %name, "Replaced existing task registration");
        }
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTask> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &RegisteredTask> {
        self.tasks.values()
    }
}

/// Completion signal for an asynchronous task run
///
/// Cloneable; the first call to [`AsyncDone::done`] completes the run and
/// later calls are ignored.
#[derive(Clone)]
pub struct AsyncDone {
    sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl AsyncDone {
    fn new(sender: oneshot::Sender<()>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }

    pub fn done(&self) {
        if let Some(sender) = lock(&self.sender).take() {
            let _ = sender.send(());
        }
    }
}

/// Everything a handler sees about the target it is running
pub struct TaskContext {
    task_name: String,
    target: Option<String>,
    files: Vec<FileGroup>,
    options: OptionMap,
    host: Arc<dyn TaskHost>,
    done: AsyncDone,
    is_async: Arc<AtomicBool>,
}

impl TaskContext {
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn files(&self) -> &[FileGroup] {
        &self.files
    }

    pub fn host(&self) -> Arc<dyn TaskHost> {
        self.host.clone()
    }

    /// Configured options laid over `defaults`
    pub fn options(&self, defaults: OptionMap) -> OptionMap {
        merge_options([&defaults, &self.options])
    }

    /// Switch the run to asynchronous mode and return its completion signal
    pub fn async_done(&self) -> AsyncDone {
        self.is_async.store(true, Ordering::SeqCst);
        self.done.clone()
    }
}

/// Input for a single target run
#[derive(Debug, Clone, Default)]
pub struct TargetRequest {
    pub task_name: String,
    pub target: Option<String>,
    pub files: Vec<FileGroup>,
    /// Task-level and target-level options, already merged.
    pub options: OptionMap,
}

/// Runs registered tasks against a host
pub struct TaskRunner {
    registry: Arc<TaskRegistry>,
    host: Arc<dyn TaskHost>,
}

impl TaskRunner {
    pub fn new(registry: Arc<TaskRegistry>, host: Arc<dyn TaskHost>) -> Self {
        Self { registry, host }
    }

    /// Run one target and wait until the handler reports completion
    pub async fn run_target(&self, request: TargetRequest) -> TaskResult<TargetRunReport> {
        let task = self.registry.get(&request.task_name).ok_or_else(|| {
            TaskError::Task(format!("Task '{}' is not registered", request.task_name))
        })?;

        let label = match &request.target {
            Some(target) => format!("{}:{}", request.task_name, target),
            None => request.task_name.clone(),
        };
        self.host
            .log_header(&format!("Running \"{}\" ({}) task", label, task.name));

        let tracker = Arc::new(FailureTracker::new(self.host.clone()));
        let (sender, receiver) = oneshot::channel();
        let is_async = Arc::new(AtomicBool::new(false));

        let ctx = TaskContext {
            task_name: request.task_name.clone(),
            target: request.target.clone(),
            files: request.files,
            options: request.options,
            host: tracker.clone(),
            done: AsyncDone::new(sender),
            is_async: is_async.clone(),
        };

        tracing::debug!(task = %label, "Running task target");
        task.handler.run(ctx);

        if is_async.load(Ordering::SeqCst) && receiver.await.is_err() {
            tracing::warn!(task = %label, "Task dropped its completion signal without calling done");
        }

        Ok(TargetRunReport {
            task_name: request.task_name,
            target: request.target,
            failures: tracker.failures(),
        })
    }
}

/// Host wrapper that remembers every failure reported through it
struct FailureTracker {
    inner: Arc<dyn TaskHost>,
    failures: Mutex<Vec<String>>,
}

impl FailureTracker {
    fn new(inner: Arc<dyn TaskHost>) -> Self {
        Self {
            inner,
            failures: Mutex::new(Vec::new()),
        }
    }

    fn failures(&self) -> Vec<String> {
        lock(&self.failures).clone()
    }
}

impl TaskHost for FailureTracker {
    fn file_exists(&self, path: &Path) -> bool {
        self.inner.file_exists(path)
    }

    fn log_header(&self, message: &str) {
        self.inner.log_header(message);
    }

    fn log_ok(&self, message: &str) {
        self.inner.log_ok(message);
    }

    fn log_warn(&self, message: &str) {
        self.inner.log_warn(message);
    }

    fn fail_warn(&self, message: &str) {
        lock(&self.failures).push(message.to_string());
        self.inner.fail_warn(message);
    }

    fn verbose_write(&self, text: &str) {
        self.inner.verbose_write(text);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
