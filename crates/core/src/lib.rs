//! Closure Task Core Library
//!
//! This is the core library of the closure-task runner. It provides the task
//! runner, the `closure-compiler` task adapter and everything needed to load a
//! workspace configuration and run its targets.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`task_manager`] - High-level interface over a loaded configuration
//! - [`closure_compiler`] - The task that forwards file groups to the compiler
//! - [`execution`] - Task runner, registry and the compiler process
//! - [`task_execution`] - Dry-run planning of compiler invocations
//! - [`files`] - Expansion of `src` patterns into file groups
//! - [`options`] - Option layering and the adapter-reserved keys
//! - [`host`] - Terminal host used by the command-line runner
//! - [`tasks`] - Target spec parsing and color management
//! - [`configs`] - Configuration parsing and schema
//! - [`results`] - Result types for compilations and runs
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The primary entry point is the [`TaskManager`]:
//!
//! ```rust,no_run
//! use closure_task_core::task_manager::{TaskManager, TaskManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> closure_task_core::types::TaskResult<()> {
//! let manager = TaskManager::new(TaskManagerConfig {
//!     workspace_root: PathBuf::from("."),
//!     config_path: None,
//! })?;
//!
//! let tasks = manager.list_targets();
//! # Ok(())
//! # }
//! ```

pub mod closure_compiler;
pub mod configs;
pub mod execution;
pub mod files;
pub mod host;
pub mod options;
pub mod results;
pub mod task_execution;
pub mod task_manager;
pub mod tasks;
pub mod types;

// Re-export the main types for easier usage
pub use task_manager::{TaskManager, TaskManagerConfig};
pub use types::{TaskError, TaskResult};
