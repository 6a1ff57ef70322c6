//! Task execution module
//!
//! This module handles running registered tasks per target, turning
//! invocations into compiler command lines and running the compiler process.

pub mod args;
pub mod command;
pub mod runner;

pub use command::ProcessCompiler;
pub use runner::{
    AsyncDone, MultiTask, RegisteredTask, TargetRequest, TaskContext, TaskRegistry, TaskRunner,
};
