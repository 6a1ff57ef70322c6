//! Core types shared between the task adapter, its host and the compiler.
//!
//! This module contains the data that crosses the boundaries of the adapter:
//! - [`OptionMap`] - Compiler options as configured by the user
//! - [`FileGroup`] - One resolved source list / destination mapping
//! - [`CompilerInvocation`] - The single argument handed to a [`Compiler`](crate::Compiler)
//! - [`CompilationOutcome`] - What the compiler reports back through its callback

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// Compiler options keyed by flag name.
///
/// Values are kept as JSON so that arbitrary compiler flags can be passed
/// through verbatim. The map preserves insertion order, which keeps the
/// generated command line in configuration order.
pub type OptionMap = serde_json::Map<String, JsonValue>;

/// Option key holding the list of input sources.
pub const JS_OPTION: &str = "js";

/// Option key holding the output file path.
pub const JS_OUTPUT_FILE_OPTION: &str = "js_output_file";

/// Adapter-reserved option: whether targets must have input files.
pub const REQUIRE_INPUT_FILES_OPTION: &str = "requireInputFiles";

/// Adapter-reserved option: raw argument list that bypasses option assembly.
pub const ARGS_OPTION: &str = "args";

/// A single source/destination mapping handed to a task by its runner.
///
/// The runner has already expanded any patterns in `src`, but it does not
/// guarantee that every listed path exists. Consumers are expected to check
/// existence themselves (see [`TaskHost::file_exists`](crate::TaskHost::file_exists)).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGroup {
    /// Source paths in configuration order.
    pub src: Vec<PathBuf>,

    /// Destination path, if the group declares one.
    pub dest: Option<PathBuf>,
}

impl FileGroup {
    /// Create a new `FileGroup`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use closure_task_protocol::FileGroup;
    /// let group = FileGroup::new(vec!["a.js".into(), "b.js".into()], Some("out.js".into()));
    /// assert_eq!(group.src.len(), 2);
    /// ```
    #[must_use]
    pub fn new(src: Vec<PathBuf>, dest: Option<PathBuf>) -> Self {
        Self { src, dest }
    }
}

/// The argument passed to a compiler for one invocation.
///
/// Mirrors the two shapes a compiler accepts: a structured options object that
/// the compiler turns into flags itself, or a raw argument list that is used
/// as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompilerInvocation {
    /// Structured options (`js`, `js_output_file`, and any other flags).
    Options(OptionMap),
    /// Raw command-line arguments supplied by the user.
    Args(Vec<String>),
}

impl CompilerInvocation {
    /// The output file this invocation writes, when it is known.
    ///
    /// Only structured options carry a destination; raw argument lists are
    /// opaque to the adapter.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::Options(options) => options.get(JS_OUTPUT_FILE_OPTION).and_then(JsonValue::as_str),
            Self::Args(_) => None,
        }
    }
}

/// Result reported by a compiler through its completion callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationOutcome {
    /// Process-style exit code; zero means success.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CompilationOutcome {
    #[must_use]
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
