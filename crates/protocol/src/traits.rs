//! Traits at the two seams of the task adapter.
//!
//! - [`TaskHost`] - What the adapter needs from the task runner that executes it
//! - [`Compiler`] - The external compiler the adapter forwards work to

use crate::types::{CompilationOutcome, CompilerInvocation};
use std::path::Path;
use std::sync::Arc;

/// One-shot completion callback handed to a [`Compiler`].
///
/// Must be called exactly once with the outcome of the invocation.
pub type CompletionCallback = Box<dyn FnOnce(CompilationOutcome) + Send + 'static>;

/// Sink for the compiler's verbose output (command lines, progress).
pub type VerboseSink = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// The task runner surface a task handler talks to.
///
/// **Purpose**: Decouples the adapter from any particular runner. The console
/// runner in `closure_task_core` prints to the terminal; tests record every call.
///
/// Implementations must be shareable across the tasks spawned for concurrent
/// compiler invocations, hence the `Send + Sync` bound.
///
/// # Example
///
/// ```rust
/// # use closure_task_protocol::TaskHost;
/// # use std::path::Path;
/// struct QuietHost;
///
/// impl TaskHost for QuietHost {
///     fn file_exists(&self, path: &Path) -> bool {
///         path.is_file()
///     }
///
///     fn log_ok(&self, _message: &str) {}
///     fn log_warn(&self, _message: &str) {}
///
///     fn fail_warn(&self, message: &str) {
///         eprintln!("{message}");
///     }
/// }
/// ```
pub trait TaskHost: Send + Sync {
    /// Whether `path` exists. Called for every source on every run; never cached.
    fn file_exists(&self, path: &Path) -> bool;

    /// Section header printed by the runner before a task target starts.
    fn log_header(&self, _message: &str) {}

    /// Informational success line.
    fn log_ok(&self, message: &str);

    /// Warning line. Does not fail the task.
    fn log_warn(&self, message: &str);

    /// Mark the running task as failed with `message`.
    ///
    /// The handler keeps running; the runner decides what a failed task means
    /// for the rest of the run.
    fn fail_warn(&self, message: &str);

    /// Verbose-only output.
    fn verbose_write(&self, _text: &str) {}
}

impl<T: TaskHost + ?Sized> TaskHost for Arc<T> {
    fn file_exists(&self, path: &Path) -> bool {
        (**self).file_exists(path)
    }

    fn log_header(&self, message: &str) {
        (**self).log_header(message);
    }

    fn log_ok(&self, message: &str) {
        (**self).log_ok(message);
    }

    fn log_warn(&self, message: &str) {
        (**self).log_warn(message);
    }

    fn fail_warn(&self, message: &str) {
        (**self).fail_warn(message);
    }

    fn verbose_write(&self, text: &str) {
        (**self).verbose_write(text);
    }
}

/// An external compiler.
///
/// **Contract**: `compile` returns immediately and reports through
/// `on_complete`, which must be invoked exactly once. Whether the work runs
/// on another task, another thread or a child process is up to the
/// implementation.
///
/// # Example
///
/// ```rust
/// # use closure_task_protocol::{Compiler, CompilerInvocation, CompletionCallback, CompilationOutcome, VerboseSink};
/// struct EchoCompiler;
///
/// impl Compiler for EchoCompiler {
///     fn compile(&self, invocation: CompilerInvocation, on_complete: CompletionCallback, verbose: VerboseSink) {
///         verbose(&format!("{invocation:?}"));
///         on_complete(CompilationOutcome::new(0, "", ""));
///     }
/// }
/// ```
pub trait Compiler: Send + Sync {
    /// Start one compilation.
    ///
    /// # Arguments
    ///
    /// * `invocation` - Structured options or a raw argument list
    /// * `on_complete` - Called once with exit code, stdout and stderr
    /// * `verbose` - Where verbose output goes
    fn compile(
        &self,
        invocation: CompilerInvocation,
        on_complete: CompletionCallback,
        verbose: VerboseSink,
    );
}

impl<T: Compiler + ?Sized> Compiler for Arc<T> {
    fn compile(
        &self,
        invocation: CompilerInvocation,
        on_complete: CompletionCallback,
        verbose: VerboseSink,
    ) {
        (**self).compile(invocation, on_complete, verbose);
    }
}
