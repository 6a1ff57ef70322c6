//! Protocol definitions for closure-task.
//!
//! The task adapter sits between two collaborators it does not own: the task
//! runner that executes it ([`TaskHost`]) and the external compiler it
//! forwards work to ([`Compiler`]). This crate holds those contracts and the
//! data exchanged across them.

pub mod traits;
pub mod types;

pub use traits::{Compiler, CompletionCallback, TaskHost, VerboseSink};
pub use types::{
    CompilationOutcome, CompilerInvocation, FileGroup, OptionMap, ARGS_OPTION, JS_OPTION,
    JS_OUTPUT_FILE_OPTION, REQUIRE_INPUT_FILES_OPTION,
};
