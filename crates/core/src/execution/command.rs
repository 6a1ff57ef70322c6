//! Subprocess-backed compiler
//!
//! [`ProcessCompiler`] runs the configured compiler command once per
//! invocation, in the workspace root, and reports exit code and captured
//! output through the completion callback.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use closure_task_protocol::{
    CompilationOutcome, Compiler, CompilerInvocation, CompletionCallback, VerboseSink,
};

use crate::configs::workspace::{CompilerConfig, DEFAULT_COMPILER_PROGRAM};
use crate::execution::args::{display_command, invocation_args};
use crate::types::{TaskError, TaskResult};

/// Runs the compiler as a child process
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    program: String,
    leading_args: Vec<String>,
    working_dir: PathBuf,
}

impl ProcessCompiler {
    pub fn new(
        program: impl Into<String>,
        leading_args: Vec<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            leading_args,
            working_dir: working_dir.into(),
        }
    }

    /// Build from the `compiler` section of the configuration
    pub fn from_config(workspace_root: &Path, config: Option<&CompilerConfig>) -> TaskResult<Self> {
        let Some(command) = config.and_then(|c| c.command.as_ref()) else {
            return Ok(Self::new(DEFAULT_COMPILER_PROGRAM, Vec::new(), workspace_root));
        };

        let (program, leading_args) = command
            .program_and_args()
            .ok_or_else(|| TaskError::Config("Compiler command must not be empty".to_string()))?;

        Ok(Self::new(program, leading_args.to_vec(), workspace_root))
    }

    /// Full command line for `invocation`, program first
    pub fn command_line(&self, invocation: &CompilerInvocation) -> Vec<String> {
        let mut parts = Vec::with_capacity(1 + self.leading_args.len());
        parts.push(self.program.clone());
        parts.extend(self.leading_args.iter().cloned());
        parts.extend(invocation_args(invocation));
        parts
    }

    fn build_command(&self, invocation: &CompilerInvocation) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(invocation_args(invocation))
            .current_dir(&self.working_dir)
            .stdin(Stdio::null());
        command
    }
}

impl Compiler for ProcessCompiler {
    fn compile(
        &self,
        invocation: CompilerInvocation,
        on_complete: CompletionCallback,
        verbose: VerboseSink,
    ) {
        let command_line = self.command_line(&invocation);
        verbose(&format!("{}\n", display_command(&command_line)));
        tracing::debug!(
            program = %self.program,
            args = ?&command_line[1..],
            "Spawning compiler"
        );

        let command = self.build_command(&invocation);
        let program = self.program.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let output = tokio::process::Command::from(command).output().await;
                    on_complete(outcome_from(&program, output));
                });
            }
            Err(_) => {
                let mut command = command;
                on_complete(outcome_from(&program, command.output()));
            }
        }
    }
}

fn outcome_from(program: &str, output: std::io::Result<Output>) -> CompilationOutcome {
    match output {
        Ok(output) => CompilationOutcome::new(
            normalize_exit(output.status),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ),
        Err(e) => {
            tracing::warn!(program = %program, error = %e, "Failed to spawn compiler");
            CompilationOutcome::new(
                1,
                "",
                format!("Failed to execute compiler '{}': {}", program, e),
            )
        }
    }
}

fn normalize_exit(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(code) = status.code() {
            code
        } else if let Some(signal) = status.signal() {
            128 + signal
        } else {
            1
        }
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}
