//! The `closure-compiler` task
//!
//! For every file group of a target the task checks which sources exist,
//! assembles the compiler options (or takes the raw `args` override) and
//! starts one compilation. All compilations are started before any of them is
//! awaited; the task signals completion once every one of them has settled.
//!
//! Failures never abort the task. A non-zero exit code is reported through
//! [`TaskHost::fail_warn`] and the remaining compilations carry on.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value as JsonValue;
use tokio::sync::oneshot;

use closure_task_protocol::{
    CompilationOutcome, Compiler, CompilerInvocation, CompletionCallback, FileGroup, OptionMap,
    TaskHost, VerboseSink, JS_OUTPUT_FILE_OPTION,
};

use crate::execution::runner::{MultiTask, TaskContext, TaskRegistry};
use crate::options::{adapter_defaults, merge_sources, AdapterOptions};
use crate::results::{CompilationError, CompilationResult, CompiledTarget};

pub const TASK_NAME: &str = "closure-compiler";
pub const TASK_DESCRIPTION: &str = "Minify files with Google Closure Compiler";

/// What the task does with one file group, or with the `args` override
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Start a compilation.
    Compile {
        destination: Option<PathBuf>,
        sources: Vec<PathBuf>,
        missing: Vec<PathBuf>,
        invocation: CompilerInvocation,
    },
    /// None of the group's sources exist; nothing is compiled.
    Skip {
        destination: Option<PathBuf>,
        missing: Vec<PathBuf>,
    },
}

impl Dispatch {
    pub fn missing(&self) -> &[PathBuf] {
        match self {
            Dispatch::Compile { missing, .. } | Dispatch::Skip { missing, .. } => missing,
        }
    }
}

/// Decide the dispatch for every file group
///
/// `options` are the merged task options including the reserved keys; they
/// are re-extracted for each group so no two invocations share an options
/// object. `exists` is consulted for every source, every time.
pub fn plan_dispatches(
    files: &[FileGroup],
    options: &OptionMap,
    exists: impl Fn(&Path) -> bool,
) -> Vec<Dispatch> {
    let mut dispatches = Vec::with_capacity(files.len());

    for group in files {
        let adapter_options = AdapterOptions::extract(options.clone());
        let (sources, missing): (Vec<PathBuf>, Vec<PathBuf>) =
            group.src.iter().cloned().partition(|path| exists(path));

        if sources.is_empty() {
            dispatches.push(Dispatch::Skip {
                destination: group.dest.clone(),
                missing,
            });
            continue;
        }

        let invocation = match adapter_options.args {
            Some(args) => CompilerInvocation::Args(args),
            None => {
                let mut compiler_options = adapter_options.compiler_options;
                merge_sources(
                    &mut compiler_options,
                    sources.iter().map(|path| path.display().to_string()),
                );
                if let Some(dest) = &group.dest {
                    compiler_options.insert(
                        JS_OUTPUT_FILE_OPTION.to_string(),
                        JsonValue::String(dest.display().to_string()),
                    );
                }
                CompilerInvocation::Options(compiler_options)
            }
        };

        dispatches.push(Dispatch::Compile {
            destination: group.dest.clone(),
            sources,
            missing,
            invocation,
        });
    }

    if files.is_empty() {
        if let Some(args) = AdapterOptions::extract(options.clone()).args {
            dispatches.push(Dispatch::Compile {
                destination: None,
                sources: Vec::new(),
                missing: Vec::new(),
                invocation: CompilerInvocation::Args(args),
            });
        }
    }

    dispatches
}

/// Start one compilation and return a future of its settled result
///
/// The compiler is called before this function returns. Log output happens in
/// the completion callback, so messages appear in completion order.
pub fn compilation(
    compiler: &dyn Compiler,
    host: Arc<dyn TaskHost>,
    invocation: CompilerInvocation,
) -> impl Future<Output = CompilationResult> + Send + 'static {
    let destination = invocation.destination().map(str::to_string);
    let (sender, receiver) = oneshot::channel();

    let callback_host = host.clone();
    let callback_destination = destination.clone();
    let on_complete: CompletionCallback = Box::new(move |outcome| {
        let result = settle(callback_host.as_ref(), callback_destination, outcome);
        let _ = sender.send(result);
    });

    let verbose_host = host.clone();
    let verbose: VerboseSink = Arc::new(move |text: &str| verbose_host.verbose_write(text));

    compiler.compile(invocation, on_complete, verbose);

    async move {
        match receiver.await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(destination = ?destination, "Compiler dropped its completion callback");
                settle(
                    host.as_ref(),
                    destination,
                    CompilationOutcome::new(-1, "", "The compiler never reported completion"),
                )
            }
        }
    }
}

fn settle(
    host: &dyn TaskHost,
    destination: Option<String>,
    outcome: CompilationOutcome,
) -> CompilationResult {
    if outcome.is_success() {
        if !outcome.stderr.trim().is_empty() {
            host.log_warn(&outcome.stderr);
        }
        host.log_ok(&format!("{} created.", destination.as_deref().unwrap_or("file")));

        Ok(CompiledTarget {
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            destination,
        })
    } else {
        match &destination {
            Some(dest) => host.log_warn(&format!("Error compiling source {}", dest)),
            None => host.log_warn("Error compiling source"),
        }
        host.fail_warn(&format!("Compilation failed\n\n{}", outcome.stderr));

        Err(CompilationError {
            exit_code: outcome.exit_code,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            destination,
        })
    }
}

/// Task handler forwarding file groups to a [`Compiler`]
pub struct ClosureCompilerTask {
    compiler: Arc<dyn Compiler>,
}

impl ClosureCompilerTask {
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self { compiler }
    }

    /// Register under [`TASK_NAME`]
    pub fn register(registry: &mut TaskRegistry, compiler: Arc<dyn Compiler>) {
        registry.register_multi_task(TASK_NAME, TASK_DESCRIPTION, Arc::new(Self::new(compiler)));
    }
}

impl MultiTask for ClosureCompilerTask {
    fn run(&self, ctx: TaskContext) {
        let done = ctx.async_done();
        let host = ctx.host();
        let options = ctx.options(adapter_defaults());

        let require_input_files = AdapterOptions::extract(options.clone()).require_input_files;
        tracing::debug!(
            task = ctx.task_name(),
            target = ?ctx.target(),
            groups = ctx.files().len(),
            require_input_files,
            "requireInputFiles is read but not enforced"
        );

        let dispatches = plan_dispatches(ctx.files(), &options, |path| host.file_exists(path));

        let mut compilations = Vec::new();
        for dispatch in dispatches {
            for path in dispatch.missing() {
                host.log_warn(&format!("Source file {} not found.", path.display()));
            }

            match dispatch {
                Dispatch::Skip { destination, .. } => match destination {
                    Some(dest) => host.log_warn(&format!(
                        "Destination {} not written because src files were empty.",
                        dest.display()
                    )),
                    None => host.log_warn("Output not written because src files were empty."),
                },
                Dispatch::Compile { invocation, .. } => {
                    compilations.push(compilation(self.compiler.as_ref(), host.clone(), invocation));
                }
            }
        }

        if compilations.is_empty() {
            done.done();
            return;
        }

        tokio::spawn(async move {
            let results = join_all(compilations).await;
            let failed = results.iter().filter(|result| result.is_err()).count();
            tracing::debug!(
                compiled = results.len() - failed,
                failed,
                "All compilations settled"
            );
            done.done();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::runner::{TargetRequest, TaskRunner};
    use closure_task_protocol::{ARGS_OPTION, JS_OPTION, REQUIRE_INPUT_FILES_OPTION};
    use serde_json::json;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Line {
        Ok(String),
        Warn(String),
        Fail(String),
    }

    #[derive(Default)]
    struct RecordingHost {
        existing: HashSet<PathBuf>,
        lines: Mutex<Vec<Line>>,
    }

    impl RecordingHost {
        fn with_files(files: &[&str]) -> Self {
            Self {
                existing: files.iter().map(PathBuf::from).collect(),
                lines: Mutex::new(Vec::new()),
            }
        }

        fn lines(&self) -> Vec<Line> {
            self.lines.lock().unwrap().clone()
        }

        fn oks(&self) -> Vec<String> {
            self.lines()
                .into_iter()
                .filter_map(|line| match line {
                    Line::Ok(message) => Some(message),
                    _ => None,
                })
                .collect()
        }

        fn warnings(&self) -> Vec<String> {
            self.lines()
                .into_iter()
                .filter_map(|line| match line {
                    Line::Warn(message) => Some(message),
                    _ => None,
                })
                .collect()
        }
    }

    impl TaskHost for RecordingHost {
        fn file_exists(&self, path: &Path) -> bool {
            self.existing.contains(path)
        }
        fn log_ok(&self, message: &str) {
            self.lines.lock().unwrap().push(Line::Ok(message.to_string()));
        }
        fn log_warn(&self, message: &str) {
            self.lines.lock().unwrap().push(Line::Warn(message.to_string()));
        }
        fn fail_warn(&self, message: &str) {
            self.lines.lock().unwrap().push(Line::Fail(message.to_string()));
        }
    }

    /// Records invocations and answers with a scripted outcome per destination.
    #[derive(Default)]
    struct FakeCompiler {
        invocations: Mutex<Vec<CompilerInvocation>>,
        outcomes: HashMap<Option<String>, CompilationOutcome>,
        delays: HashMap<Option<String>, u64>,
        drop_callbacks: bool,
    }

    impl FakeCompiler {
        fn answering(destination: Option<&str>, outcome: CompilationOutcome) -> Self {
            let mut compiler = Self::default();
            compiler.outcomes.insert(destination.map(str::to_string), outcome);
            compiler
        }

        fn invocations(&self) -> Vec<CompilerInvocation> {
            self.invocations.lock().unwrap().clone()
        }
    }

    impl Compiler for FakeCompiler {
        fn compile(
            &self,
            invocation: CompilerInvocation,
            on_complete: CompletionCallback,
            _verbose: VerboseSink,
        ) {
            let key = invocation.destination().map(str::to_string);
            self.invocations.lock().unwrap().push(invocation);
            if self.drop_callbacks {
                return;
            }

            let outcome = self
                .outcomes
                .get(&key)
                .cloned()
                .unwrap_or_else(|| CompilationOutcome::new(0, "", ""));
            let delay = self.delays.get(&key).copied().unwrap_or(0);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                on_complete(outcome);
            });
        }
    }

    fn group(src: &[&str], dest: Option<&str>) -> FileGroup {
        FileGroup::new(src.iter().map(PathBuf::from).collect(), dest.map(PathBuf::from))
    }

    fn options(value: JsonValue) -> OptionMap {
        match value {
            JsonValue::Object(map) => map,
            _ => unreachable!("test helper expects an object"),
        }
    }

    async fn run_task(
        compiler: Arc<FakeCompiler>,
        host: Arc<RecordingHost>,
        files: Vec<FileGroup>,
        options: OptionMap,
    ) -> crate::results::TargetRunReport {
        let mut registry = TaskRegistry::new();
        ClosureCompilerTask::register(&mut registry, compiler);
        let runner = TaskRunner::new(Arc::new(registry), host);
        runner
            .run_target(TargetRequest {
                task_name: TASK_NAME.to_string(),
                target: Some("app".to_string()),
                files,
                options,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_sources_skip_the_group() {
        let compiler = Arc::new(FakeCompiler::default());
        let host = Arc::new(RecordingHost::default());

        let report = run_task(
            compiler.clone(),
            host.clone(),
            vec![group(&["missing.js"], Some("out.js"))],
            OptionMap::new(),
        )
        .await;

        assert!(compiler.invocations().is_empty());
        assert_eq!(
            host.lines(),
            vec![
                Line::Warn("Source file missing.js not found.".to_string()),
                Line::Warn(
                    "Destination out.js not written because src files were empty.".to_string()
                ),
            ]
        );
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn successful_compilation_logs_destination_once() {
        let compiler = Arc::new(FakeCompiler::answering(
            Some("out.js"),
            CompilationOutcome::new(0, "OK", ""),
        ));
        let host = Arc::new(RecordingHost::with_files(&["a.js"]));

        let report = run_task(
            compiler.clone(),
            host.clone(),
            vec![group(&["a.js"], Some("out.js"))],
            OptionMap::new(),
        )
        .await;

        let invocations = compiler.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].destination(), Some("out.js"));
        assert_eq!(host.oks(), vec!["out.js created."]);
        assert!(host.warnings().is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn non_zero_exit_fails_the_task_with_stderr() {
        let compiler = Arc::new(FakeCompiler::answering(
            Some("out.js"),
            CompilationOutcome::new(1, "", "syntax error"),
        ));
        let host = Arc::new(RecordingHost::with_files(&["a.js"]));

        let report = run_task(
            compiler.clone(),
            host.clone(),
            vec![group(&["a.js"], Some("out.js"))],
            OptionMap::new(),
        )
        .await;

        assert_eq!(
            host.lines(),
            vec![
                Line::Warn("Error compiling source out.js".to_string()),
                Line::Fail("Compilation failed\n\nsyntax error".to_string()),
            ]
        );
        assert_eq!(report.failures, vec!["Compilation failed\n\nsyntax error"]);
    }

    #[tokio::test]
    async fn stderr_on_success_is_only_a_warning() {
        let compiler = Arc::new(FakeCompiler::answering(
            Some("out.js"),
            CompilationOutcome::new(0, "", "WARNING - deprecated flag\n"),
        ));
        let host = Arc::new(RecordingHost::with_files(&["a.js"]));

        let report = run_task(
            compiler,
            host.clone(),
            vec![group(&["a.js"], Some("out.js"))],
            OptionMap::new(),
        )
        .await;

        assert_eq!(
            host.lines(),
            vec![
                Line::Warn("WARNING - deprecated flag\n".to_string()),
                Line::Ok("out.js created.".to_string()),
            ]
        );
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn forwarded_options_carry_sources_and_no_reserved_keys() {
        let compiler = Arc::new(FakeCompiler::default());
        let host = Arc::new(RecordingHost::with_files(&["a.js", "b.js"]));

        run_task(
            compiler.clone(),
            host.clone(),
            vec![group(&["a.js", "gone.js", "b.js"], Some("out.js"))],
            options(json!({
                "requireInputFiles": false,
                "compilation_level": "ADVANCED"
            })),
        )
        .await;

        let invocations = compiler.invocations();
        let CompilerInvocation::Options(forwarded) = &invocations[0] else {
            panic!("expected structured options, got {:?}", invocations[0]);
        };
        assert!(!forwarded.contains_key(REQUIRE_INPUT_FILES_OPTION));
        assert!(!forwarded.contains_key(ARGS_OPTION));
        assert_eq!(forwarded[JS_OPTION], json!(["a.js", "b.js"]));
        assert_eq!(forwarded[JS_OUTPUT_FILE_OPTION], json!("out.js"));
        assert_eq!(forwarded["compilation_level"], json!("ADVANCED"));
        assert_eq!(host.warnings(), vec!["Source file gone.js not found."]);
    }

    #[tokio::test]
    async fn args_override_replaces_assembled_options() {
        let compiler = Arc::new(FakeCompiler::default());
        let host = Arc::new(RecordingHost::with_files(&["a.js"]));

        run_task(
            compiler.clone(),
            host.clone(),
            vec![group(&["a.js"], Some("out.js"))],
            options(json!({ "args": ["--js", "custom.js", "--js_output_file", "custom.min.js"] })),
        )
        .await;

        assert_eq!(
            compiler.invocations(),
            vec![CompilerInvocation::Args(vec![
                "--js".to_string(),
                "custom.js".to_string(),
                "--js_output_file".to_string(),
                "custom.min.js".to_string(),
            ])]
        );
        assert_eq!(host.oks(), vec!["file created."]);
    }

    #[tokio::test]
    async fn args_without_file_groups_invoke_once() {
        let compiler = Arc::new(FakeCompiler::default());
        let host = Arc::new(RecordingHost::default());

        let report = run_task(
            compiler.clone(),
            host.clone(),
            Vec::new(),
            options(json!({ "args": ["--version"] })),
        )
        .await;

        assert_eq!(
            compiler.invocations(),
            vec![CompilerInvocation::Args(vec!["--version".to_string()])]
        );
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn no_file_groups_and_no_args_does_nothing() {
        let compiler = Arc::new(FakeCompiler::default());
        let host = Arc::new(RecordingHost::default());

        let report = run_task(compiler.clone(), host.clone(), Vec::new(), OptionMap::new()).await;

        assert!(compiler.invocations().is_empty());
        assert!(host.lines().is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn every_group_settles_before_completion_in_callback_order() {
        let mut fake = FakeCompiler::default();
        fake.outcomes.insert(
            Some("slow.js".to_string()),
            CompilationOutcome::new(2, "", "type error"),
        );
        fake.delays.insert(Some("slow.js".to_string()), 50);
        let compiler = Arc::new(fake);
        let host = Arc::new(RecordingHost::with_files(&["a.js", "b.js"]));

        let report = run_task(
            compiler.clone(),
            host.clone(),
            vec![
                group(&["a.js"], Some("slow.js")),
                group(&["missing.js"], Some("skipped.js")),
                group(&["b.js"], Some("fast.js")),
            ],
            OptionMap::new(),
        )
        .await;

        assert_eq!(compiler.invocations().len(), 2);
        assert_eq!(
            host.lines(),
            vec![
                Line::Warn("Source file missing.js not found.".to_string()),
                Line::Warn(
                    "Destination skipped.js not written because src files were empty."
                        .to_string()
                ),
                Line::Ok("fast.js created.".to_string()),
                Line::Warn("Error compiling source slow.js".to_string()),
                Line::Fail("Compilation failed\n\ntype error".to_string()),
            ]
        );
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn early_failure_still_waits_for_slower_compilations() {
        let mut fake = FakeCompiler::default();
        fake.outcomes.insert(
            Some("fast.js".to_string()),
            CompilationOutcome::new(1, "", "parse error"),
        );
        fake.delays.insert(Some("slow.js".to_string()), 80);
        let compiler = Arc::new(fake);
        let host = Arc::new(RecordingHost::with_files(&["a.js", "b.js"]));

        let report = run_task(
            compiler.clone(),
            host.clone(),
            vec![
                group(&["a.js"], Some("fast.js")),
                group(&["b.js"], Some("slow.js")),
            ],
            OptionMap::new(),
        )
        .await;

        assert_eq!(
            host.lines(),
            vec![
                Line::Warn("Error compiling source fast.js".to_string()),
                Line::Fail("Compilation failed\n\nparse error".to_string()),
                Line::Ok("slow.js created.".to_string()),
            ]
        );
        assert_eq!(report.failures, vec!["Compilation failed\n\nparse error"]);
    }

    #[tokio::test]
    async fn skipped_group_without_destination_names_no_placeholder() {
        let compiler = Arc::new(FakeCompiler::default());
        let host = Arc::new(RecordingHost::default());

        run_task(
            compiler.clone(),
            host.clone(),
            vec![group(&["missing.js"], None)],
            OptionMap::new(),
        )
        .await;

        assert!(compiler.invocations().is_empty());
        assert_eq!(
            host.warnings(),
            vec![
                "Source file missing.js not found.",
                "Output not written because src files were empty.",
            ]
        );
    }

    #[tokio::test]
    async fn compilation_future_settles_with_captured_output() {
        let compiler = FakeCompiler::answering(Some("out.js"), CompilationOutcome::new(0, "OK", ""));
        let host: Arc<dyn TaskHost> = Arc::new(RecordingHost::default());
        let mut invocation_options = OptionMap::new();
        invocation_options.insert(JS_OUTPUT_FILE_OPTION.to_string(), json!("out.js"));

        let result = compilation(
            &compiler,
            host,
            CompilerInvocation::Options(invocation_options),
        )
        .await;

        assert_eq!(
            result,
            Ok(CompiledTarget {
                stdout: "OK".to_string(),
                stderr: String::new(),
                destination: Some("out.js".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn rejected_compilation_carries_the_same_values() {
        let compiler =
            FakeCompiler::answering(Some("out.js"), CompilationOutcome::new(1, "", "syntax error"));
        let host = Arc::new(RecordingHost::default());
        let mut invocation_options = OptionMap::new();
        invocation_options.insert(JS_OUTPUT_FILE_OPTION.to_string(), json!("out.js"));

        let result = compilation(
            &compiler,
            host.clone(),
            CompilerInvocation::Options(invocation_options),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.exit_code, 1);
        assert_eq!(err.stderr, "syntax error");
        assert_eq!(err.destination.as_deref(), Some("out.js"));
        assert_eq!(
            host.lines()
                .iter()
                .filter(|line| matches!(line, Line::Fail(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn dropped_callback_settles_as_failure() {
        let compiler = Arc::new(FakeCompiler {
            drop_callbacks: true,
            ..FakeCompiler::default()
        });
        let host = Arc::new(RecordingHost::with_files(&["a.js"]));

        let report = run_task(
            compiler,
            host.clone(),
            vec![group(&["a.js"], Some("out.js"))],
            OptionMap::new(),
        )
        .await;

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("never reported completion"));
    }

    #[test]
    fn each_group_gets_its_own_options() {
        let dispatches = plan_dispatches(
            &[group(&["a.js"], Some("a.min.js")), group(&["b.js"], Some("b.min.js"))],
            &options(json!({ "js": "externs.js" })),
            |_| true,
        );

        let js: Vec<_> = dispatches
            .iter()
            .map(|dispatch| match dispatch {
                Dispatch::Compile {
                    invocation: CompilerInvocation::Options(options),
                    ..
                } => options[JS_OPTION].clone(),
                other => panic!("unexpected dispatch {:?}", other),
            })
            .collect();

        assert_eq!(js, vec![json!(["externs.js", "a.js"]), json!(["externs.js", "b.js"])]);
    }

    #[test]
    fn group_without_destination_omits_output_file() {
        let dispatches = plan_dispatches(&[group(&["a.js"], None)], &OptionMap::new(), |_| true);

        match &dispatches[0] {
            Dispatch::Compile {
                invocation: CompilerInvocation::Options(options),
                destination,
                ..
            } => {
                assert!(destination.is_none());
                assert!(!options.contains_key(JS_OUTPUT_FILE_OPTION));
            }
            other => panic!("unexpected dispatch {:?}", other),
        }
    }
}
