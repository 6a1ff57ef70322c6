use std::path::{Path, PathBuf};

use crate::closure_compiler::{plan_dispatches, Dispatch};
use crate::execution::command::ProcessCompiler;
use crate::execution::runner::TargetRequest;
use crate::options::{adapter_defaults, merge_options};

/// What a run would do for one file group
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedStep {
    Compile {
        destination: Option<PathBuf>,
        sources: Vec<PathBuf>,
        missing: Vec<PathBuf>,
        command_line: Vec<String>,
    },
    Skip {
        destination: Option<PathBuf>,
        missing: Vec<PathBuf>,
    },
}

/// Planned steps of one target
#[derive(Debug, Clone)]
pub struct TargetPlan {
    pub target: Option<String>,
    pub steps: Vec<PlannedStep>,
}

/// Result of resolving which compilations a task run would start
#[derive(Debug, Clone)]
pub struct TaskExecutionPlan {
    pub task_name: String,
    pub targets: Vec<TargetPlan>,
}

impl TaskExecutionPlan {
    pub fn invocation_count(&self) -> usize {
        self.targets
            .iter()
            .flat_map(|target| &target.steps)
            .filter(|step| matches!(step, PlannedStep::Compile { .. }))
            .count()
    }
}

/// Plan a target without running anything; existence is checked on disk under `root`
pub fn resolve_target_plan(
    request: &TargetRequest,
    root: &Path,
    compiler: &ProcessCompiler,
) -> TargetPlan {
    let options = merge_options([&adapter_defaults(), &request.options]);

    let steps = plan_dispatches(&request.files, &options, |path| root.join(path).exists())
        .into_iter()
        .map(|dispatch| match dispatch {
            Dispatch::Compile {
                destination,
                sources,
                missing,
                invocation,
            } => PlannedStep::Compile {
                destination,
                sources,
                missing,
                command_line: compiler.command_line(&invocation),
            },
            Dispatch::Skip {
                destination,
                missing,
            } => PlannedStep::Skip {
                destination,
                missing,
            },
        })
        .collect();

    TargetPlan {
        target: request.target.clone(),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use closure_task_protocol::{FileGroup, OptionMap};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn plans_compile_and_skip_steps() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join("a.js"), "").unwrap();
        let compiler = ProcessCompiler::new("google-closure-compiler", Vec::new(), temp_dir.path());

        let mut options = OptionMap::new();
        options.insert("compilation_level".to_string(), json!("SIMPLE"));

        let request = TargetRequest {
            task_name: "closure-compiler".to_string(),
            target: Some("app".to_string()),
            files: vec![
                FileGroup::new(vec!["a.js".into(), "b.js".into()], Some("out.js".into())),
                FileGroup::new(vec!["c.js".into()], Some("other.js".into())),
            ],
            options,
        };

        let plan = resolve_target_plan(&request, temp_dir.path(), &compiler);

        assert_eq!(
            plan.steps,
            vec![
                PlannedStep::Compile {
                    destination: Some("out.js".into()),
                    sources: vec!["a.js".into()],
                    missing: vec!["b.js".into()],
                    command_line: vec![
                        "google-closure-compiler".to_string(),
                        "--compilation_level=SIMPLE".to_string(),
                        "--js=a.js".to_string(),
                        "--js_output_file=out.js".to_string(),
                    ],
                },
                PlannedStep::Skip {
                    destination: Some("other.js".into()),
                    missing: vec!["c.js".into()],
                },
            ]
        );
    }
}
