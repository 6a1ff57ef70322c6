use anyhow::Result;
use closure_task_core::task_execution::PlannedStep;
use closure_task_core::TaskManager;
use colored::*;

pub fn execute(manager: &TaskManager, target: &str) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), target.cyan());

    // Get execution plan from task manager
    let execution_plan = manager
        .get_execution_plan(target)
        .map_err(|e| anyhow::anyhow!("Failed to get execution plan: {}", e))?;

    for target_plan in &execution_plan.targets {
        let label = match &target_plan.target {
            Some(target) => format!("{}:{}", execution_plan.task_name, target),
            None => execution_plan.task_name.clone(),
        };
        println!("\n{}:", label.bold());

        if target_plan.steps.is_empty() {
            println!("  {}", "No file groups".dimmed());
        }

        for (i, step) in target_plan.steps.iter().enumerate() {
            match step {
                PlannedStep::Compile {
                    missing,
                    command_line,
                    ..
                } => {
                    println!("  {}. {}", i + 1, command_line.join(" "));
                    for path in missing {
                        println!("     {} {}", "missing".yellow(), path.display());
                    }
                }
                PlannedStep::Skip {
                    destination,
                    missing,
                } => {
                    let dest = destination
                        .as_ref()
                        .map(|dest| dest.display().to_string())
                        .unwrap_or_else(|| "file".to_string());
                    println!("  {}. {} {}", i + 1, "skip".yellow(), dest);
                    for path in missing {
                        println!("     {} {}", "missing".yellow(), path.display());
                    }
                }
            }
        }
    }

    println!(
        "\n{} {}",
        execution_plan.invocation_count().to_string().bold(),
        "compiler invocation(s)".bold()
    );

    Ok(())
}
