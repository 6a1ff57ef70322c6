use anyhow::Result;
use closure_task_core::tasks::get_target_color;
use closure_task_core::TaskManager;
use colored::*;

pub fn execute(manager: &TaskManager) -> Result<()> {
    let result = manager.list_targets();

    println!("{}", "Tasks".bold().underline());

    if result.tasks.is_empty() {
        println!("  {}", "No tasks configured".dimmed());
        return Ok(());
    }

    for task in &result.tasks {
        if task.registered {
            println!("{}", task.name.blue().bold());
        } else {
            println!("{} {}", task.name.cyan(), "(not registered)".red());
        }
        if let Some(description) = &task.description {
            println!("  {}", description.dimmed());
        }

        for target in &task.targets {
            let label = format!("{}:{}", task.name, target);
            println!("  {}", label.color(get_target_color(&label)));
        }
    }

    Ok(())
}
