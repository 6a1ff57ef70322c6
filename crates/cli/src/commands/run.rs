use std::sync::Arc;

use anyhow::Result;
use closure_task_core::host::ConsoleHost;
use closure_task_core::TaskManager;
use colored::*;

pub async fn execute(manager: &TaskManager, target: &str, force: bool, verbose: bool) -> Result<()> {
    let host = Arc::new(ConsoleHost::new(manager.root.clone(), verbose));

    // Execute targets using task manager
    let summary = manager
        .run(target, host, force)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run task: {}", e))?;

    println!();
    if !summary.has_failures() {
        println!("{}", "Done.".green().bold());
        return Ok(());
    }

    for label in summary.failed_targets() {
        println!("{} {}", "✗".red().bold(), label);
    }
    for label in &summary.skipped {
        println!("{} {}", "-".dimmed(), format!("{} (skipped)", label).dimmed());
    }

    if force {
        println!("{}", "Done, but with warnings.".yellow().bold());
        return Ok(());
    }

    anyhow::bail!("Aborted due to warnings.")
}
