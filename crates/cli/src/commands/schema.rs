use anyhow::Result;
use closure_task_core::configs::config_schema;

pub fn execute() -> Result<()> {
    println!("{}", config_schema()?);
    Ok(())
}
