use anyhow::Result;
use colored::*;
use doable_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, tasks: &[String]) -> Result<()> {
    let result = manager.clean(tasks)?;

    for path in &result.removed {
        println!("{} {}", "removed".yellow(), path.display());
    }
    for path in &result.missing {
        println!("{} {}", "absent".dimmed(), path.display().to_string().dimmed());
    }
    if result.removed.is_empty() && result.missing.is_empty() {
        println!("{}", "No targets to clean".dimmed());
    }

    Ok(())
}
