use anyhow::Result;
use colored::*;
use doable_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, task: Option<&str>) -> Result<()> {
    let forgotten = manager.forget(task)?;

    if forgotten.is_empty() {
        println!("{}", "Nothing to forget".dimmed());
        return Ok(());
    }

    for name in forgotten {
        println!("{} {}", "forgot".yellow(), name);
    }
    Ok(())
}
