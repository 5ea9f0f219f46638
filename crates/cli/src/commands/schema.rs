use anyhow::Result;
use doable_core::workspace_manager::WorkspaceManager;

pub fn execute() -> Result<()> {
    let schema = WorkspaceManager::config_schema()?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
