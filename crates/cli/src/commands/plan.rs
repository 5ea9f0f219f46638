use anyhow::Result;
use colored::*;
use doable_core::task_execution::TaskStatus;
use doable_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, args: &[String], force: bool) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), args.join(" ").cyan());

    let plan = manager
        .get_execution_plan(args, force)
        .map_err(|e| anyhow::anyhow!("Failed to get execution plan: {}", e))?;

    println!("\n{}:", "Execution order".bold());
    for (i, task) in plan.tasks.iter().enumerate() {
        let status = match &task.status {
            TaskStatus::UpToDate => "up-to-date".bright_black(),
            TaskStatus::Run(reason) => format!("run ({})", reason).green(),
        };
        println!("  {}. {} {}", i + 1, task.name, status);
        for (name, value) in &task.params {
            println!("       {} {}", format!("--{}", name).dimmed(), value);
        }
    }

    Ok(())
}
