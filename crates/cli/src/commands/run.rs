use anyhow::Result;
use colored::*;
use doable_core::workspace_manager::{RunOptions, WorkspaceManager};

pub async fn execute(
    manager: &WorkspaceManager,
    args: &[String],
    force: bool,
    verbosity: Option<u8>,
) -> Result<()> {
    println!("{} {}", "Running".bold(), args.join(" ").cyan());

    let summary = manager
        .run_tasks(args, RunOptions { verbosity, force })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run task: {}", e))?;

    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        format!(
            "{} task(s) run, {} up-to-date",
            summary.executed.len(),
            summary.skipped.len()
        )
        .green()
        .bold()
    );

    Ok(())
}
