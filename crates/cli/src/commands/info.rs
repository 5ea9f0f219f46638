use anyhow::Result;
use colored::*;
use doable_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, task_name: &str) -> Result<()> {
    let task = manager.task_info(task_name)?;

    println!("{}", task.name.bold().underline());
    if let Some(doc) = &task.doc {
        println!("{}", doc);
    }

    println!("\n{}:", "Actions".bold());
    for (i, action) in task.actions.iter().enumerate() {
        println!("  {}. {}", i + 1, action);
    }

    print_list("Targets", task.targets.iter().map(|p| p.display().to_string()));
    print_list("File dependencies", task.file_dep.iter().map(|p| p.display().to_string()));
    print_list("Task dependencies", task.task_dep.iter().cloned());
    print_list("Up-to-date checks", task.uptodate.iter().map(|b| b.to_string()));

    if !task.params.is_empty() {
        println!("\n{}:", "Parameters".bold());
        for param in &task.params {
            let short = param
                .short
                .map(|s| format!("-{}, ", s))
                .unwrap_or_default();
            println!(
                "  {}--{} {} {}",
                short,
                param.long.cyan(),
                format!("(default: {})", param.default).dimmed(),
                param.help.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

fn print_list(heading: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return;
    }
    println!("\n{}:", heading.bold());
    for item in items {
        println!("  {}", item);
    }
}
