use anyhow::Result;
use colored::*;
use doable_core::execution::runner::get_task_color;
use doable_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager) -> Result<()> {
    let result = manager.list_tasks();

    println!("{}", "Tasks".bold().underline());

    if manager.registry.is_empty() {
        println!("  {}", "No tasks registered".dimmed());
        return Ok(());
    }

    let width = result
        .tasks
        .iter()
        .map(|t| t.name.len())
        .max()
        .unwrap_or(0);

    for task in &result.tasks {
        let name = format!("{:width$}", task.name, width = width);
        match &task.doc {
            Some(doc) => println!("{}  {}", name.color(get_task_color(&task.name)).bold(), doc.dimmed()),
            None => println!("{}", name.color(get_task_color(&task.name)).bold()),
        }

        let indent = " ".repeat(width + 2);
        if !task.task_dep.is_empty() {
            println!("{}{} {}", indent, "after".bright_black(), task.task_dep.join(", "));
        }
        if !task.params.is_empty() {
            let flags: Vec<String> = task
                .params
                .iter()
                .map(|p| match p.short {
                    Some(short) => format!("-{}/--{}", short, p.long),
                    None => format!("--{}", p.long),
                })
                .collect();
            println!("{}{} {}", indent, "params".bright_black(), flags.join(" ").cyan());
        }
    }

    Ok(())
}
