use anyhow::Result;
use colored::*;
use doable_core::execution::dependencies::describe_cycles;
use doable_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager) -> Result<()> {
    println!("{}", "Task Dependency Graph:".bold().underline());

    let result = manager
        .get_dependency_graph()
        .map_err(|e| anyhow::anyhow!("Failed to get dependency graph: {}", e))?;

    if !result.cycles.is_empty() {
        println!(
            "{} {}",
            "Warning:".yellow().bold(),
            format!(
                "Circular dependencies detected: {}",
                describe_cycles(&result.cycles)
            )
            .yellow()
        );
    }

    let graph = &result.graph;
    for (node_index, node_weight) in graph.node_indices().zip(graph.node_weights()) {
        println!("{}", node_weight.blue().bold());

        // neighbors() yields edges newest first
        let mut deps: Vec<String> = graph
            .neighbors(node_index)
            .filter_map(|n| graph.node_weight(n).cloned())
            .collect();
        deps.reverse();

        if !deps.is_empty() {
            println!("  {} {}", "depends on:".dimmed(), deps.join(", "));
        } else {
            println!("  {}", "no dependencies".dimmed());
        }
        println!();
    }

    Ok(())
}
