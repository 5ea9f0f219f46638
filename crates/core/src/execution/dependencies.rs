//! Task dependency management
//!
//! Edges come from two places: explicit `task_dep` names, and `file_dep`
//! entries that another task lists among its `targets`. The execution order
//! is a depth-first post-order over those edges, so dependencies always run
//! before their dependents and each task appears once.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;

use crate::registry::TaskRegistry;
use crate::task::TaskDescriptor;
use crate::types::{DoableError, DoableResult};

/// Names of the tasks `task` depends on, in declaration order
pub fn dependencies_of<'a>(registry: &'a TaskRegistry, task: &'a TaskDescriptor) -> Vec<&'a str> {
    let mut deps: Vec<&str> = task.task_dep.iter().map(String::as_str).collect();
    for file in &task.file_dep {
        if let Some(producer) = registry.producer_of(file) {
            if producer.name != task.name && !deps.contains(&producer.name.as_str()) {
                deps.push(producer.name.as_str());
            }
        }
    }
    deps
}

/// Build the task graph: one node per task, an edge from each task to each
/// of its dependencies
pub fn build_dependency_graph(registry: &TaskRegistry) -> DoableResult<DiGraph<String, ()>> {
    let mut graph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();

    for name in registry.names() {
        let node_index = graph.add_node(name.to_string());
        node_indices.insert(name.to_string(), node_index);
    }

    for task in registry.iter() {
        let from_node = node_indices[&task.name];
        for dep in dependencies_of(registry, task) {
            let to_node = node_indices.get(dep).ok_or_else(|| {
                DoableError::UnknownTask(format!("{} (required by '{}')", dep, task.name))
            })?;
            graph.add_edge(from_node, *to_node, ());
        }
    }

    Ok(graph)
}

/// Strongly connected components that form cycles, each sorted by name
pub fn find_cycles(graph: &DiGraph<String, ()>) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = kosaraju_scc(graph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| graph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                let node = component[0];
                if graph.contains_edge(node, node) {
                    Some(vec![graph[node].clone()])
                } else {
                    None
                }
            }
        })
        .collect();

    cycles.sort();
    cycles
}

/// Render cycles as `a -> b -> a; c -> c`
pub fn describe_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| {
            let mut path = cycle.clone();
            if let Some(first) = path.first().cloned() {
                path.push(first);
            }
            path.join(" -> ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// All tasks needed to run `requested`, dependencies first
pub fn resolve_execution_order(
    registry: &TaskRegistry,
    requested: &[String],
) -> DoableResult<Vec<String>> {
    let graph = build_dependency_graph(registry)?;

    let name_to_node: HashMap<&str, NodeIndex> = graph
        .node_indices()
        .map(|index| (graph[index].as_str(), index))
        .collect();

    let mut start_nodes = Vec::new();
    for name in requested {
        let node = name_to_node
            .get(name.as_str())
            .ok_or_else(|| DoableError::UnknownTask(name.clone()))?;
        start_nodes.push(*node);
    }

    // Only cycles among reachable tasks matter for this run
    let mut reachable = HashSet::new();
    let mut queue: VecDeque<NodeIndex> = start_nodes.iter().copied().collect();
    while let Some(node) = queue.pop_front() {
        if reachable.insert(node) {
            queue.extend(graph.neighbors(node));
        }
    }

    let relevant: Vec<Vec<String>> = find_cycles(&graph)
        .into_iter()
        .filter(|cycle| {
            cycle
                .iter()
                .any(|name| reachable.contains(&name_to_node[name.as_str()]))
        })
        .collect();
    if !relevant.is_empty() {
        return Err(DoableError::DependencyCycle(describe_cycles(&relevant)));
    }

    let mut order = Vec::new();
    let mut visited = HashSet::new();
    for name in requested {
        visit(registry, name, &mut visited, &mut order)?;
    }
    Ok(order)
}

fn visit(
    registry: &TaskRegistry,
    name: &str,
    visited: &mut HashSet<String>,
    order: &mut Vec<String>,
) -> DoableResult<()> {
    if !visited.insert(name.to_string()) {
        return Ok(());
    }

    let task = registry.require(name)?;
    for dep in dependencies_of(registry, task) {
        visit(registry, dep, visited, order)?;
    }

    order.push(name.to_string());
    Ok(())
}
