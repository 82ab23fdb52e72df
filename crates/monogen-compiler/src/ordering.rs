//! Emission ordering of generated definitions.
//!
//! A definition that embeds another by value can only be laid out after it.
//! Instantiations already come out of the engine in that order, but a sum
//! type may be embedded by a specialization created earlier, so the final
//! order is computed over every definition of the session.

use std::collections::VecDeque;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;
use rustc_hash::FxHashMap;

use monogen_core::{CompilationError, Definition};

/// Order `definitions` so every definition follows the ones it embeds by
/// value.
///
/// The result is the depth-first post-order over creation order, so an
/// already valid sequence is returned unchanged.
pub fn order_definitions(
    definitions: Vec<Definition>,
) -> Result<Vec<Definition>, CompilationError> {
    let graph = dependency_graph(&definitions)?;

    if let Err(cycle) = petgraph::algo::toposort(&graph, None) {
        let start = cycle.node_id();
        let path = cycle_through(&graph, start).unwrap_or_else(|| vec![start, start]);
        return Err(CompilationError::CyclicTemplateDependency {
            cycle: path
                .into_iter()
                .map(|node| definitions[graph[node]].symbol().to_string())
                .collect(),
        });
    }

    let mut order = Vec::with_capacity(definitions.len());
    let mut dfs = DfsPostOrder::empty(&graph);
    for node in graph.node_indices() {
        dfs.move_to(node);
        while let Some(visited) = dfs.next(&graph) {
            order.push(graph[visited]);
        }
    }

    let mut slots: Vec<Option<Definition>> = definitions.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect())
}

/// Graph with an edge from each definition to every definition it embeds by
/// value. Node weights are indices into `definitions`.
fn dependency_graph(definitions: &[Definition]) -> Result<DiGraph<usize, ()>, CompilationError> {
    let mut graph = DiGraph::with_capacity(definitions.len(), definitions.len());
    let mut by_symbol = FxHashMap::default();
    for (index, definition) in definitions.iter().enumerate() {
        let node = graph.add_node(index);
        by_symbol.insert(definition.symbol().as_str(), node);
    }

    for (index, definition) in definitions.iter().enumerate() {
        let from = NodeIndex::new(index);
        for dep in definition.value_dependencies() {
            let Some(&to) = by_symbol.get(dep.as_str()) else {
                continue;
            };
            if to == from {
                let symbol = definition.symbol().to_string();
                return Err(CompilationError::CyclicTemplateDependency {
                    cycle: vec![symbol.clone(), symbol],
                });
            }
            graph.update_edge(from, to, ());
        }
    }

    Ok(graph)
}

/// Shortest path `start -> ... -> start`, if one exists.
fn cycle_through(graph: &DiGraph<usize, ()>, start: NodeIndex) -> Option<Vec<NodeIndex>> {
    let mut previous: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            if next == start {
                let mut path = vec![node];
                let mut cursor = node;
                while cursor != start {
                    cursor = previous[&cursor];
                    path.push(cursor);
                }
                path.reverse();
                path.push(start);
                return Some(path);
            }
            if !previous.contains_key(&next) {
                previous.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    None
}
