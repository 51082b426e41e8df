//! Graph view of a dependency map.
//!
//! The resolver works directly on the name-keyed map; this view exists for
//! diagnostics, such as listing every cycle at once or rendering the graph
//! for Graphviz.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use petgraph::algo::tarjan_scc;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

/// Directed graph with an edge `A -> B` when table `A` reads from `B`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph from per-table dependency sets.
    ///
    /// Referenced names that have no entry of their own still become nodes.
    pub fn from_dependencies(dependencies: &IndexMap<String, IndexSet<String>>) -> Self {
        let mut graph = Self::default();

        for name in dependencies.keys() {
            graph.node(name);
        }
        for (name, deps) in dependencies {
            let from = graph.node(name);
            for dep in deps {
                let to = graph.node(dep);
                graph.graph.update_edge(from, to, ());
            }
        }

        graph
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_indices.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Does `from` read directly from `to`?
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.node_indices.get(from), self.node_indices.get(to)) {
            (Some(a), Some(b)) => self.graph.contains_edge(*a, *b),
            _ => false,
        }
    }

    /// Every cycle in the graph, one list of table names per strongly
    /// connected component. A single table is a cycle only if it reads
    /// from itself.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| match scc.as_slice() {
                [idx] => self.graph.contains_edge(*idx, *idx),
                _ => true,
            })
            .map(|scc| {
                let mut names: Vec<String> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect();
                names.sort();
                names
            })
            .collect()
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles().is_empty()
    }

    /// Render the graph in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        format!("{:?}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
    }
}
