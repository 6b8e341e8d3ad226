//! petgraph-based field dependency graph.
//!
//! Built from `FormState.dependencies` (field → fields that must be
//! refreshed when it changes). Drives selective clearing on change events.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

pub struct DependencyGraph {
    pub graph: DiGraph<String, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn build(dependencies: &HashMap<String, Vec<String>>) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices: HashMap<String, NodeIndex> = HashMap::new();

        let mut index_of = |graph: &mut DiGraph<String, ()>,
                            indices: &mut HashMap<String, NodeIndex>,
                            key: &str| {
            match indices.get(key) {
                Some(&idx) => idx,
                None => {
                    let idx = graph.add_node(key.to_string());
                    indices.insert(key.to_string(), idx);
                    idx
                }
            }
        };

        for (field, dependents) in dependencies {
            let source = index_of(&mut graph, &mut node_indices, field);
            for dependent in dependents {
                let target = index_of(&mut graph, &mut node_indices, dependent);
                graph.add_edge(source, target, ());
            }
        }

        DependencyGraph { graph, node_indices }
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All fields transitively reachable from `key`, excluding `key` itself.
    pub fn dependents_of(&self, key: &str) -> HashSet<String> {
        let mut dependents = HashSet::new();
        let Some(&start) = self.node_indices.get(key) else {
            return dependents;
        };
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(idx) = bfs.next(&self.graph) {
            if idx != start {
                dependents.insert(self.graph[idx].clone());
            }
        }
        dependents
    }
}
