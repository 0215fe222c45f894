//! Core graph data structure.
//!
//! `DepGraph` wraps petgraph and adds id/file indexes for fast lookups.
//! It is built once per snapshot and shared read-only by every traversal;
//! rebuilding adjacency per query is the dominant cost this avoids.

use canopy_core::{EdgeKind, GraphNode, GraphSnapshot, RawEdge};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// The in-memory dependency graph for one snapshot.
#[derive(Debug, Default)]
pub struct DepGraph {
    /// The underlying petgraph graph. Parallel edges are kept as-is.
    graph: DiGraph<GraphNode, EdgeKind>,

    /// Maps string node ids to graph indexes.
    id_index: HashMap<String, NodeId>,

    /// Maps file paths to node ids (files and the symbols they define).
    file_index: HashMap<String, Vec<NodeId>>,

    /// Edges dropped because an endpoint id was absent from the node set.
    skipped_edges: usize,
}

impl DepGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from a snapshot in one pass over nodes, then edges.
    ///
    /// Edges whose source or target id is absent from the node set are
    /// counted and skipped, never an error.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let mut graph = Self::new();
        for node in snapshot.nodes() {
            graph.add_node(node);
        }
        for edge in &snapshot.edges {
            graph.add_raw_edge(edge);
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped = graph.skipped_edges,
            "graph built from snapshot"
        );
        graph
    }

    /// Adds a node and updates the lookup indexes.
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let id = node.id().to_string();
        let file = node.file_path().map(str::to_string);

        let index = self.graph.add_node(node);
        self.id_index.insert(id, index);
        if let Some(file) = file {
            self.file_index.entry(file).or_default().push(index);
        }
        index
    }

    /// Adds an edge by string ids. Returns false when an endpoint is
    /// unknown and the edge was skipped.
    pub fn add_raw_edge(&mut self, edge: &RawEdge) -> bool {
        match (
            self.id_index.get(&edge.source),
            self.id_index.get(&edge.target),
        ) {
            (Some(&from), Some(&to)) => {
                self.graph.add_edge(from, to, edge.kind);
                true
            }
            _ => {
                self.skipped_edges += 1;
                false
            }
        }
    }

    /// Gets a node by its string id.
    pub fn get(&self, id: &str) -> Option<&GraphNode> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets the graph index for a string id.
    pub fn index_of(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// Gets a node by its graph index.
    pub fn node_at(&self, index: NodeId) -> Option<&GraphNode> {
        self.graph.node_weight(index)
    }

    /// Ids of nodes with an edge into `id` (callers, importers, ...).
    ///
    /// Unknown ids yield an empty list. Duplicate edges yield duplicate
    /// entries; degree-sensitive callers deduplicate themselves.
    pub fn incoming(&self, id: &str) -> Vec<&str> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    /// Ids of nodes `id` has an edge to (callees, imports, ...).
    pub fn outgoing(&self, id: &str) -> Vec<&str> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    fn neighbor_ids(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&index) = self.id_index.get(id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(index, direction)
            .filter_map(|idx| self.graph.node_weight(idx))
            .map(GraphNode::id)
            .collect()
    }

    /// Bounded BFS from `start`, walking `direction` edges up to
    /// `max_depth` hops.
    ///
    /// Returns distinct reached nodes in discovery order, excluding the
    /// start node. The visited set guarantees termination on cycles, and a
    /// self-loop never puts the start node in its own result.
    pub fn traverse(&self, start: NodeId, direction: Direction, max_depth: usize) -> Vec<NodeId> {
        let mut result = Vec::new();
        if max_depth == 0 {
            return result;
        }

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
        visited.insert(start);
        queue.push_back((start, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for neighbor in self.graph.neighbors_directed(current, direction) {
                if visited.insert(neighbor) {
                    result.push(neighbor);
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        result
    }

    /// Like `traverse`, but returns string ids.
    pub fn traverse_ids(
        &self,
        start: NodeId,
        direction: Direction,
        max_depth: usize,
    ) -> Vec<String> {
        self.traverse(start, direction, max_depth)
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx))
            .map(|n| n.id().to_string())
            .collect()
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Iterates over all edges as (source id, target id, kind) triples.
    pub fn edge_triples(&self) -> impl Iterator<Item = (&str, &str, EdgeKind)> + '_ {
        self.graph.edge_references().filter_map(|edge_ref| {
            let source = self.graph.node_weight(edge_ref.source())?;
            let target = self.graph.node_weight(edge_ref.target())?;
            Some((source.id(), target.id(), *edge_ref.weight()))
        })
    }

    /// Finds all nodes anchored to a file.
    pub fn find_by_file(&self, file: &str) -> Vec<&GraphNode> {
        self.file_index
            .get(file)
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|idx| self.graph.node_weight(*idx))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            files: self.file_index.len(),
            skipped_edges: self.skipped_edges,
        }
    }
}

/// Graph statistics for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub files: usize,
    pub skipped_edges: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{FileNode, RawEdge, SymbolKind, SymbolNode};

    fn symbol(name: &str, file: &str, line: u32) -> GraphNode {
        GraphNode::Symbol(SymbolNode::new(name, SymbolKind::Function, file, line, line))
    }

    fn call(source: &str, target: &str) -> RawEdge {
        RawEdge::new(source, target, EdgeKind::Call)
    }

    #[test]
    fn test_edge_with_unknown_endpoint_is_skipped() {
        let mut graph = DepGraph::new();
        graph.add_node(symbol("a", "a.ts", 1));

        assert!(!graph.add_raw_edge(&call("a.ts:a:1", "ghost")));
        assert!(!graph.add_raw_edge(&call("ghost", "a.ts:a:1")));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.stats().skipped_edges, 2);
    }

    #[test]
    fn test_incoming_outgoing_unknown_id_is_empty() {
        let graph = DepGraph::new();
        assert!(graph.incoming("nope").is_empty());
        assert!(graph.outgoing("nope").is_empty());
    }

    #[test]
    fn test_adjacency_directions() {
        let mut graph = DepGraph::new();
        graph.add_node(symbol("a", "a.ts", 1));
        graph.add_node(symbol("b", "b.ts", 1));
        assert!(graph.add_raw_edge(&call("a.ts:a:1", "b.ts:b:1")));

        assert_eq!(graph.outgoing("a.ts:a:1"), vec!["b.ts:b:1"]);
        assert_eq!(graph.incoming("b.ts:b:1"), vec!["a.ts:a:1"]);
        assert!(graph.incoming("a.ts:a:1").is_empty());
    }

    #[test]
    fn test_duplicate_edges_are_kept() {
        let mut graph = DepGraph::new();
        graph.add_node(symbol("a", "a.ts", 1));
        graph.add_node(symbol("b", "b.ts", 1));
        graph.add_raw_edge(&call("a.ts:a:1", "b.ts:b:1"));
        graph.add_raw_edge(&call("a.ts:a:1", "b.ts:b:1"));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.outgoing("a.ts:a:1").len(), 2);
    }

    #[test]
    fn test_traverse_terminates_on_cycle() {
        // a -> b -> c -> a
        let mut graph = DepGraph::new();
        graph.add_node(symbol("a", "a.ts", 1));
        graph.add_node(symbol("b", "b.ts", 1));
        graph.add_node(symbol("c", "c.ts", 1));
        graph.add_raw_edge(&call("a.ts:a:1", "b.ts:b:1"));
        graph.add_raw_edge(&call("b.ts:b:1", "c.ts:c:1"));
        graph.add_raw_edge(&call("c.ts:c:1", "a.ts:a:1"));

        let start = graph.index_of("a.ts:a:1").unwrap();
        let reached = graph.traverse_ids(start, Direction::Outgoing, usize::MAX);
        assert_eq!(reached, vec!["b.ts:b:1", "c.ts:c:1"]);
    }

    #[test]
    fn test_traverse_depth_zero_is_empty() {
        let mut graph = DepGraph::new();
        graph.add_node(symbol("a", "a.ts", 1));
        graph.add_node(symbol("b", "b.ts", 1));
        graph.add_raw_edge(&call("a.ts:a:1", "b.ts:b:1"));

        let start = graph.index_of("a.ts:a:1").unwrap();
        assert!(graph.traverse(start, Direction::Outgoing, 0).is_empty());
    }

    #[test]
    fn test_traverse_respects_depth_cap() {
        // chain a -> b -> c -> d
        let mut graph = DepGraph::new();
        for (name, file) in [("a", "a.ts"), ("b", "b.ts"), ("c", "c.ts"), ("d", "d.ts")] {
            graph.add_node(symbol(name, file, 1));
        }
        graph.add_raw_edge(&call("a.ts:a:1", "b.ts:b:1"));
        graph.add_raw_edge(&call("b.ts:b:1", "c.ts:c:1"));
        graph.add_raw_edge(&call("c.ts:c:1", "d.ts:d:1"));

        let start = graph.index_of("a.ts:a:1").unwrap();
        let reached = graph.traverse_ids(start, Direction::Outgoing, 2);
        assert_eq!(reached, vec!["b.ts:b:1", "c.ts:c:1"]);
    }

    #[test]
    fn test_self_loop_excluded_from_traverse() {
        let mut graph = DepGraph::new();
        graph.add_node(symbol("a", "a.ts", 1));
        graph.add_raw_edge(&call("a.ts:a:1", "a.ts:a:1"));

        let start = graph.index_of("a.ts:a:1").unwrap();
        assert!(graph.traverse(start, Direction::Outgoing, usize::MAX).is_empty());
        assert!(graph.traverse(start, Direction::Incoming, usize::MAX).is_empty());
    }

    #[test]
    fn test_find_by_file_groups_file_and_symbols() {
        let mut graph = DepGraph::new();
        graph.add_node(GraphNode::File(FileNode::new("a.ts")));
        graph.add_node(symbol("f", "a.ts", 1));
        graph.add_node(symbol("g", "b.ts", 1));

        let in_a = graph.find_by_file("a.ts");
        assert_eq!(in_a.len(), 2);
    }
}
