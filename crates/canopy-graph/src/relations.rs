//! Related-node queries around a focus node.
//!
//! Structural relations (parents, children, same-file siblings) come from
//! linear passes over the node set; callers and callees come from two
//! independent bounded BFS walks, one per direction, each with its own
//! visited set. Results are memoized per `(focus, depth)` in an engine-owned
//! cache whose only mutation is a wholesale clear.

use crate::graph::DepGraph;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

/// Default hop cap for caller/callee walks.
pub const DEFAULT_RELATION_DEPTH: usize = 2;

/// Categorized nodes related to a focus node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipResult {
    /// The queried node id.
    pub focus_id: String,
    /// Nodes the focus declares as its structural parent.
    pub parents: Vec<String>,
    /// Nodes declaring the focus as their structural parent.
    pub children: Vec<String>,
    /// Nodes reaching the focus within the hop cap (incoming walk).
    pub callers: Vec<String>,
    /// Nodes the focus reaches within the hop cap (outgoing walk).
    pub callees: Vec<String>,
    /// Nodes sharing the focus node's file, focus excluded.
    pub same_file: Vec<String>,
    /// Union of the five categories, focus excluded, sorted.
    pub all: Vec<String>,
}

impl RelationshipResult {
    fn empty(focus_id: &str) -> Self {
        Self {
            focus_id: focus_id.to_string(),
            ..Self::default()
        }
    }
}

/// Cache size and keys, for introspection by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub keys: Vec<String>,
}

/// Memo cache for relationship results.
///
/// Keyed by `focus_id:depth`. No fine-grained invalidation: the owner
/// clears it wholesale whenever the node/edge set changes.
#[derive(Debug, Default)]
pub struct RelationCache {
    entries: HashMap<String, RelationshipResult>,
}

impl RelationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(focus_id: &str, depth: usize) -> String {
        format!("{}:{}", focus_id, depth)
    }

    fn get(&self, focus_id: &str, depth: usize) -> Option<&RelationshipResult> {
        self.entries.get(&Self::key(focus_id, depth))
    }

    fn insert(&mut self, focus_id: &str, depth: usize, result: RelationshipResult) {
        self.entries.insert(Self::key(focus_id, depth), result);
    }

    /// Drops every cached entry. The only mutation entry point besides
    /// inserts performed by the engine itself.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    /// Returns entry count and sorted keys.
    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            entries: self.entries.len(),
            keys,
        }
    }
}

/// Computes and memoizes relationship results.
#[derive(Debug, Default)]
pub struct RelationshipEngine {
    cache: RelationCache,
}

impl RelationshipEngine {
    /// Creates an engine with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the categorized related-node sets for `focus_id`.
    ///
    /// An unknown focus id returns all-empty sets. `depth` caps only the
    /// caller/callee walks; parents, children and same-file relations are
    /// not depth-gated.
    pub fn related_nodes(
        &mut self,
        graph: &DepGraph,
        focus_id: &str,
        depth: usize,
    ) -> RelationshipResult {
        if let Some(hit) = self.cache.get(focus_id, depth) {
            trace!(focus = focus_id, depth, "relationship cache hit");
            return hit.clone();
        }
        let result = compute_related(graph, focus_id, depth);
        self.cache.insert(focus_id, depth, result.clone());
        result
    }

    /// Clears the memo cache. Must be called whenever the underlying
    /// node/edge set changes; the engine performs no automatic invalidation.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Cache introspection.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn compute_related(graph: &DepGraph, focus_id: &str, depth: usize) -> RelationshipResult {
    let Some(focus_idx) = graph.index_of(focus_id) else {
        return RelationshipResult::empty(focus_id);
    };
    let Some(focus) = graph.node_at(focus_idx) else {
        return RelationshipResult::empty(focus_id);
    };

    // Structural pass: O(n) comparison of declared parent links.
    let mut parents = Vec::new();
    let mut children = Vec::new();
    if let Some(parent_id) = focus.parent() {
        if graph.get(parent_id).is_some() {
            parents.push(parent_id.to_string());
        }
    }
    for node in graph.nodes() {
        if node.parent() == Some(focus_id) {
            children.push(node.id().to_string());
        }
    }

    // Same-file pass, focus excluded.
    let same_file = match focus.file_path() {
        Some(path) => graph
            .find_by_file(path)
            .into_iter()
            .filter(|n| n.id() != focus_id)
            .map(|n| n.id().to_string())
            .collect(),
        None => Vec::new(),
    };

    // Two independent bounded walks, one visited set each.
    let callers = graph.traverse_ids(focus_idx, Direction::Incoming, depth);
    let callees = graph.traverse_ids(focus_idx, Direction::Outgoing, depth);

    let all: BTreeSet<String> = parents
        .iter()
        .chain(children.iter())
        .chain(callers.iter())
        .chain(callees.iter())
        .chain(same_file.iter())
        .filter(|id| id.as_str() != focus_id)
        .cloned()
        .collect();

    RelationshipResult {
        focus_id: focus_id.to_string(),
        parents,
        children,
        callers,
        callees,
        same_file,
        all: all.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{EdgeKind, FileNode, GraphNode, RawEdge, SymbolKind, SymbolNode};

    fn fixture() -> DepGraph {
        // file.ts contains f and g; caller calls f; f calls callee.
        let mut graph = DepGraph::new();
        graph.add_node(GraphNode::File(FileNode::new("file.ts")));
        graph.add_node(GraphNode::Symbol(
            SymbolNode::new("f", SymbolKind::Function, "file.ts", 1, 5).with_parent("file.ts"),
        ));
        graph.add_node(GraphNode::Symbol(
            SymbolNode::new("g", SymbolKind::Function, "file.ts", 6, 9).with_parent("file.ts"),
        ));
        graph.add_node(GraphNode::Symbol(SymbolNode::new(
            "caller",
            SymbolKind::Function,
            "other.ts",
            1,
            4,
        )));
        graph.add_node(GraphNode::Symbol(SymbolNode::new(
            "callee",
            SymbolKind::Function,
            "deep.ts",
            1,
            4,
        )));
        graph.add_raw_edge(&RawEdge::new("other.ts:caller:1", "file.ts:f:1", EdgeKind::Call));
        graph.add_raw_edge(&RawEdge::new("file.ts:f:1", "deep.ts:callee:1", EdgeKind::Call));
        graph
    }

    #[test]
    fn test_all_five_categories() {
        let graph = fixture();
        let mut engine = RelationshipEngine::new();
        let result = engine.related_nodes(&graph, "file.ts:f:1", 2);

        assert_eq!(result.parents, vec!["file.ts"]);
        assert!(result.children.is_empty());
        assert_eq!(result.callers, vec!["other.ts:caller:1"]);
        assert_eq!(result.callees, vec!["deep.ts:callee:1"]);
        // file.ts itself and g share the file path.
        assert_eq!(result.same_file.len(), 2);
        assert!(result.same_file.contains(&"file.ts".to_string()));
        assert!(result.same_file.contains(&"file.ts:g:6".to_string()));
    }

    #[test]
    fn test_children_of_file_node() {
        let graph = fixture();
        let mut engine = RelationshipEngine::new();
        let result = engine.related_nodes(&graph, "file.ts", 2);

        assert_eq!(result.children, vec!["file.ts:f:1", "file.ts:g:6"]);
        assert!(result.parents.is_empty(), "file has no parent declared");
    }

    #[test]
    fn test_depth_zero_gates_only_traversals() {
        let graph = fixture();
        let mut engine = RelationshipEngine::new();
        let result = engine.related_nodes(&graph, "file.ts:f:1", 0);

        assert!(result.callers.is_empty());
        assert!(result.callees.is_empty());
        assert_eq!(result.parents, vec!["file.ts"]);
        assert_eq!(result.same_file.len(), 2);

        // `all` stays consistent with the non-gated categories.
        let expected: BTreeSet<String> = result
            .parents
            .iter()
            .chain(result.same_file.iter())
            .cloned()
            .collect();
        assert_eq!(result.all, expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_unknown_focus_returns_empty() {
        let graph = fixture();
        let mut engine = RelationshipEngine::new();
        let result = engine.related_nodes(&graph, "ghost", 2);

        assert_eq!(result.focus_id, "ghost");
        assert!(result.all.is_empty());
        assert!(result.parents.is_empty());
        assert!(result.callers.is_empty());
    }

    #[test]
    fn test_all_excludes_focus() {
        // Self-loop on f must not place f in its own `all` set.
        let mut graph = fixture();
        graph.add_raw_edge(&RawEdge::new("file.ts:f:1", "file.ts:f:1", EdgeKind::Call));
        let mut engine = RelationshipEngine::new();
        let result = engine.related_nodes(&graph, "file.ts:f:1", 2);

        assert!(!result.all.contains(&"file.ts:f:1".to_string()));
    }

    #[test]
    fn test_node_reachable_both_directions_lands_in_both_sets() {
        // f <-> h mutual recursion.
        let mut graph = fixture();
        graph.add_node(GraphNode::Symbol(SymbolNode::new(
            "h",
            SymbolKind::Function,
            "h.ts",
            1,
            2,
        )));
        graph.add_raw_edge(&RawEdge::new("file.ts:f:1", "h.ts:h:1", EdgeKind::Call));
        graph.add_raw_edge(&RawEdge::new("h.ts:h:1", "file.ts:f:1", EdgeKind::Call));

        let mut engine = RelationshipEngine::new();
        let result = engine.related_nodes(&graph, "file.ts:f:1", 2);
        assert!(result.callers.contains(&"h.ts:h:1".to_string()));
        assert!(result.callees.contains(&"h.ts:h:1".to_string()));
    }

    #[test]
    fn test_cache_hit_and_invalidate() {
        let graph = fixture();
        let mut engine = RelationshipEngine::new();

        let first = engine.related_nodes(&graph, "file.ts:f:1", 2);
        let second = engine.related_nodes(&graph, "file.ts:f:1", 2);
        assert_eq!(first, second);

        let stats = engine.cache_stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.keys, vec!["file.ts:f:1:2"]);

        engine.invalidate();
        assert_eq!(engine.cache_stats().entries, 0);
    }

    #[test]
    fn test_cache_keys_distinguish_depth() {
        let graph = fixture();
        let mut engine = RelationshipEngine::new();
        engine.related_nodes(&graph, "file.ts:f:1", 1);
        engine.related_nodes(&graph, "file.ts:f:1", 2);
        assert_eq!(engine.cache_stats().entries, 2);
    }
}
