//! The graph snapshot handed to the engine by the editor layer.
//!
//! A snapshot is always consumed as one unit; the engine never fetches
//! partial updates. Replacing the snapshot invalidates everything derived
//! from the previous one.

use crate::edge::RawEdge;
use crate::node::{DomainNode, FileNode, GraphNode, SymbolNode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors produced at the snapshot boundary.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A full graph snapshot: domains, files, symbols and typed edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub domains: Vec<DomainNode>,
    #[serde(default)]
    pub files: Vec<FileNode>,
    #[serde(default)]
    pub symbols: Vec<SymbolNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl GraphSnapshot {
    /// Decodes a snapshot from the editor layer's JSON payload.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        debug!(
            domains = snapshot.domains.len(),
            files = snapshot.files.len(),
            symbols = snapshot.symbols.len(),
            edges = snapshot.edges.len(),
            "snapshot decoded"
        );
        Ok(snapshot)
    }

    /// Total node count across all three kinds.
    pub fn node_count(&self) -> usize {
        self.domains.len() + self.files.len() + self.symbols.len()
    }

    /// Edge count, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates all node ids without cloning node payloads.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.domains
            .iter()
            .map(|d| d.id.as_str())
            .chain(self.files.iter().map(|f| f.id.as_str()))
            .chain(self.symbols.iter().map(|s| s.id.as_str()))
    }

    /// Iterates all nodes as `GraphNode` values, domains first, then files,
    /// then symbols. The order is stable and drives the graph's insertion
    /// order, so downstream outputs stay deterministic.
    pub fn nodes(&self) -> impl Iterator<Item = GraphNode> + '_ {
        self.domains
            .iter()
            .cloned()
            .map(GraphNode::Domain)
            .chain(self.files.iter().cloned().map(GraphNode::File))
            .chain(self.symbols.iter().cloned().map(GraphNode::Symbol))
    }
}
