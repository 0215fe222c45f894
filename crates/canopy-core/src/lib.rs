//! Canopy Core - Snapshot data model
//!
//! This crate defines what the rest of Canopy computes over: the node and
//! edge types of the code graph and the snapshot container the editor
//! layer hands to the engine.
//!
//! # Example
//!
//! ```
//! use canopy_core::{FileNode, GraphSnapshot, SymbolKind, SymbolNode};
//!
//! let snapshot = GraphSnapshot {
//!     files: vec![FileNode::new("src/auth.ts")],
//!     symbols: vec![SymbolNode::new("login", SymbolKind::Function, "src/auth.ts", 10, 30)],
//!     ..Default::default()
//! };
//! assert_eq!(snapshot.node_count(), 2);
//! ```

mod edge;
mod node;
mod snapshot;

pub use edge::{EdgeKind, RawEdge};
pub use node::{
    domain_id, symbol_id, DomainNode, FileNode, GraphNode, SymbolKind, SymbolNode, DOMAIN_PREFIX,
    UNKNOWN_DOMAIN,
};
pub use snapshot::{GraphSnapshot, SnapshotError};
