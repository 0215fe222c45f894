//! Canopy Graph - Analysis and view filtering
//!
//! This crate turns a graph snapshot into the exact node/edge subset an
//! interactive visualizer should render. It owns the traversal algorithms
//! (bounded and unbounded BFS for blast-radius and related-node queries),
//! the per-snapshot coupling metrics, and the mode-aware filter pipeline.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with an id index on top. Derived
//! state is split by lifecycle:
//! - coupling metrics are computed once per snapshot load
//! - relationship results are memoized per query and cleared wholesale on
//!   snapshot replacement
//! - impact results are computed fresh every call
//!
//! # Example
//!
//! ```
//! use canopy_core::{EdgeKind, GraphSnapshot, RawEdge, SymbolKind, SymbolNode};
//! use canopy_graph::{GraphEngine, ImpactPolicy};
//!
//! let snapshot = GraphSnapshot {
//!     symbols: vec![
//!         SymbolNode::new("login", SymbolKind::Function, "auth.ts", 1, 20),
//!         SymbolNode::new("hash", SymbolKind::Function, "crypto.ts", 1, 10),
//!     ],
//!     edges: vec![RawEdge::new("auth.ts:login:1", "crypto.ts:hash:1", EdgeKind::Call)],
//!     ..Default::default()
//! };
//!
//! let mut engine = GraphEngine::new();
//! engine.load_snapshot(&snapshot);
//! let impact = engine.analyze_impact("crypto.ts:hash:1", ImpactPolicy::Unbounded);
//! assert_eq!(impact.upstream, vec!["auth.ts:login:1"]);
//! ```

mod coupling;
mod engine;
mod graph;
mod impact;
mod relations;
mod resolver;
mod view;

pub use coupling::{heat_color, CouplingMetric, CouplingMetrics};
pub use engine::{EngineConfig, GraphEngine};
pub use graph::{DepGraph, GraphStats, NodeId};
pub use impact::{
    analyze_impact, batch_analyze_impact, ImpactPolicy, ImpactResult, RiskLevel,
    DEFAULT_IMPACT_CAP,
};
pub use relations::{
    CacheStats, RelationCache, RelationshipEngine, RelationshipResult, DEFAULT_RELATION_DEPTH,
};
pub use resolver::{
    upgrade_call_edges, CallSite, DefinitionResolver, ResolveError, ResolvedDefinition,
};
pub use view::{
    apply_view_mode, domain_color, ViewContext, ViewMode, ViewOptions, ViewResult, VisibleEdge,
    VisibleNode, DIM_OPACITY, MIN_QUERY_LEN,
};
