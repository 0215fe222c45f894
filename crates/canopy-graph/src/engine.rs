//! The query surface exposed to the rendering/UI layer.
//!
//! `GraphEngine` owns the per-snapshot state: the dependency graph, the
//! coupling metrics computed once per load, and the relationship memo
//! cache. All operations are synchronous and total; loading a snapshot
//! rebuilds the graph, recomputes coupling, and clears the cache in one
//! step so stale relationship results can never be observed.

use crate::coupling::CouplingMetrics;
use crate::graph::{DepGraph, GraphStats};
use crate::impact::{
    analyze_impact, batch_analyze_impact, ImpactPolicy, ImpactResult, DEFAULT_IMPACT_CAP,
};
use crate::relations::{CacheStats, RelationshipEngine, RelationshipResult, DEFAULT_RELATION_DEPTH};
use crate::resolver::{upgrade_call_edges, DefinitionResolver};
use crate::view::{apply_view_mode, ViewContext, ViewOptions, ViewResult};
use canopy_core::GraphSnapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Engine tunables, deserializable from the editor layer's settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hop cap for related-node queries when the caller passes none.
    pub relation_depth: usize,
    /// Opacity for nodes outside the focus neighborhood.
    pub dim_opacity: f32,
    /// Search queries at or below this length are ignored.
    pub min_query_len: usize,
    /// Hop cap for depth-capped impact analysis when the caller passes no
    /// explicit policy depth.
    pub impact_max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            relation_depth: DEFAULT_RELATION_DEPTH,
            dim_opacity: crate::view::DIM_OPACITY,
            min_query_len: crate::view::MIN_QUERY_LEN,
            impact_max_depth: DEFAULT_IMPACT_CAP,
        }
    }
}

/// Owns one snapshot's worth of derived state and answers queries on it.
#[derive(Debug, Default)]
pub struct GraphEngine {
    config: EngineConfig,
    graph: DepGraph,
    coupling: CouplingMetrics,
    relations: RelationshipEngine,
}

impl GraphEngine {
    /// Creates an engine with default configuration and no data loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with explicit configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Replaces the current snapshot.
    ///
    /// Rebuilds adjacency, recomputes coupling metrics once, and clears
    /// the relationship cache atomically with respect to the engine's
    /// single logical thread.
    pub fn load_snapshot(&mut self, snapshot: &GraphSnapshot) {
        self.graph = DepGraph::from_snapshot(snapshot);
        self.coupling = CouplingMetrics::compute(&self.graph);
        self.relations.invalidate();
        info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "snapshot loaded"
        );
    }

    /// Like `load_snapshot`, but first runs the snapshot's low-confidence
    /// call edges through the external definition resolver.
    pub fn load_snapshot_with_resolver(
        &mut self,
        snapshot: &GraphSnapshot,
        resolver: &dyn DefinitionResolver,
    ) {
        let upgraded = upgrade_call_edges(snapshot, resolver);
        self.load_snapshot(&upgraded);
    }

    /// Read access to the loaded graph.
    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    /// Categorized related-node sets around a focus node.
    ///
    /// `depth` falls back to the configured default; negative values from
    /// loosely-typed callers clamp to zero, meaning "no traversal".
    pub fn related_nodes(&mut self, focus_id: &str, depth: Option<i64>) -> RelationshipResult {
        let depth = match depth {
            Some(d) => usize::try_from(d).unwrap_or(0),
            None => self.config.relation_depth,
        };
        self.relations.related_nodes(&self.graph, focus_id, depth)
    }

    /// Blast-radius analysis under the given policy.
    pub fn analyze_impact(&self, focus_id: &str, policy: ImpactPolicy) -> ImpactResult {
        analyze_impact(&self.graph, focus_id, policy)
    }

    /// Depth-capped blast-radius analysis at the configured hop cap.
    pub fn analyze_impact_capped(&self, focus_id: &str) -> ImpactResult {
        analyze_impact(
            &self.graph,
            focus_id,
            ImpactPolicy::DepthCapped {
                max_depth: self.config.impact_max_depth,
            },
        )
    }

    /// Independent impact analysis per id.
    pub fn batch_analyze_impact(
        &self,
        focus_ids: &[String],
        policy: ImpactPolicy,
    ) -> Vec<ImpactResult> {
        batch_analyze_impact(&self.graph, focus_ids, policy)
    }

    /// Runs the view filter pipeline against the loaded graph.
    pub fn apply_view_mode(&self, ctx: &ViewContext) -> ViewResult {
        let options = ViewOptions {
            dim_opacity: self.config.dim_opacity,
            min_query_len: self.config.min_query_len,
        };
        apply_view_mode(&self.graph, ctx, options)
    }

    /// Per-node coupling metrics for the loaded snapshot.
    pub fn coupling_metrics(&self) -> &CouplingMetrics {
        &self.coupling
    }

    /// Drops every memoized relationship result.
    pub fn clear_relationship_cache(&mut self) {
        self.relations.invalidate();
    }

    /// Relationship-cache introspection: size and keys.
    pub fn cache_stats(&self) -> CacheStats {
        self.relations.cache_stats()
    }

    /// Graph-level statistics.
    pub fn graph_stats(&self) -> GraphStats {
        self.graph.stats()
    }
}
