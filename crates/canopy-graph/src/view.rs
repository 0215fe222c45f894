//! Mode-aware view filtering.
//!
//! `apply_view_mode` is a pure function over the graph and a view context.
//! It runs three stages in order:
//!
//! 1. mode filter — node-kind selection per the closed `ViewMode` enum
//! 2. focus dimming — non-destructive opacity drop outside the focus
//!    neighborhood
//! 3. search refinement — destructive: unmatched, non-ancestor nodes are
//!    physically removed, not dimmed, so stale layout positions never
//!    clutter the render
//!
//! Keeping the search stage separate lets it be swapped for non-destructive
//! highlighting without touching mode filtering.

use crate::graph::DepGraph;
use canopy_core::{domain_id, EdgeKind, GraphNode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opacity assigned to nodes outside the focus neighborhood.
pub const DIM_OPACITY: f32 = 0.25;

/// Queries at or below this length are ignored.
pub const MIN_QUERY_LEN: usize = 2;

/// Fallback palette for domains without a declared color.
const DOMAIN_PALETTE: [&str; 8] = [
    "#3b82f6", "#8b5cf6", "#ec4899", "#f97316", "#14b8a6", "#84cc16", "#06b6d4", "#a855f7",
];

/// The three mutually exclusive presentation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Domain- and file-level structure only.
    Architecture,
    /// Every node kind.
    Codebase,
    /// Symbol nodes only; the caller pre-restricts input to a call trace.
    Trace,
}

impl ViewMode {
    /// Parses a UI mode string. Unknown values map to `None`, which the
    /// filter treats as passthrough — an explicit default, not an error.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "architecture" => Some(Self::Architecture),
            "codebase" => Some(Self::Codebase),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Architecture => "architecture",
            Self::Codebase => "codebase",
            Self::Trace => "trace",
        };
        write!(f, "{}", s)
    }
}

/// User context driving the filter pipeline.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    /// Current mode; `None` means passthrough.
    pub mode: Option<ViewMode>,
    /// Currently selected node, if any.
    pub focus: Option<String>,
    /// The focus node's neighborhood as computed by the relationship
    /// engine. Ignored when `focus` is `None`.
    pub related: HashSet<String>,
    /// Raw search box content.
    pub query: Option<String>,
}

/// Tunables the engine derives from its config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewOptions {
    pub dim_opacity: f32,
    pub min_query_len: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            dim_opacity: DIM_OPACITY,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

/// A node surviving the filter, with render annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleNode {
    pub id: String,
    /// 1.0 unless dimmed by focus.
    pub opacity: f32,
    /// Set exactly for direct search matches; false for structural-only
    /// ancestors.
    pub highlighted: bool,
    /// Disables independent heat/risk coloring while search highlighting
    /// is active.
    pub heat_disabled: bool,
}

/// An edge surviving the filter. Both endpoints are always visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    /// Line color derived from the target node's domain, in architecture
    /// and codebase modes.
    pub color: Option<String>,
}

/// The exact node/edge subset to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewResult {
    pub nodes: Vec<VisibleNode>,
    pub edges: Vec<VisibleEdge>,
}

/// Runs the full filter pipeline.
pub fn apply_view_mode(graph: &DepGraph, ctx: &ViewContext, options: ViewOptions) -> ViewResult {
    // Stage 1: mode filter. Exhaustive over the closed node-kind set.
    let kept: Vec<&GraphNode> = graph
        .nodes()
        .filter(|node| match ctx.mode {
            None => true,
            Some(ViewMode::Architecture) => match node {
                GraphNode::Domain(_) | GraphNode::File(_) => true,
                GraphNode::Symbol(_) => false,
            },
            Some(ViewMode::Codebase) => true,
            Some(ViewMode::Trace) => match node {
                GraphNode::Symbol(_) => true,
                GraphNode::Domain(_) | GraphNode::File(_) => false,
            },
        })
        .collect();

    // Stage 2: focus dimming. Non-destructive.
    let mut nodes: Vec<VisibleNode> = kept
        .iter()
        .map(|node| {
            let opacity = match &ctx.focus {
                Some(focus) if node.id() != focus && !ctx.related.contains(node.id()) => {
                    options.dim_opacity
                }
                _ => 1.0,
            };
            VisibleNode {
                id: node.id().to_string(),
                opacity,
                highlighted: false,
                heat_disabled: false,
            }
        })
        .collect();

    // Stage 3: search refinement. Destructive by design.
    if let Some(query) = active_query(ctx, options.min_query_len) {
        let matched: HashSet<&str> = kept
            .iter()
            .filter(|node| matches_query(node, &query))
            .map(|node| node.id())
            .collect();

        // Keep every structural ancestor of a match so the hierarchy stays
        // connected: no floating children in the rendered output. Ancestors
        // the mode filter already removed stay removed; search only refines
        // the stage-1 survivors.
        let mut keep: HashSet<&str> = matched.clone();
        for id in &matched {
            let mut current = graph.get(id).and_then(GraphNode::parent);
            let mut seen: HashSet<&str> = HashSet::new();
            while let Some(parent_id) = current {
                if !seen.insert(parent_id) {
                    break;
                }
                keep.insert(parent_id);
                current = graph.get(parent_id).and_then(GraphNode::parent);
            }
        }

        nodes = kept
            .iter()
            .filter(|node| keep.contains(node.id()))
            .map(|node| VisibleNode {
                id: node.id().to_string(),
                opacity: 1.0,
                highlighted: matched.contains(node.id()),
                heat_disabled: true,
            })
            .collect();
    }

    // Edges are always restricted to pairs where both endpoints survived.
    let visible_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let styled = matches!(
        ctx.mode,
        Some(ViewMode::Architecture) | Some(ViewMode::Codebase)
    );
    let edges = graph
        .edge_triples()
        .filter(|(source, target, _)| visible_ids.contains(source) && visible_ids.contains(target))
        .map(|(source, target, kind)| {
            let color = if styled {
                graph.get(target).map(|node| domain_color(graph, node))
            } else {
                None
            };
            VisibleEdge {
                source: source.to_string(),
                target: target.to_string(),
                kind,
                color,
            }
        })
        .collect();

    ViewResult { nodes, edges }
}

/// Deterministic line color for a node's domain: the domain node's
/// declared color when present, otherwise a stable hash onto the palette.
pub fn domain_color(graph: &DepGraph, node: &GraphNode) -> String {
    let name = node.domain();
    if let Some(GraphNode::Domain(domain)) = graph.get(&domain_id(name)) {
        if let Some(color) = &domain.color {
            return color.clone();
        }
    }
    let index = (fnv1a(name) % DOMAIN_PALETTE.len() as u64) as usize;
    DOMAIN_PALETTE[index].to_string()
}

// Length is measured on the raw string: surrounding whitespace counts
// toward activation and stays in the match pattern.
fn active_query(ctx: &ViewContext, min_len: usize) -> Option<String> {
    let query = ctx.query.as_deref()?.to_lowercase();
    (query.chars().count() > min_len).then_some(query)
}

fn matches_query(node: &GraphNode, query: &str) -> bool {
    if node.display_name().to_lowercase().contains(query) {
        return true;
    }
    if let Some(path) = node.file_path() {
        if path.to_lowercase().contains(query) {
            return true;
        }
    }
    if node.domain().to_lowercase().contains(query) {
        return true;
    }
    node.tags()
        .iter()
        .any(|tag| tag.to_lowercase().contains(query))
}

fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
