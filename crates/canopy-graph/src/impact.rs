//! Blast-radius analysis for a focus node.
//!
//! Two named policies serve two different callers and are deliberately not
//! unified:
//!
//! - `Unbounded`: full bidirectional BFS, severity scored from weighted
//!   function/file/domain counts and classified into 0-100 bands.
//! - `DepthCapped`: dependents-only walk with a hop cap, classified by raw
//!   affected-count thresholds.
//!
//! Results are computed fresh per call; unlike the relationship engine
//! this path carries no cache.

use crate::graph::DepGraph;
use canopy_core::GraphNode;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default hop cap for the depth-capped policy.
pub const DEFAULT_IMPACT_CAP: usize = 5;

/// Which traversal and risk classification to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ImpactPolicy {
    /// Full upstream and downstream walk, severity-score risk bands.
    Unbounded,
    /// Dependents-only walk capped at `max_depth`, raw-count risk bands.
    DepthCapped { max_depth: usize },
}

impl ImpactPolicy {
    /// The depth-capped policy with its default cap.
    pub fn depth_capped() -> Self {
        Self::DepthCapped {
            max_depth: DEFAULT_IMPACT_CAP,
        }
    }
}

impl Default for ImpactPolicy {
    fn default() -> Self {
        Self::Unbounded
    }
}

/// Risk classification of a change.
///
/// Never construct directly — use `from_severity` or `from_affected_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classifies a 0-100 severity score.
    ///
    /// Half-open bands: `<25` low, `25-49` medium, `50-74` high, `>=75`
    /// critical.
    pub fn from_severity(score: f64) -> Self {
        if score < 25.0 {
            Self::Low
        } else if score < 50.0 {
            Self::Medium
        } else if score < 75.0 {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Classifies a raw affected-node count.
    ///
    /// Thresholds: `<=5` low, `6-15` medium, `>15` high. A coarser policy
    /// than the severity bands; the two sets of magic numbers are tuned
    /// independently and must stay distinct.
    pub fn from_affected_count(count: usize) -> Self {
        if count <= 5 {
            Self::Low
        } else if count <= 15 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complete impact analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactResult {
    /// The analyzed node id.
    pub focus_id: String,
    /// Nodes depending on the focus, BFS discovery order, no duplicates.
    pub upstream: Vec<String>,
    /// Nodes the focus depends on. Empty under `DepthCapped`.
    pub downstream: Vec<String>,
    /// `|upstream ∪ downstream|`, focus excluded.
    pub affected_functions: usize,
    /// Distinct file paths touched by affected nodes plus the focus.
    pub affected_files: usize,
    /// Distinct domains touched by affected nodes plus the focus.
    pub affected_domains: usize,
    /// Severity score (0-100) under `Unbounded`; raw affected count under
    /// `DepthCapped`.
    pub score: f64,
    /// Risk classification per the active policy.
    pub risk: RiskLevel,
}

impl ImpactResult {
    fn empty(focus_id: &str) -> Self {
        Self {
            focus_id: focus_id.to_string(),
            upstream: Vec::new(),
            downstream: Vec::new(),
            affected_functions: 0,
            affected_files: 0,
            affected_domains: 0,
            score: 0.0,
            risk: RiskLevel::Low,
        }
    }
}

/// Analyzes the blast radius of changing `focus_id` under `policy`.
///
/// An unknown focus id yields an all-empty, low-risk result.
pub fn analyze_impact(graph: &DepGraph, focus_id: &str, policy: ImpactPolicy) -> ImpactResult {
    let Some(focus_idx) = graph.index_of(focus_id) else {
        return ImpactResult::empty(focus_id);
    };

    let (upstream, downstream) = match policy {
        ImpactPolicy::Unbounded => (
            graph.traverse_ids(focus_idx, Direction::Incoming, usize::MAX),
            graph.traverse_ids(focus_idx, Direction::Outgoing, usize::MAX),
        ),
        ImpactPolicy::DepthCapped { max_depth } => (
            graph.traverse_ids(focus_idx, Direction::Incoming, max_depth),
            Vec::new(),
        ),
    };

    let affected: HashSet<&str> = upstream
        .iter()
        .chain(downstream.iter())
        .map(String::as_str)
        .collect();
    let affected_functions = affected.len();

    // Files and domains count the focus node itself as touched.
    let mut files: HashSet<&str> = HashSet::new();
    let mut domains: HashSet<&str> = HashSet::new();
    for id in affected.iter().copied().chain([focus_id]) {
        if let Some(node) = graph.get(id) {
            if let Some(path) = node.file_path() {
                files.insert(path);
            }
            domains.insert(node.domain());
        }
    }
    let affected_files = files.len();
    let affected_domains = domains.len();

    let (score, risk) = match policy {
        ImpactPolicy::Unbounded => {
            let raw = affected_functions as f64
                + affected_files as f64 * 5.0
                + affected_domains as f64 * 20.0;
            let hint = impact_depth_hint(graph.get(focus_id));
            let score = (raw * hint / 5.0).clamp(0.0, 100.0);
            (score, RiskLevel::from_severity(score))
        }
        ImpactPolicy::DepthCapped { .. } => (
            affected_functions as f64,
            RiskLevel::from_affected_count(affected_functions),
        ),
    };

    ImpactResult {
        focus_id: focus_id.to_string(),
        upstream,
        downstream,
        affected_functions,
        affected_files,
        affected_domains,
        score,
        risk,
    }
}

/// Runs `analyze_impact` independently per id. No shared state across
/// calls.
pub fn batch_analyze_impact(
    graph: &DepGraph,
    focus_ids: &[String],
    policy: ImpactPolicy,
) -> Vec<ImpactResult> {
    focus_ids
        .iter()
        .map(|id| analyze_impact(graph, id, policy))
        .collect()
}

/// Externally supplied 1-10 risk hint; absent means 1 (a 0.2x dampener).
fn impact_depth_hint(node: Option<&GraphNode>) -> f64 {
    match node {
        Some(GraphNode::Symbol(s)) => s.impact_depth.map(f64::from).unwrap_or(1.0),
        _ => 1.0,
    }
}
