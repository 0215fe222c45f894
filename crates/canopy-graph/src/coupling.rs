//! Per-node coupling scores and heat colors.
//!
//! Computed once per snapshot load and held read-only until the next
//! snapshot replaces it. Deterministic for a given edge set, which lets
//! other layers use the result as a cache key.

use crate::graph::DepGraph;
use canopy_core::EdgeKind;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Color stops for the heat gradient: green -> amber -> red.
const HEAT_LOW: [u8; 3] = [0x22, 0xc5, 0x5e];
const HEAT_MID: [u8; 3] = [0xea, 0xb3, 0x08];
const HEAT_HIGH: [u8; 3] = [0xef, 0x44, 0x44];

/// Coupling numbers for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouplingMetric {
    /// Distinct inbound (source, target, kind) triples.
    pub in_degree: usize,
    /// Distinct outbound (source, target, kind) triples.
    pub out_degree: usize,
    /// Coupling between objects: in-degree + out-degree.
    pub cbo: usize,
    /// `cbo` divided by the snapshot's maximum cbo; 0 when there are no
    /// edges at all. Always in [0, 1].
    pub normalized: f64,
    /// Deterministic heat color for the normalized score.
    pub color: String,
}

/// Coupling metrics for a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CouplingMetrics {
    scores: HashMap<String, CouplingMetric>,
    max_cbo: usize,
}

impl CouplingMetrics {
    /// Computes metrics for every node in the graph.
    ///
    /// Duplicate edges between the same (source, target, kind) are treated
    /// as weight, not as extra neighbors: they count once toward degree.
    pub fn compute(graph: &DepGraph) -> Self {
        let mut seen: HashSet<(&str, &str, EdgeKind)> = HashSet::new();
        let mut in_degrees: HashMap<&str, usize> = HashMap::new();
        let mut out_degrees: HashMap<&str, usize> = HashMap::new();

        for (source, target, kind) in graph.edge_triples() {
            if seen.insert((source, target, kind)) {
                *out_degrees.entry(source).or_insert(0) += 1;
                *in_degrees.entry(target).or_insert(0) += 1;
            }
        }

        let max_cbo = graph
            .nodes()
            .map(|node| {
                in_degrees.get(node.id()).copied().unwrap_or(0)
                    + out_degrees.get(node.id()).copied().unwrap_or(0)
            })
            .max()
            .unwrap_or(0);

        let scores = graph
            .nodes()
            .map(|node| {
                let id = node.id();
                let in_degree = in_degrees.get(id).copied().unwrap_or(0);
                let out_degree = out_degrees.get(id).copied().unwrap_or(0);
                let cbo = in_degree + out_degree;
                let normalized = if max_cbo == 0 {
                    0.0
                } else {
                    cbo as f64 / max_cbo as f64
                };
                (
                    id.to_string(),
                    CouplingMetric {
                        in_degree,
                        out_degree,
                        cbo,
                        normalized,
                        color: heat_color(normalized),
                    },
                )
            })
            .collect();

        Self { scores, max_cbo }
    }

    /// Gets the metric for a node id.
    pub fn get(&self, id: &str) -> Option<&CouplingMetric> {
        self.scores.get(id)
    }

    /// Maximum cbo observed in the snapshot.
    pub fn max_cbo(&self) -> usize {
        self.max_cbo
    }

    /// Number of scored nodes.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True when no nodes were scored.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Maps a normalized score to a hex color.
///
/// Two independent linear blends, green->amber over [0, 0.5) and
/// amber->red over [0.5, 1], not one continuous gradient.
pub fn heat_color(score: f64) -> String {
    let t = score.clamp(0.0, 1.0);
    let (from, to, local) = if t < 0.5 {
        (HEAT_LOW, HEAT_MID, t / 0.5)
    } else {
        (HEAT_MID, HEAT_HIGH, (t - 0.5) / 0.5)
    };
    let channel = |i: usize| -> u8 {
        let a = from[i] as f64;
        let b = to[i] as f64;
        (a + (b - a) * local).round() as u8
    };
    format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
}
