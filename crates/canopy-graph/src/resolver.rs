//! Definition-resolution collaborator seam.
//!
//! Call edges produced by a purely syntactic indexer often point at bare
//! callee names rather than concrete symbol ids. An optional external
//! resolver (an LSP-backed service, typically) can upgrade those edges
//! before the snapshot reaches the graph. Best-effort: unresolvable
//! entries keep their original edge, per-item failures are never
//! propagated, and the outcome is logged as a `resolved/total` count.

use canopy_core::{symbol_id, GraphSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the external resolver as a whole. Per-item failures are
/// expressed as `None` results instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("definition resolver unavailable: {0}")]
    Unavailable(String),
}

/// One call site to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub caller_file_path: String,
    pub caller_line: u32,
    pub caller_column: u32,
    pub callee_name: String,
    pub caller_symbol_key: String,
}

/// A resolved definition location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDefinition {
    pub target_file_path: String,
    pub target_line: u32,
    pub target_name: String,
}

/// The external definition-resolution service.
///
/// Implementations answer batches, returning zero-or-one definition per
/// input in the same order.
pub trait DefinitionResolver {
    fn resolve_batch(
        &self,
        sites: &[CallSite],
    ) -> Result<Vec<Option<ResolvedDefinition>>, ResolveError>;
}

/// Upgrades low-confidence call edges to verified symbol-to-symbol edges.
///
/// A call edge is low-confidence when its target id is not in the
/// snapshot's node set. For each such edge whose caller is a known symbol,
/// the resolver is asked for the callee's definition; on success the edge
/// target is rewritten to the resolved symbol's id. Everything else is
/// left untouched.
pub fn upgrade_call_edges(
    snapshot: &GraphSnapshot,
    resolver: &dyn DefinitionResolver,
) -> GraphSnapshot {
    let known_ids: HashSet<&str> = snapshot.node_ids().collect();

    let mut sites = Vec::new();
    let mut site_edges = Vec::new();
    for (index, edge) in snapshot.edges.iter().enumerate() {
        if edge.kind != canopy_core::EdgeKind::Call || known_ids.contains(edge.target.as_str()) {
            continue;
        }
        let Some(caller) = snapshot.symbols.iter().find(|s| s.id == edge.source) else {
            continue;
        };
        sites.push(CallSite {
            caller_file_path: caller.file_path.clone(),
            caller_line: caller.start_line,
            caller_column: 0,
            callee_name: edge.target.clone(),
            caller_symbol_key: caller.id.clone(),
        });
        site_edges.push(index);
    }

    if sites.is_empty() {
        return snapshot.clone();
    }

    let resolutions = match resolver.resolve_batch(&sites) {
        Ok(resolutions) => resolutions,
        Err(error) => {
            warn!(%error, "definition resolution skipped");
            return snapshot.clone();
        }
    };

    // Index symbols by (file, name, line) for id reconstruction.
    let by_location: HashMap<(&str, &str, u32), &str> = snapshot
        .symbols
        .iter()
        .map(|s| {
            (
                (s.file_path.as_str(), s.name.as_str(), s.start_line),
                s.id.as_str(),
            )
        })
        .collect();

    let mut upgraded = snapshot.clone();
    let mut resolved = 0usize;
    for (slot, resolution) in site_edges.iter().zip(resolutions) {
        let Some(def) = resolution else {
            continue;
        };
        let key = (
            def.target_file_path.as_str(),
            def.target_name.as_str(),
            def.target_line,
        );
        let target_id = by_location
            .get(&key)
            .map(|id| id.to_string())
            .unwrap_or_else(|| {
                symbol_id(&def.target_file_path, &def.target_name, def.target_line)
            });
        if let Some(edge) = upgraded.edges.get_mut(*slot) {
            edge.target = target_id;
            resolved += 1;
        }
    }

    info!(resolved, total = sites.len(), "definition resolution");
    upgraded
}
