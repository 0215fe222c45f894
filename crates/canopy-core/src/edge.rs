//! Edge types for the code graph.
//!
//! Edges are directed and may be cyclic (mutual recursion, circular
//! imports). Producers are allowed to emit duplicates of the same
//! (source, target, kind) triple; degree-sensitive consumers deduplicate.

use serde::{Deserialize, Serialize};

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Function A calls function B.
    Call,

    /// Module A imports from module B.
    Import,

    /// Class A extends class B.
    Inheritance,

    /// Container relationship (file contains symbol, class contains method).
    Contains,

    /// General reference to a symbol.
    Reference,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Call => "call",
            Self::Import => "import",
            Self::Inheritance => "inheritance",
            Self::Contains => "contains",
            Self::Reference => "reference",
        };
        write!(f, "{}", s)
    }
}

/// An edge as produced by the indexer.
///
/// `source` and `target` are node identifiers that may reference file- or
/// domain-level synthetic nodes, or nodes absent from the snapshot
/// entirely; traversals ignore dangling endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl RawEdge {
    /// Creates a new edge.
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }
}
