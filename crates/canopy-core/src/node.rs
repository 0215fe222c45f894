//! Node types for the code graph.
//!
//! Three disjoint node kinds share one identifier namespace: domain nodes
//! (`domain:<name>`), file nodes (path-derived ids) and symbol nodes
//! (`<filePath>:<name>:<startLine>`). The `GraphNode` sum type keeps kind
//! dispatch exhaustive instead of stringly-typed.

use serde::{Deserialize, Serialize};

/// Prefix marking domain-level node identifiers.
pub const DOMAIN_PREFIX: &str = "domain:";

/// Bucket name for nodes with no resolvable domain.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// The kind of a code symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Enum,
    Variable,
    Type,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Variable => "variable",
            Self::Type => "type",
        };
        write!(f, "{}", s)
    }
}

/// Builds a symbol node id from its defining location.
pub fn symbol_id(file_path: &str, name: &str, start_line: u32) -> String {
    format!("{}:{}:{}", file_path, name, start_line)
}

/// Builds a domain node id from the domain name.
pub fn domain_id(name: &str) -> String {
    format!("{}{}", DOMAIN_PREFIX, name)
}

/// A code symbol (function, class, ...) extracted by the indexer.
///
/// Immutable for the lifetime of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolNode {
    /// Stable identifier within the snapshot.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Path of the defining file.
    pub file_path: String,
    /// First line of the definition.
    pub start_line: u32,
    /// Last line of the definition.
    pub end_line: u32,
    /// Cyclomatic-style complexity score.
    #[serde(default)]
    pub complexity: f64,
    /// Externally supplied risk hint, 1-10.
    #[serde(default)]
    pub impact_depth: Option<u8>,
    /// What kind of symbol this is.
    pub kind: SymbolKind,
    /// Structural parent node id (containing class, file, ...).
    #[serde(default)]
    pub parent: Option<String>,
    /// Explicitly attached domain name.
    #[serde(default)]
    pub domain: Option<String>,
    /// Free-form search tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SymbolNode {
    /// Creates a symbol node with a location-derived id.
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        file_path: impl Into<String>,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        let name = name.into();
        let file_path = file_path.into();
        Self {
            id: symbol_id(&file_path, &name, start_line),
            name,
            file_path,
            start_line,
            end_line,
            complexity: 0.0,
            impact_depth: None,
            kind,
            parent: None,
            domain: None,
            tags: Vec::new(),
        }
    }

    /// Sets the structural parent id.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the attached domain name.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the external risk hint.
    pub fn with_impact_depth(mut self, depth: u8) -> Self {
        self.impact_depth = Some(depth);
        self
    }
}

/// A file-level node grouping the symbols it defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Path-derived identifier.
    pub id: String,
    /// File path.
    pub path: String,
    /// Structural parent node id, usually a `domain:` node.
    #[serde(default)]
    pub parent: Option<String>,
    /// Explicitly attached domain name.
    #[serde(default)]
    pub domain: Option<String>,
    /// Free-form search tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FileNode {
    /// Creates a file node whose id is its path.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            path,
            parent: None,
            domain: None,
            tags: Vec::new(),
        }
    }

    /// Sets the structural parent id.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// A coarse functional grouping (auth, payment, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainNode {
    /// `domain:<name>` identifier.
    pub id: String,
    /// Domain name.
    pub name: String,
    /// Renderer color hint.
    #[serde(default)]
    pub color: Option<String>,
    /// Free-form search tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DomainNode {
    /// Creates a domain node with a `domain:`-prefixed id.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: domain_id(&name),
            name,
            color: None,
            tags: Vec::new(),
        }
    }

    /// Sets the renderer color hint.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Any node in the graph.
///
/// Closed set: the view filter matches on this exhaustively, so adding a
/// kind is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_kind", rename_all = "snake_case")]
pub enum GraphNode {
    Domain(DomainNode),
    File(FileNode),
    Symbol(SymbolNode),
}

impl GraphNode {
    /// Stable node identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Domain(d) => &d.id,
            Self::File(f) => &f.id,
            Self::Symbol(s) => &s.id,
        }
    }

    /// Name shown in the UI and matched by search.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Domain(d) => &d.name,
            Self::File(f) => &f.path,
            Self::Symbol(s) => &s.name,
        }
    }

    /// File path, if this node is file-anchored.
    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::Domain(_) => None,
            Self::File(f) => Some(&f.path),
            Self::Symbol(s) => Some(&s.file_path),
        }
    }

    /// Declared structural parent id, if any.
    pub fn parent(&self) -> Option<&str> {
        match self {
            Self::Domain(_) => None,
            Self::File(f) => f.parent.as_deref(),
            Self::Symbol(s) => s.parent.as_deref(),
        }
    }

    /// Search tags attached to the node.
    pub fn tags(&self) -> &[String] {
        match self {
            Self::Domain(d) => &d.tags,
            Self::File(f) => &f.tags,
            Self::Symbol(s) => &s.tags,
        }
    }

    /// Resolves the node's domain name.
    ///
    /// Domain nodes are their own domain. Other nodes resolve via their
    /// explicit `domain` attribute, then via a `domain:`-prefixed parent,
    /// falling back to the `unknown` bucket.
    pub fn domain(&self) -> &str {
        match self {
            Self::Domain(d) => &d.name,
            Self::File(f) => resolve_domain(f.domain.as_deref(), f.parent.as_deref()),
            Self::Symbol(s) => resolve_domain(s.domain.as_deref(), s.parent.as_deref()),
        }
    }

    /// True for domain nodes.
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain(_))
    }

    /// True for file nodes.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// True for symbol nodes.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }
}

fn resolve_domain<'a>(domain: Option<&'a str>, parent: Option<&'a str>) -> &'a str {
    if let Some(d) = domain {
        return d;
    }
    if let Some(p) = parent {
        if let Some(name) = p.strip_prefix(DOMAIN_PREFIX) {
            return name;
        }
    }
    UNKNOWN_DOMAIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_id_format() {
        assert_eq!(symbol_id("src/auth.ts", "login", 42), "src/auth.ts:login:42");
    }

    #[test]
    fn test_domain_id_format() {
        assert_eq!(domain_id("auth"), "domain:auth");
    }

    #[test]
    fn test_symbol_node_derives_id() {
        let sym = SymbolNode::new("login", SymbolKind::Function, "src/auth.ts", 42, 60);
        assert_eq!(sym.id, "src/auth.ts:login:42");
    }

    #[test]
    fn test_domain_resolution_order() {
        // Explicit attribute wins over the parent link.
        let sym = SymbolNode::new("f", SymbolKind::Function, "a.ts", 1, 2)
            .with_parent(domain_id("payments"))
            .with_domain("auth");
        assert_eq!(GraphNode::Symbol(sym).domain(), "auth");

        // Parent link is used when no attribute is present.
        let file = FileNode::new("a.ts").with_parent(domain_id("payments"));
        assert_eq!(GraphNode::File(file).domain(), "payments");

        // Neither: unknown bucket.
        let bare = FileNode::new("b.ts");
        assert_eq!(GraphNode::File(bare).domain(), UNKNOWN_DOMAIN);
    }

    #[test]
    fn test_non_domain_parent_does_not_leak_into_domain() {
        let sym = SymbolNode::new("f", SymbolKind::Method, "a.ts", 1, 2).with_parent("a.ts");
        assert_eq!(GraphNode::Symbol(sym).domain(), UNKNOWN_DOMAIN);
    }

    #[test]
    fn test_domain_node_is_its_own_domain() {
        let node = GraphNode::Domain(DomainNode::new("auth"));
        assert_eq!(node.domain(), "auth");
        assert_eq!(node.id(), "domain:auth");
        assert!(node.is_domain());
    }
}
