//! # Lineage - scope resolution and def-use lineage
//!
//! Builds a lexical scope tree for a parsed program, records every declaration
//! and identifier use, and resolves each use to the declaration it binds to.
//!
//! Lineage provides:
//! - A language-neutral syntax vocabulary (boundaries, declarators, identifiers)
//! - A scope tree with hoisting, shadowing and a temporal dead zone
//! - Lexical and implicit-instance (`this.x`) resolution paths
//! - An immutable lineage graph with def-use queries
//! - Tree-sitter based lowering for JavaScript

pub mod span;
pub mod syntax;
pub mod declaration;
pub mod scope;
pub mod edge;
pub mod diagnostics;
pub mod graph;
pub mod adapter;
pub mod tracker;
pub mod report;
pub mod ui;
pub mod output;
pub mod config;
pub mod ignore;

// Re-exports for convenient access
pub use span::Span;
pub use syntax::{Access, IdentRole, NodeKind, Receiver, SyntaxNode};
pub use declaration::{Declaration, DeclarationId, DeclarationKind, Reference, ReferenceId, ReferenceTarget};
pub use scope::{ScopeId, ScopeKind, ScopeTree};
pub use edge::{LineageEdge, ResolutionPath};
pub use diagnostics::{Diagnostic, Severity};
pub use graph::{GraphStats, LineageGraph};
pub use tracker::LineageTracker;

/// Result type alias for lineage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for lineage operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed syntax tree at {span}: {message}")]
    MalformedTree { span: Span, message: String },

    #[error("Inconsistent lineage graph: {0}")]
    InconsistentGraph(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value: {0}")]
    InvalidKind(String),
}
