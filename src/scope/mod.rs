//! Scope analysis - lexical scope tree, builder and resolver
//!
//! The builder walks a syntax tree once and produces the scope tree plus every
//! declaration and reference; the resolver then pairs references with
//! declarations by walking outward through the tree.

pub mod builder;
pub mod resolver;
pub mod tree;

pub use builder::{ScopeAnalysis, ScopeBuilder};
pub use resolver::{Resolution, ScopeResolver};
pub use tree::{Scope, ScopeId, ScopeKind, ScopeTree};
