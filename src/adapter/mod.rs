//! Language Adapter Framework
//!
//! Each language provides a Tree-sitter grammar and a lowering from its
//! concrete tree to the core syntax vocabulary. The scope engine never sees
//! language-specific node kinds.

pub mod framework;
pub mod javascript;

pub use framework::{AdapterRegistry, LanguageAdapter, default_registry};
pub use javascript::JavaScriptAdapter;
