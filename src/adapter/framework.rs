//! Core adapter framework
//!
//! Defines the trait every language adapter implements: turn source text into
//! the core's [`SyntaxNode`] vocabulary.

use crate::Result;
use crate::syntax::SyntaxNode;
use std::path::Path;

/// Trait for language adapters
///
/// Each language adapter is responsible for:
/// 1. Identifying files it can parse
/// 2. Parsing them (tree-sitter)
/// 3. Lowering the concrete tree into scope boundaries, declarators,
///    identifiers and member accesses
pub trait LanguageAdapter: Send + Sync {
    /// Get the language name (for display)
    fn language_name(&self) -> &str;

    /// Get file extensions this adapter handles
    fn file_extensions(&self) -> &[String];

    /// Check if this adapter can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.file_extensions().iter().any(|e| e == ext)
        } else {
            false
        }
    }

    /// Parse source text and lower it to a syntax tree
    fn lower(&self, source: &str) -> Result<SyntaxNode>;
}

/// Registry of language adapters
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter
    pub fn register(&mut self, adapter: impl LanguageAdapter + 'static) {
        self.adapters.push(Box::new(adapter));
    }

    /// Find an adapter for a file
    pub fn find_adapter(&self, path: &Path) -> Option<&dyn LanguageAdapter> {
        self.adapters
            .iter()
            .find(|a| a.can_handle(path))
            .map(|a| a.as_ref())
    }

    /// Get all registered adapters
    pub fn adapters(&self) -> &[Box<dyn LanguageAdapter>] {
        &self.adapters
    }

    /// Lower a file using the appropriate adapter
    pub fn lower_file(&self, path: &Path, content: &str) -> Result<Option<SyntaxNode>> {
        match self.find_adapter(path) {
            Some(adapter) => adapter.lower(content).map(Some),
            None => Ok(None),
        }
    }
}

/// Create a default registry with all built-in adapters
pub fn default_registry() -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    registry.register(super::javascript::JavaScriptAdapter::new());
    registry
}
