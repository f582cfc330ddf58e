//! Lineage Tracker - one-call pipeline
//!
//! source text → adapter lowering → scope builder → resolver → lineage graph

use crate::adapter::{default_registry, AdapterRegistry, JavaScriptAdapter};
use crate::graph::LineageGraph;
use crate::scope::{ScopeBuilder, ScopeResolver};
use crate::syntax::SyntaxNode;
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Runs the full analysis for syntax trees, source text or files
pub struct LineageTracker {
    registry: AdapterRegistry,
}

impl LineageTracker {
    /// Tracker with every built-in adapter
    pub fn new() -> Self {
        Self {
            registry: default_registry(),
        }
    }

    /// Tracker with a caller-supplied adapter registry
    pub fn with_registry(registry: AdapterRegistry) -> Self {
        Self { registry }
    }

    /// Tracker whose JavaScript adapter claims `extensions`
    pub fn with_extensions(extensions: &[String]) -> Self {
        let mut registry = AdapterRegistry::new();
        registry.register(JavaScriptAdapter::new().with_extensions(extensions));
        Self { registry }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Whether some adapter handles `path`
    pub fn can_analyze(&self, path: &Path) -> bool {
        self.registry.find_adapter(path).is_some()
    }

    /// Build, resolve and assemble the graph for an already-lowered tree
    pub fn analyze_tree(&self, root: &SyntaxNode) -> Result<LineageGraph> {
        let analysis = ScopeBuilder::build(root)?;
        let (edges, diagnostics) = ScopeResolver::resolve_all(&analysis);
        let graph = LineageGraph::assemble(analysis, edges, diagnostics)?;

        let stats = graph.stats();
        debug!(
            scopes = stats.scopes,
            resolved = stats.resolved,
            unresolved = stats.unresolved,
            "lineage graph assembled"
        );
        Ok(graph)
    }

    /// Lower `source` with the adapter chosen by `path_hint` and analyze it
    pub fn analyze_source(&self, path_hint: &Path, source: &str) -> Result<LineageGraph> {
        let root = self
            .registry
            .lower_file(path_hint, source)?
            .ok_or_else(|| Error::Adapter(format!("no adapter for {}", path_hint.display())))?;

        let graph = self.analyze_tree(&root)?;
        let stats = graph.stats();
        info!(
            path = %path_hint.display(),
            declarations = stats.declarations,
            references = stats.references,
            unresolved = stats.unresolved,
            "analyzed"
        );
        Ok(graph)
    }

    /// Read and analyze a file
    pub fn analyze_file(&self, path: &Path) -> Result<LineageGraph> {
        let source = std::fs::read_to_string(path)?;
        self.analyze_source(path, &source)
    }
}

impl Default for LineageTracker {
    fn default() -> Self {
        Self::new()
    }
}
