//! Lineage Graph - the assembled, immutable analysis result
//!
//! Merges the scope tree, declarations, references and resolved edges into a
//! single structure with derived indices. All queries are reads.

use crate::declaration::{Declaration, DeclarationId, Reference, ReferenceId};
use crate::diagnostics::Diagnostic;
use crate::edge::{LineageEdge, ResolutionPath};
use crate::scope::{Scope, ScopeAnalysis, ScopeId, ScopeTree};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Def-use graph for one analyzed input.
#[derive(Debug, Clone, Serialize)]
pub struct LineageGraph {
    scopes: ScopeTree,
    declarations: Vec<Declaration>,
    references: Vec<Reference>,
    edges: Vec<LineageEdge>,
    diagnostics: Vec<Diagnostic>,
    /// reference → index into `edges`
    #[serde(skip)]
    edge_by_reference: HashMap<ReferenceId, usize>,
    /// declaration → indices into `edges`, in reference order
    #[serde(skip)]
    edges_by_declaration: HashMap<DeclarationId, Vec<usize>>,
}

impl LineageGraph {
    /// Assemble the graph, checking that every edge names known ids and that
    /// its scope chain is a parent walk from the reference to the declaration
    pub fn assemble(analysis: ScopeAnalysis, edges: Vec<LineageEdge>, diagnostics: Vec<Diagnostic>) -> Result<Self> {
        let ScopeAnalysis {
            tree,
            declarations,
            references,
            diagnostics: mut all_diagnostics,
        } = analysis;
        all_diagnostics.extend(diagnostics);

        for (index, declaration) in declarations.iter().enumerate() {
            if declaration.id.index() != index || !tree.contains(declaration.scope) {
                return Err(inconsistent(format!(
                    "declaration `{}` has id {:?} at position {} in scope {}",
                    declaration.name, declaration.id, index, declaration.scope
                )));
            }
        }
        for (index, reference) in references.iter().enumerate() {
            if reference.id.index() != index || !tree.contains(reference.scope) {
                return Err(inconsistent(format!(
                    "reference `{}` has id {:?} at position {} in scope {}",
                    reference.name, reference.id, index, reference.scope
                )));
            }
        }

        let mut edge_by_reference = HashMap::new();
        let mut edges_by_declaration: HashMap<DeclarationId, Vec<usize>> = HashMap::new();

        for (index, edge) in edges.iter().enumerate() {
            let reference = references
                .get(edge.reference.index())
                .ok_or_else(|| inconsistent(format!("edge names unknown reference {:?}", edge.reference)))?;
            let declaration = declarations
                .get(edge.declaration.index())
                .ok_or_else(|| inconsistent(format!("edge names unknown declaration {:?}", edge.declaration)))?;

            let expected = tree.path_between(reference.scope, declaration.scope).ok_or_else(|| {
                inconsistent(format!(
                    "declaration scope {} of `{}` is not an ancestor of reference scope {}",
                    declaration.scope, declaration.name, reference.scope
                ))
            })?;
            if expected != edge.chain {
                return Err(inconsistent(format!(
                    "scope chain {:?} for `{}` does not match the scope tree",
                    edge.chain, reference.name
                )));
            }

            if edge_by_reference.insert(edge.reference, index).is_some() {
                return Err(inconsistent(format!("reference {:?} resolved twice", edge.reference)));
            }
            edges_by_declaration.entry(edge.declaration).or_default().push(index);
        }

        Ok(Self {
            scopes: tree,
            declarations,
            references,
            edges,
            diagnostics: all_diagnostics,
            edge_by_reference,
            edges_by_declaration,
        })
    }

    /// Declarations owned by a scope, in source order
    pub fn declarations_of(&self, scope: ScopeId) -> Vec<&Declaration> {
        let mut declarations: Vec<&Declaration> = self
            .scopes
            .get(scope)
            .map(|s| s.declarations.values().filter_map(|id| self.declaration(*id)).collect())
            .unwrap_or_default();
        declarations.sort_by_key(|d| d.id);
        declarations
    }

    /// References resolving to a declaration, in source order
    pub fn references_of(&self, declaration: DeclarationId) -> Vec<&Reference> {
        self.edges_by_declaration
            .get(&declaration)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|i| self.reference(self.edges[*i].reference))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Scope ids from a reference's scope to its declaration's scope
    pub fn chain_of(&self, reference: ReferenceId) -> Option<&[ScopeId]> {
        self.edge_for(reference).map(|edge| edge.chain.as_slice())
    }

    /// References that resolved to no declaration
    pub fn unresolved(&self) -> Vec<&Reference> {
        self.references
            .iter()
            .filter(|r| !self.edge_by_reference.contains_key(&r.id))
            .collect()
    }

    /// Duplicate-declaration diagnostics
    pub fn duplicates(&self) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_duplicate()).collect()
    }

    pub fn edge_for(&self, reference: ReferenceId) -> Option<&LineageEdge> {
        self.edge_by_reference.get(&reference).map(|i| &self.edges[*i])
    }

    /// Declaration a reference resolved to
    pub fn declaration_of(&self, reference: ReferenceId) -> Option<&Declaration> {
        self.edge_for(reference).and_then(|edge| self.declaration(edge.declaration))
    }

    /// All declarations with a given name, in source order
    pub fn find_declarations(&self, name: &str) -> Vec<&Declaration> {
        self.declarations.iter().filter(|d| d.name == name).collect()
    }

    pub fn scope(&self, scope: ScopeId) -> Option<&Scope> {
        self.scopes.get(scope)
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn declaration(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.get(id.index())
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn reference(&self, id: ReferenceId) -> Option<&Reference> {
        self.references.get(id.index())
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn edges(&self) -> &[LineageEdge] {
        &self.edges
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `global` or `outer::inner` for a scope
    pub fn scope_path(&self, scope: ScopeId) -> String {
        self.scopes.scope_path(scope)
    }

    /// Nesting depth of a scope below the global scope
    pub fn scope_depth(&self, scope: ScopeId) -> usize {
        self.scopes.depth(scope)
    }

    /// Declaration and reference sites for every declaration named `name`
    pub fn lineage_of(&self, name: &str) -> Vec<String> {
        let mut lineage = Vec::new();
        for declaration in self.find_declarations(name) {
            lineage.push(format!("Declared in scope: {}", self.scope_path(declaration.scope)));
            for reference in self.references_of(declaration.id) {
                lineage.push(format!("Referenced in scope: {}", self.scope_path(reference.scope)));
            }
        }
        lineage
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let member_edges = self
            .edges
            .iter()
            .filter(|e| e.path == ResolutionPath::Member)
            .count();

        GraphStats {
            scopes: self.scopes.len(),
            declarations: self.declarations.len(),
            references: self.references.len(),
            resolved: self.edges.len(),
            member_edges,
            unresolved: self.references.len() - self.edges.len(),
            duplicates: self.duplicates().len(),
            max_hops: self.edges.iter().map(LineageEdge::hops).max().unwrap_or(0),
        }
    }
}

fn inconsistent(message: String) -> Error {
    Error::InconsistentGraph(message)
}

/// Statistics about a lineage graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub scopes: usize,
    pub declarations: usize,
    pub references: usize,
    pub resolved: usize,
    pub member_edges: usize,
    pub unresolved: usize,
    pub duplicates: usize,
    pub max_hops: usize,
}

impl GraphStats {
    /// Combine counts from independently analyzed inputs
    pub fn merge(&mut self, other: &GraphStats) {
        self.scopes += other.scopes;
        self.declarations += other.declarations;
        self.references += other.references;
        self.resolved += other.resolved;
        self.member_edges += other.member_edges;
        self.unresolved += other.unresolved;
        self.duplicates += other.duplicates;
        self.max_hops = self.max_hops.max(other.max_hops);
    }
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Lineage Graph Statistics:")?;
        writeln!(f, "  Scopes: {}", self.scopes)?;
        writeln!(f, "  Declarations: {} (duplicates: {})", self.declarations, self.duplicates)?;
        writeln!(f, "  References: {} (resolved: {}, via members: {}, unresolved: {})",
            self.references, self.resolved, self.member_edges, self.unresolved)?;
        writeln!(f, "  Deepest chain: {} hops", self.max_hops)
    }
}
