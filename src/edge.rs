//! Lineage edges - resolved reference → declaration pairs
//!
//! Every edge records the scopes its binding travels through:
//! - `Lexical`: bare identifier found through the scope chain
//! - `Member`: instance access found in the enclosing class body

use crate::declaration::{DeclarationId, ReferenceId};
use crate::scope::ScopeId;
use serde::Serialize;
use std::str::FromStr;

/// Lookup path that produced an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPath {
    /// Innermost-to-outermost walk of the lexical scope chain
    Lexical,
    /// Direct lookup in the innermost enclosing class body
    Member,
}

impl ResolutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPath::Lexical => "lexical",
            ResolutionPath::Member => "member",
        }
    }

    pub fn all() -> &'static [ResolutionPath] {
        &[ResolutionPath::Lexical, ResolutionPath::Member]
    }
}

impl FromStr for ResolutionPath {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" | "scope" => Ok(ResolutionPath::Lexical),
            "member" | "this" | "instance" => Ok(ResolutionPath::Member),
            _ => Err(crate::Error::InvalidKind(format!("Unknown resolution path: {}", s))),
        }
    }
}

impl std::fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved (reference, declaration) pairing.
///
/// `chain` runs from the reference's enclosing scope to the scope owning the
/// declaration, both ends included, so the declaring scope is always an
/// ancestor-or-self of the reference's scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LineageEdge {
    pub reference: ReferenceId,
    pub declaration: DeclarationId,
    pub chain: Vec<ScopeId>,
    pub path: ResolutionPath,
}

impl LineageEdge {
    pub fn new(reference: ReferenceId, declaration: DeclarationId, chain: Vec<ScopeId>, path: ResolutionPath) -> Self {
        Self {
            reference,
            declaration,
            chain,
            path,
        }
    }

    /// Number of scope boundaries crossed between use and declaration
    pub fn hops(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// Scope the reference occurs in
    pub fn reference_scope(&self) -> Option<ScopeId> {
        self.chain.first().copied()
    }

    /// Scope owning the declaration
    pub fn declaration_scope(&self) -> Option<ScopeId> {
        self.chain.last().copied()
    }

    /// Whether the use and the declaration share a scope
    pub fn is_local(&self) -> bool {
        self.hops() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_path_roundtrip() {
        for path in ResolutionPath::all() {
            let parsed: ResolutionPath = path.as_str().parse().unwrap();
            assert_eq!(*path, parsed);
        }
        assert_eq!("this".parse::<ResolutionPath>().unwrap(), ResolutionPath::Member);
        assert!("dynamic".parse::<ResolutionPath>().is_err());
    }

    #[test]
    fn test_edge_hops() {
        let edge = LineageEdge::new(
            ReferenceId(0),
            DeclarationId(1),
            vec![ScopeId(3), ScopeId(1), ScopeId(0)],
            ResolutionPath::Lexical,
        );
        assert_eq!(edge.hops(), 2);
        assert_eq!(edge.reference_scope(), Some(ScopeId(3)));
        assert_eq!(edge.declaration_scope(), Some(ScopeId(0)));
        assert!(!edge.is_local());
    }

    #[test]
    fn test_local_edge() {
        let edge = LineageEdge::new(ReferenceId(0), DeclarationId(0), vec![ScopeId(2)], ResolutionPath::Member);
        assert!(edge.is_local());
        assert_eq!(edge.hops(), 0);
    }
}
