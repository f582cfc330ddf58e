//! Declarations and references - the two ends of every lineage edge
//!
//! Binding-introducing occurrences map to one of five declaration kinds:
//! - `BlockScoped`: `let`, `const`, `class`
//! - `FunctionScoped`: `var`
//! - `FunctionHoisted`: function declarations, imports
//! - `ClassMember`: methods, fields, instance write-sites
//! - `Parameter`: formal parameters

use crate::scope::ScopeId;
use crate::span::Span;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Declaration kinds, each with its own registration and visibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationKind {
    /// Registered in the innermost block; invisible before its declarator ends
    BlockScoped,
    /// Registered in the nearest function (or global) scope
    FunctionScoped,
    /// Registered in the nearest function (or global) scope, visible everywhere in it
    FunctionHoisted,
    /// Registered in the class body; only reachable through the instance receiver
    ClassMember,
    /// Registered in the owning function scope
    Parameter,
}

impl DeclarationKind {
    /// Get the string representation of the declaration kind
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::BlockScoped => "block-scoped",
            DeclarationKind::FunctionScoped => "function-scoped",
            DeclarationKind::FunctionHoisted => "function-hoisted",
            DeclarationKind::ClassMember => "class-member",
            DeclarationKind::Parameter => "parameter",
        }
    }

    /// Get all declaration kinds
    pub fn all() -> &'static [DeclarationKind] {
        &[
            DeclarationKind::BlockScoped,
            DeclarationKind::FunctionScoped,
            DeclarationKind::FunctionHoisted,
            DeclarationKind::ClassMember,
            DeclarationKind::Parameter,
        ]
    }

    /// Whether this kind hoists to the nearest function or global scope
    pub fn hoists_to_function(&self) -> bool {
        matches!(
            self,
            DeclarationKind::FunctionScoped
                | DeclarationKind::FunctionHoisted
                | DeclarationKind::Parameter
        )
    }

    /// Whether two declarations of the same name in one scope merge into a
    /// single record instead of being reported as a duplicate
    pub fn merges_with(&self, other: DeclarationKind) -> bool {
        self.hoists_to_function() && other.hoists_to_function()
    }
}

impl FromStr for DeclarationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "block-scoped" | "block" | "let" | "const" | "class" => Ok(DeclarationKind::BlockScoped),
            "function-scoped" | "var" => Ok(DeclarationKind::FunctionScoped),
            "function-hoisted" | "hoisted" | "function" | "import" => {
                Ok(DeclarationKind::FunctionHoisted)
            }
            "class-member" | "member" | "field" | "method" => Ok(DeclarationKind::ClassMember),
            "parameter" | "param" => Ok(DeclarationKind::Parameter),
            _ => Err(Error::InvalidKind(format!("Unknown declaration kind: {}", s))),
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index of a declaration in the analysis arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclarationId(pub u32);

impl DeclarationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a reference in the analysis arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceId(pub u32);

impl ReferenceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One binding introduced by source code.
///
/// Function-level declarations that repeat a name in the same scope are merged:
/// the first declarator provides `span`, later ones land in `redeclarations`.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    pub id: DeclarationId,
    pub name: String,
    pub kind: DeclarationKind,
    /// Span of the first introducing identifier
    pub span: Span,
    /// Spans of merged redeclarations (and member write-sites), in source order
    pub redeclarations: Vec<Span>,
    /// Scope that owns the binding
    pub scope: ScopeId,
    /// Byte offset from which block-scoped bindings become visible
    pub visible_from: usize,
}

impl Declaration {
    /// All introducing spans, first declarator first
    pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
        std::iter::once(self.span).chain(self.redeclarations.iter().copied())
    }

    /// Whether a reference starting at `offset` in the same function may see
    /// this binding. Only block-scoped bindings have a temporal dead zone.
    pub fn is_visible_at(&self, offset: usize) -> bool {
        match self.kind {
            DeclarationKind::BlockScoped => offset >= self.visible_from,
            _ => true,
        }
    }
}

/// Which lookup path a reference takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "path")]
pub enum ReferenceTarget {
    /// Bare identifier, resolved through the lexical scope chain
    Lexical,
    /// Access through the implicit instance receiver (`this.name`)
    Member {
        /// Innermost enclosing class body, if the access sits inside a class
        class_scope: Option<ScopeId>,
    },
}

/// One identifier-use occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    pub id: ReferenceId,
    pub name: String,
    pub span: Span,
    /// Innermost scope containing the use
    pub scope: ScopeId,
    pub target: ReferenceTarget,
}

impl Reference {
    pub fn is_member(&self) -> bool {
        matches!(self.target, ReferenceTarget::Member { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(kind: DeclarationKind, visible_from: usize) -> Declaration {
        Declaration {
            id: DeclarationId(0),
            name: "x".to_string(),
            kind,
            span: Span::new(10, 11, 1, 11),
            redeclarations: Vec::new(),
            scope: ScopeId::root(),
            visible_from,
        }
    }

    #[test]
    fn test_declaration_kind_roundtrip() {
        for kind in DeclarationKind::all() {
            let parsed: DeclarationKind = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_declaration_kind_aliases() {
        assert_eq!(DeclarationKind::from_str("const").unwrap(), DeclarationKind::BlockScoped);
        assert_eq!(DeclarationKind::from_str("var").unwrap(), DeclarationKind::FunctionScoped);
        assert_eq!(DeclarationKind::from_str("function").unwrap(), DeclarationKind::FunctionHoisted);
        assert_eq!(DeclarationKind::from_str("field").unwrap(), DeclarationKind::ClassMember);
        assert!(DeclarationKind::from_str("global").is_err());
    }

    #[test]
    fn test_merge_rules() {
        assert!(DeclarationKind::FunctionScoped.merges_with(DeclarationKind::FunctionHoisted));
        assert!(DeclarationKind::Parameter.merges_with(DeclarationKind::FunctionScoped));
        assert!(!DeclarationKind::BlockScoped.merges_with(DeclarationKind::BlockScoped));
        assert!(!DeclarationKind::FunctionScoped.merges_with(DeclarationKind::BlockScoped));
        assert!(!DeclarationKind::ClassMember.merges_with(DeclarationKind::ClassMember));
    }

    #[test]
    fn test_temporal_visibility() {
        let block = declaration(DeclarationKind::BlockScoped, 20);
        assert!(!block.is_visible_at(5));
        assert!(block.is_visible_at(20));

        let hoisted = declaration(DeclarationKind::FunctionHoisted, 20);
        assert!(hoisted.is_visible_at(0));
    }

    #[test]
    fn test_spans_in_order() {
        let mut decl = declaration(DeclarationKind::FunctionScoped, 0);
        decl.redeclarations.push(Span::new(30, 31, 2, 5));
        let spans: Vec<Span> = decl.spans().collect();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start, 10);
        assert_eq!(spans[1].start, 30);
    }
}
