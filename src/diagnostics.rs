//! Non-fatal analysis findings
//!
//! Fatal conditions surface as [`crate::Error`]; everything here accumulates
//! on the lineage graph and never stops traversal.

use crate::declaration::{DeclarationId, ReferenceId};
use crate::scope::ScopeId;
use crate::span::Span;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// A block or class scope declares the same name twice; the first wins
    DuplicateDeclaration {
        name: String,
        scope: ScopeId,
        first: DeclarationId,
        span: Span,
    },
    /// No enclosing scope declares the name; treated as an external binding
    UnresolvedReference {
        name: String,
        reference: ReferenceId,
        span: Span,
    },
    /// A block-scoped candidate existed but was not yet visible, so the
    /// search continued outward
    TemporalDeadZone {
        name: String,
        reference: ReferenceId,
        skipped: DeclarationId,
        span: Span,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::DuplicateDeclaration { .. } => Severity::Warning,
            Diagnostic::UnresolvedReference { .. } => Severity::Hint,
            Diagnostic::TemporalDeadZone { .. } => Severity::Hint,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Diagnostic::DuplicateDeclaration { name, .. }
            | Diagnostic::UnresolvedReference { name, .. }
            | Diagnostic::TemporalDeadZone { name, .. } => name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Diagnostic::DuplicateDeclaration { span, .. }
            | Diagnostic::UnresolvedReference { span, .. }
            | Diagnostic::TemporalDeadZone { span, .. } => *span,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Diagnostic::DuplicateDeclaration { .. })
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Diagnostic::UnresolvedReference { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateDeclaration { name, scope, span, .. } => {
                write!(f, "{}: duplicate declaration of `{}` in scope {}", span, name, scope)
            }
            Diagnostic::UnresolvedReference { name, span, .. } => {
                write!(f, "{}: unresolved reference to `{}` (assumed external)", span, name)
            }
            Diagnostic::TemporalDeadZone { name, span, .. } => {
                write!(f, "{}: `{}` read before its block-scoped declaration", span, name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::UnresolvedReference {
            name: "console".to_string(),
            reference: ReferenceId(3),
            span: Span::new(0, 7, 2, 1),
        };
        assert_eq!(diagnostic.to_string(), "2:1: unresolved reference to `console` (assumed external)");
        assert_eq!(diagnostic.severity(), Severity::Hint);
        assert!(diagnostic.is_unresolved());
        assert!(!diagnostic.is_duplicate());
    }

    #[test]
    fn test_duplicate_is_warning() {
        let diagnostic = Diagnostic::DuplicateDeclaration {
            name: "x".to_string(),
            scope: ScopeId(2),
            first: DeclarationId(0),
            span: Span::new(20, 21, 3, 5),
        };
        assert_eq!(diagnostic.severity(), Severity::Warning);
        assert_eq!(diagnostic.name(), "x");
        assert_eq!(diagnostic.to_string(), "3:5: duplicate declaration of `x` in scope #2");
    }
}
