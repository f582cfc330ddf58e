//! Syntax tree vocabulary consumed by the core
//!
//! Adapters lower their parser's concrete tree into [`SyntaxNode`]s. The core
//! only distinguishes the roles it needs (scope boundaries, declarators,
//! identifiers, member accesses); everything else is an opaque container.

use crate::declaration::DeclarationKind;
use crate::span::Span;

/// Role of an identifier occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentRole {
    /// Binding position, only meaningful inside a `VariableDeclarator`
    Declaration,
    /// Read (or read-like) position
    Reference,
}

/// Receiver of a member access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// The implicit instance context (`this`)
    ImplicitInstance,
    /// Any other object expression; carried as the node's children
    Other,
}

/// Direction of a member access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    /// Compound assignment (`this.n += 1`): a read followed by a write
    ReadWrite,
}

/// Node kinds, grouped by traversal role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    // structural
    Program,
    FunctionBoundary { name: Option<String> },
    BlockBoundary,
    ClassBoundary { name: Option<String> },

    // declaration-introducing
    VariableDeclarator { kind: DeclarationKind },

    // reference-producing
    Identifier { name: String, role: IdentRole },
    MemberAccess { receiver: Receiver, property: String, access: Access },

    /// Anything the core does not model; recursed into as a plain container
    Other(String),
}

impl NodeKind {
    /// Short label used in logs and malformed-tree messages
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Program => "program",
            NodeKind::FunctionBoundary { .. } => "function",
            NodeKind::BlockBoundary => "block",
            NodeKind::ClassBoundary { .. } => "class",
            NodeKind::VariableDeclarator { .. } => "declarator",
            NodeKind::Identifier { .. } => "identifier",
            NodeKind::MemberAccess { .. } => "member-access",
            NodeKind::Other(kind) => kind,
        }
    }

    /// Whether the node opens a scope of its own when visited
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            NodeKind::Program
                | NodeKind::FunctionBoundary { .. }
                | NodeKind::BlockBoundary
                | NodeKind::ClassBoundary { .. }
        )
    }
}

/// A typed syntax node with its span and children in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self { kind, span, children }
    }

    /// Leaf node with no children
    pub fn leaf(kind: NodeKind, span: Span) -> Self {
        Self::new(kind, span, Vec::new())
    }

    pub fn program(span: Span, children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::Program, span, children)
    }

    pub fn function(name: Option<&str>, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self::new(
            NodeKind::FunctionBoundary { name: name.map(str::to_string) },
            span,
            children,
        )
    }

    pub fn block(span: Span, children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::BlockBoundary, span, children)
    }

    pub fn class(name: Option<&str>, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self::new(
            NodeKind::ClassBoundary { name: name.map(str::to_string) },
            span,
            children,
        )
    }

    pub fn declarator(kind: DeclarationKind, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::VariableDeclarator { kind }, span, children)
    }

    pub fn binding(name: &str, span: Span) -> Self {
        Self::leaf(
            NodeKind::Identifier { name: name.to_string(), role: IdentRole::Declaration },
            span,
        )
    }

    pub fn reference(name: &str, span: Span) -> Self {
        Self::leaf(
            NodeKind::Identifier { name: name.to_string(), role: IdentRole::Reference },
            span,
        )
    }

    pub fn member(receiver: Receiver, property: &str, access: Access, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self::new(
            NodeKind::MemberAccess { receiver, property: property.to_string(), access },
            span,
            children,
        )
    }

    pub fn other(kind: &str, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::Other(kind.to_string()), span, children)
    }

    /// Number of nodes in this subtree, including the node itself
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(SyntaxNode::size).sum::<usize>()
    }
}
