//! Scope Builder - single depth-first pass over a syntax tree
//!
//! Produces the scope tree, every declaration (registered according to its
//! kind's hoisting rule) and every reference occurrence. Resolution happens
//! afterwards, against the completed tree, so hoisted bindings are visible to
//! references that precede them.
//!
//! Registration targets:
//! - block-scoped: innermost block, function or global scope
//! - function-scoped, hoisted, parameter: nearest function or global scope
//! - class member: innermost class body

use super::tree::{ScopeId, ScopeKind, ScopeTree};
use crate::declaration::{Declaration, DeclarationId, DeclarationKind, Reference, ReferenceId, ReferenceTarget};
use crate::diagnostics::Diagnostic;
use crate::span::Span;
use crate::syntax::{Access, IdentRole, NodeKind, Receiver, SyntaxNode};
use crate::{Error, Result};
use tracing::{debug, warn};

/// Output of the builder pass
#[derive(Debug, Clone)]
pub struct ScopeAnalysis {
    pub tree: ScopeTree,
    pub declarations: Vec<Declaration>,
    pub references: Vec<Reference>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Declarator context for binding identifiers met during traversal
#[derive(Debug, Clone, Copy)]
enum Frame {
    Declarator {
        kind: DeclarationKind,
        visible_from: usize,
        bindings: usize,
    },
    /// Scope boundary: binding identifiers below it need their own declarator
    Barrier,
}

pub struct ScopeBuilder {
    tree: ScopeTree,
    current: ScopeId,
    /// Class body scopes enclosing the current position, innermost last
    classes: Vec<ScopeId>,
    frames: Vec<Frame>,
    declarations: Vec<Declaration>,
    references: Vec<Reference>,
    diagnostics: Vec<Diagnostic>,
}

impl ScopeBuilder {
    /// Walk `root` and build the scope analysis
    pub fn build(root: &SyntaxNode) -> Result<ScopeAnalysis> {
        let mut builder = Self {
            tree: ScopeTree::new(root.span),
            current: ScopeId::root(),
            classes: Vec::new(),
            frames: Vec::new(),
            declarations: Vec::new(),
            references: Vec::new(),
            diagnostics: Vec::new(),
        };

        match root.kind {
            NodeKind::Program => builder.visit_children(root)?,
            _ => builder.visit(root)?,
        }
        builder.tree.seal(ScopeId::root());

        debug!(
            scopes = builder.tree.len(),
            declarations = builder.declarations.len(),
            references = builder.references.len(),
            "scope tree built"
        );

        Ok(ScopeAnalysis {
            tree: builder.tree,
            declarations: builder.declarations,
            references: builder.references,
            diagnostics: builder.diagnostics,
        })
    }

    fn visit(&mut self, node: &SyntaxNode) -> Result<()> {
        match &node.kind {
            NodeKind::Program => Err(malformed(node, "program node below the root")),
            NodeKind::FunctionBoundary { name } => {
                self.enter(ScopeKind::Function, name.clone(), node.span);
                self.visit_children(node)?;
                self.exit();
                Ok(())
            }
            NodeKind::ClassBoundary { name } => {
                let scope = self.enter(ScopeKind::ClassBody, name.clone(), node.span);
                self.classes.push(scope);
                self.visit_children(node)?;
                self.classes.pop();
                self.exit();
                Ok(())
            }
            NodeKind::BlockBoundary => {
                if declares_block_scoped(node) {
                    self.enter(ScopeKind::Block, None, node.span);
                    self.visit_children(node)?;
                    self.exit();
                    Ok(())
                } else {
                    // No lexical bindings of its own: the block shares its parent's scope
                    self.visit_children(node)
                }
            }
            NodeKind::VariableDeclarator { kind } => self.visit_declarator(node, *kind),
            NodeKind::Identifier { name, role: IdentRole::Declaration } => self.visit_binding(node, name),
            NodeKind::Identifier { name, role: IdentRole::Reference } => {
                self.add_reference(name, node.span, ReferenceTarget::Lexical);
                Ok(())
            }
            NodeKind::MemberAccess { receiver, property, access } => {
                if *receiver == Receiver::ImplicitInstance {
                    self.visit_instance_access(node, property, *access);
                }
                self.visit_children(node)
            }
            NodeKind::Other(_) => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &SyntaxNode) -> Result<()> {
        for child in &node.children {
            self.visit(child)?;
        }
        Ok(())
    }

    fn enter(&mut self, kind: ScopeKind, name: Option<String>, span: Span) -> ScopeId {
        let scope = self.tree.add_scope(self.current, kind, name, span);
        debug!(%scope, parent = %self.current, kind = %kind, "enter scope");
        self.current = scope;
        self.frames.push(Frame::Barrier);
        scope
    }

    fn exit(&mut self) {
        self.frames.pop();
        self.tree.seal(self.current);
        self.current = self.tree.parent(self.current).unwrap_or_else(ScopeId::root);
    }

    fn visit_declarator(&mut self, node: &SyntaxNode, kind: DeclarationKind) -> Result<()> {
        self.frames.push(Frame::Declarator {
            kind,
            visible_from: node.span.end,
            bindings: 0,
        });
        let visited = self.visit_children(node);
        let frame = self.frames.pop();
        visited?;

        match frame {
            Some(Frame::Declarator { bindings: 0, .. }) => {
                Err(malformed(node, "declarator without a binding identifier"))
            }
            _ => Ok(()),
        }
    }

    fn visit_binding(&mut self, node: &SyntaxNode, name: &str) -> Result<()> {
        let Some(Frame::Declarator { kind, visible_from, bindings }) = self.frames.last_mut() else {
            return Err(malformed(node, "binding identifier outside a declarator"));
        };
        *bindings += 1;
        let (kind, visible_from) = (*kind, *visible_from);

        let scope = self.target_scope(node, kind)?;
        self.declare(scope, name, kind, node.span, visible_from);
        Ok(())
    }

    /// Scope a declaration of `kind` registers in, seen from the current position
    fn target_scope(&self, node: &SyntaxNode, kind: DeclarationKind) -> Result<ScopeId> {
        match kind {
            DeclarationKind::BlockScoped => Ok(self
                .tree
                .scope_chain(self.current)
                .into_iter()
                .find(|s| self.tree.kind(*s) != Some(ScopeKind::ClassBody))
                .unwrap_or_else(ScopeId::root)),
            DeclarationKind::FunctionScoped
            | DeclarationKind::FunctionHoisted
            | DeclarationKind::Parameter => Ok(self.tree.hoist_target(self.current)),
            DeclarationKind::ClassMember => self
                .classes
                .last()
                .copied()
                .ok_or_else(|| malformed(node, "class member declared outside a class body")),
        }
    }

    fn declare(&mut self, scope: ScopeId, name: &str, kind: DeclarationKind, span: Span, visible_from: usize) {
        if let Some(existing) = self.tree.lookup_local(scope, name) {
            let first = &mut self.declarations[existing.index()];
            if first.kind.merges_with(kind) {
                debug!(ident = name, %scope, "merged redeclaration");
                first.redeclarations.push(span);
            } else {
                warn!(ident = name, %scope, at = %span, "duplicate declaration");
                self.diagnostics.push(Diagnostic::DuplicateDeclaration {
                    name: name.to_string(),
                    scope,
                    first: existing,
                    span,
                });
            }
            return;
        }

        let id = DeclarationId(self.declarations.len() as u32);
        debug!(ident = name, %scope, kind = %kind, "declare");
        self.declarations.push(Declaration {
            id,
            name: name.to_string(),
            kind,
            span,
            redeclarations: Vec::new(),
            scope,
            visible_from,
        });
        self.tree.bind(scope, name, id);
    }

    fn visit_instance_access(&mut self, node: &SyntaxNode, property: &str, access: Access) {
        let class_scope = self.classes.last().copied();

        if matches!(access, Access::Read | Access::ReadWrite) {
            self.add_reference(property, node.span, ReferenceTarget::Member { class_scope });
        }

        if matches!(access, Access::Write | Access::ReadWrite) {
            let Some(class_scope) = class_scope else {
                debug!(property, "instance write outside a class, ignored");
                return;
            };
            // The first write-site anywhere in the class body synthesizes the member
            match self.tree.lookup_local(class_scope, property) {
                Some(existing) => self.declarations[existing.index()].redeclarations.push(node.span),
                None => self.declare(class_scope, property, DeclarationKind::ClassMember, node.span, node.span.start),
            }
        }
    }

    fn add_reference(&mut self, name: &str, span: Span, target: ReferenceTarget) {
        let id = ReferenceId(self.references.len() as u32);
        self.references.push(Reference {
            id,
            name: name.to_string(),
            span,
            scope: self.current,
            target,
        });
    }
}

/// Whether a block directly holds a block-scoped declarator (not counting
/// those behind nested boundaries); only such blocks get a scope of their own
fn declares_block_scoped(block: &SyntaxNode) -> bool {
    block.children.iter().any(|child| match &child.kind {
        NodeKind::VariableDeclarator { kind: DeclarationKind::BlockScoped } => true,
        kind if kind.is_boundary() => false,
        _ => declares_block_scoped(child),
    })
}

fn malformed(node: &SyntaxNode, message: &str) -> Error {
    Error::MalformedTree {
        span: node.span,
        message: format!("{} ({})", message, node.kind.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxNode as N;

    fn sp(start: usize, end: usize) -> Span {
        Span::new(start, end, 1, start as u32 + 1)
    }

    fn decl(kind: DeclarationKind, name: &str, start: usize, end: usize, rest: Vec<N>) -> N {
        let mut children = vec![N::binding(name, sp(start, start + name.len()))];
        children.extend(rest);
        N::declarator(kind, sp(start, end), children)
    }

    fn names_in(analysis: &ScopeAnalysis, scope: ScopeId) -> Vec<&str> {
        analysis
            .tree
            .get(scope)
            .unwrap()
            .declarations
            .keys()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_hoisted_declarations_skip_blocks() {
        // function f(){ { var v; function g(){} let b; } }
        let tree = N::program(
            sp(0, 60),
            vec![decl(
                DeclarationKind::FunctionHoisted,
                "f",
                9,
                58,
                vec![N::function(
                    Some("f"),
                    sp(10, 58),
                    vec![N::block(
                        sp(14, 56),
                        vec![
                            decl(DeclarationKind::FunctionScoped, "v", 20, 21, vec![]),
                            decl(DeclarationKind::FunctionHoisted, "g", 32, 40, vec![N::function(Some("g"), sp(33, 40), vec![])]),
                            decl(DeclarationKind::BlockScoped, "b", 46, 47, vec![]),
                        ],
                    )],
                )],
            )],
        );

        let analysis = ScopeBuilder::build(&tree).unwrap();
        // global, f, block, g
        assert_eq!(analysis.tree.len(), 4);
        assert_eq!(names_in(&analysis, ScopeId::root()), vec!["f"]);
        assert_eq!(names_in(&analysis, ScopeId(1)), vec!["g", "v"]);
        assert_eq!(analysis.tree.kind(ScopeId(2)), Some(ScopeKind::Block));
        assert_eq!(names_in(&analysis, ScopeId(2)), vec!["b"]);
    }

    #[test]
    fn test_block_without_lexical_bindings_is_elided() {
        // { x; var y; }
        let tree = N::program(
            sp(0, 20),
            vec![N::block(
                sp(0, 20),
                vec![N::reference("x", sp(2, 3)), decl(DeclarationKind::FunctionScoped, "y", 9, 10, vec![])],
            )],
        );

        let analysis = ScopeBuilder::build(&tree).unwrap();
        assert_eq!(analysis.tree.len(), 1);
        assert_eq!(analysis.references[0].scope, ScopeId::root());
        assert_eq!(names_in(&analysis, ScopeId::root()), vec!["y"]);
    }

    #[test]
    fn test_parameters_register_in_function() {
        // function f(a, b = a) {}
        let tree = N::program(
            sp(0, 30),
            vec![decl(
                DeclarationKind::FunctionHoisted,
                "f",
                9,
                30,
                vec![N::function(
                    Some("f"),
                    sp(10, 30),
                    vec![
                        decl(DeclarationKind::Parameter, "a", 11, 12, vec![]),
                        decl(DeclarationKind::Parameter, "b", 14, 19, vec![N::reference("a", sp(18, 19))]),
                    ],
                )],
            )],
        );

        let analysis = ScopeBuilder::build(&tree).unwrap();
        assert_eq!(names_in(&analysis, ScopeId(1)), vec!["a", "b"]);
        assert_eq!(analysis.references.len(), 1);
        assert_eq!(analysis.references[0].scope, ScopeId(1));
    }

    #[test]
    fn test_var_redeclaration_merges() {
        let tree = N::program(
            sp(0, 30),
            vec![
                decl(DeclarationKind::FunctionScoped, "x", 4, 5, vec![]),
                decl(DeclarationKind::FunctionScoped, "x", 15, 16, vec![]),
            ],
        );

        let analysis = ScopeBuilder::build(&tree).unwrap();
        assert_eq!(analysis.declarations.len(), 1);
        assert_eq!(analysis.declarations[0].redeclarations, vec![sp(15, 16)]);
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn test_block_scoped_duplicate_is_reported() {
        let tree = N::program(
            sp(0, 30),
            vec![
                decl(DeclarationKind::BlockScoped, "x", 4, 5, vec![]),
                decl(DeclarationKind::BlockScoped, "x", 15, 16, vec![]),
            ],
        );

        let analysis = ScopeBuilder::build(&tree).unwrap();
        assert_eq!(analysis.declarations.len(), 1);
        assert_eq!(analysis.declarations[0].span, sp(4, 5));
        assert_eq!(analysis.diagnostics.len(), 1);
        assert!(analysis.diagnostics[0].is_duplicate());
    }

    #[test]
    fn test_instance_writes_synthesize_members() {
        // class C { m(){ return this.v; } constructor(){ this.v = 1; this.v = 2; } }
        let tree = N::program(
            sp(0, 90),
            vec![decl(
                DeclarationKind::BlockScoped,
                "C",
                6,
                90,
                vec![N::class(
                    Some("C"),
                    sp(8, 90),
                    vec![
                        decl(
                            DeclarationKind::ClassMember,
                            "m",
                            10,
                            33,
                            vec![N::function(
                                Some("m"),
                                sp(11, 33),
                                vec![N::member(Receiver::ImplicitInstance, "v", Access::Read, sp(24, 30), vec![])],
                            )],
                        ),
                        decl(
                            DeclarationKind::ClassMember,
                            "constructor",
                            34,
                            88,
                            vec![N::function(
                                Some("constructor"),
                                sp(45, 88),
                                vec![
                                    N::member(Receiver::ImplicitInstance, "v", Access::Write, sp(50, 56), vec![]),
                                    N::member(Receiver::ImplicitInstance, "v", Access::Write, sp(65, 71), vec![]),
                                ],
                            )],
                        ),
                    ],
                )],
            )],
        );

        let analysis = ScopeBuilder::build(&tree).unwrap();
        let class_scope = ScopeId(1);
        assert_eq!(analysis.tree.kind(class_scope), Some(ScopeKind::ClassBody));
        assert_eq!(names_in(&analysis, class_scope), vec!["constructor", "m", "v"]);

        let v = analysis.declarations.iter().find(|d| d.name == "v").unwrap();
        assert_eq!(v.kind, DeclarationKind::ClassMember);
        assert_eq!(v.span, sp(50, 56));
        assert_eq!(v.redeclarations, vec![sp(65, 71)]);
        assert!(analysis.diagnostics.is_empty());

        assert_eq!(analysis.references.len(), 1);
        assert_eq!(
            analysis.references[0].target,
            ReferenceTarget::Member { class_scope: Some(class_scope) }
        );
    }

    #[test]
    fn test_declarator_without_binding_is_malformed() {
        let tree = N::program(
            sp(0, 10),
            vec![N::declarator(DeclarationKind::BlockScoped, sp(0, 9), vec![N::reference("y", sp(8, 9))])],
        );

        match ScopeBuilder::build(&tree) {
            Err(Error::MalformedTree { span, .. }) => assert_eq!(span, sp(0, 9)),
            other => panic!("expected MalformedTree, got {:?}", other),
        }
    }

    #[test]
    fn test_orphan_binding_is_malformed() {
        // a binding inside a function nested in a declarator still needs its own declarator
        let tree = N::program(
            sp(0, 20),
            vec![decl(
                DeclarationKind::FunctionHoisted,
                "f",
                9,
                20,
                vec![N::function(Some("f"), sp(10, 20), vec![N::binding("z", sp(12, 13))])],
            )],
        );

        assert!(matches!(ScopeBuilder::build(&tree), Err(Error::MalformedTree { .. })));
    }

    #[test]
    fn test_member_outside_class_is_malformed() {
        let tree = N::program(sp(0, 10), vec![decl(DeclarationKind::ClassMember, "m", 0, 5, vec![])]);
        assert!(matches!(ScopeBuilder::build(&tree), Err(Error::MalformedTree { .. })));
    }

    #[test]
    fn test_unknown_nodes_are_containers() {
        let tree = N::program(
            sp(0, 20),
            vec![N::other("jsx_element", sp(0, 20), vec![N::other("jsx_expression", sp(2, 8), vec![N::reference("x", sp(3, 4))])])],
        );

        let analysis = ScopeBuilder::build(&tree).unwrap();
        assert_eq!(analysis.references.len(), 1);
        assert_eq!(analysis.references[0].name, "x");
    }
}
