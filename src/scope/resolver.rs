//! Scope Resolver - Resolves references to declarations
//!
//! Resolution algorithm:
//! 1. Member-qualified references (`this.name`) look in the innermost
//!    enclosing class body first
//! 2. Walk outward through the lexical scope chain, skipping class bodies
//! 3. A block-scoped candidate read before its declarator, without an
//!    intervening function boundary, is invisible: keep searching outward
//! 4. Nothing found → unresolved (implicit external binding)

use super::builder::ScopeAnalysis;
use super::tree::{ScopeId, ScopeKind, ScopeTree};
use crate::declaration::{Declaration, DeclarationId, DeclarationKind, Reference, ReferenceTarget};
use crate::diagnostics::Diagnostic;
use crate::edge::{LineageEdge, ResolutionPath};
use tracing::debug;

/// Result of resolving a single reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        declaration: DeclarationId,
        /// Scopes from the reference's scope to the declaring scope, inclusive
        chain: Vec<ScopeId>,
        path: ResolutionPath,
    },
    Unresolved,
}

/// Name resolver over a completed scope tree
pub struct ScopeResolver<'a> {
    tree: &'a ScopeTree,
    declarations: &'a [Declaration],
}

impl<'a> ScopeResolver<'a> {
    /// Create a new resolver
    pub fn new(tree: &'a ScopeTree, declarations: &'a [Declaration]) -> Self {
        Self { tree, declarations }
    }

    /// Resolve every reference of a builder pass, returning one edge per
    /// resolved reference plus the diagnostics raised along the way
    pub fn resolve_all(analysis: &ScopeAnalysis) -> (Vec<LineageEdge>, Vec<Diagnostic>) {
        let resolver = ScopeResolver::new(&analysis.tree, &analysis.declarations);
        let mut edges = Vec::new();
        let mut diagnostics = Vec::new();

        for reference in &analysis.references {
            match resolver.resolve(reference, &mut diagnostics) {
                Resolution::Resolved { declaration, chain, path } => {
                    debug!(ident = %reference.name, at = %reference.span, hops = chain.len() - 1, "resolved");
                    edges.push(LineageEdge::new(reference.id, declaration, chain, path));
                }
                Resolution::Unresolved => {
                    debug!(ident = %reference.name, at = %reference.span, "unresolved");
                    diagnostics.push(Diagnostic::UnresolvedReference {
                        name: reference.name.clone(),
                        reference: reference.id,
                        span: reference.span,
                    });
                }
            }
        }

        (edges, diagnostics)
    }

    /// Resolve a single reference. Invisible block-scoped candidates that were
    /// skipped are reported into `hints`.
    pub fn resolve(&self, reference: &Reference, hints: &mut Vec<Diagnostic>) -> Resolution {
        if let ReferenceTarget::Member { class_scope: Some(class_scope) } = reference.target {
            if let Some(resolution) = self.resolve_member(reference, class_scope) {
                return resolution;
            }
        }
        self.resolve_lexical(reference, hints)
    }

    fn resolve_member(&self, reference: &Reference, class_scope: ScopeId) -> Option<Resolution> {
        let declaration = self.tree.lookup_local(class_scope, &reference.name)?;
        if self.declaration(declaration)?.kind != DeclarationKind::ClassMember {
            return None;
        }
        let chain = self.tree.path_between(reference.scope, class_scope)?;

        Some(Resolution::Resolved {
            declaration,
            chain,
            path: ResolutionPath::Member,
        })
    }

    fn resolve_lexical(&self, reference: &Reference, hints: &mut Vec<Diagnostic>) -> Resolution {
        let mut chain = Vec::new();
        // Reads inside a nested function or a field initializer run later,
        // so the dead zone no longer applies once one is crossed
        let mut deferred = false;

        for scope in self.tree.scope_chain(reference.scope) {
            chain.push(scope);
            let kind = self.tree.kind(scope);

            // Class bodies only hold members, which bare names never reach
            if kind != Some(ScopeKind::ClassBody) {
                if let Some(id) = self.tree.lookup_local(scope, &reference.name) {
                    match self.declaration(id) {
                        Some(declaration) if deferred || declaration.is_visible_at(reference.span.start) => {
                            return Resolution::Resolved {
                                declaration: id,
                                chain,
                                path: ResolutionPath::Lexical,
                            };
                        }
                        Some(_) => hints.push(Diagnostic::TemporalDeadZone {
                            name: reference.name.clone(),
                            reference: reference.id,
                            skipped: id,
                            span: reference.span,
                        }),
                        None => {}
                    }
                }
            }

            if matches!(kind, Some(ScopeKind::Function | ScopeKind::ClassBody)) {
                deferred = true;
            }
        }

        Resolution::Unresolved
    }

    fn declaration(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.get(id.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{DeclarationId, ReferenceId};
    use crate::span::Span;

    struct Fixture {
        tree: ScopeTree,
        declarations: Vec<Declaration>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tree: ScopeTree::new(Span::new(0, 1000, 1, 1)),
                declarations: Vec::new(),
            }
        }

        fn scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
            self.tree.add_scope(parent, kind, None, Span::new(0, 1000, 1, 1))
        }

        fn declare(&mut self, scope: ScopeId, name: &str, kind: DeclarationKind, at: usize) -> DeclarationId {
            let id = DeclarationId(self.declarations.len() as u32);
            self.declarations.push(Declaration {
                id,
                name: name.to_string(),
                kind,
                span: Span::new(at, at + name.len(), 1, at as u32 + 1),
                redeclarations: Vec::new(),
                scope,
                visible_from: at + name.len(),
            });
            self.tree.bind(scope, name, id);
            id
        }

        fn resolve(&self, scope: ScopeId, name: &str, at: usize, target: ReferenceTarget) -> (Resolution, Vec<Diagnostic>) {
            let reference = Reference {
                id: ReferenceId(0),
                name: name.to_string(),
                span: Span::new(at, at + name.len(), 1, at as u32 + 1),
                scope,
                target,
            };
            let mut hints = Vec::new();
            let resolution = ScopeResolver::new(&self.tree, &self.declarations).resolve(&reference, &mut hints);
            (resolution, hints)
        }
    }

    fn resolved(declaration: DeclarationId, chain: Vec<ScopeId>, path: ResolutionPath) -> Resolution {
        Resolution::Resolved { declaration, chain, path }
    }

    #[test]
    fn test_resolve_parent_scope() {
        let mut fx = Fixture::new();
        let func = fx.scope(ScopeId::root(), ScopeKind::Function);
        let g = fx.declare(ScopeId::root(), "g", DeclarationKind::BlockScoped, 6);

        let (resolution, _) = fx.resolve(func, "g", 50, ReferenceTarget::Lexical);
        assert_eq!(resolution, resolved(g, vec![func, ScopeId::root()], ResolutionPath::Lexical));
    }

    #[test]
    fn test_shadowing_prefers_innermost() {
        let mut fx = Fixture::new();
        let outer = fx.declare(ScopeId::root(), "x", DeclarationKind::BlockScoped, 6);
        let block = fx.scope(ScopeId::root(), ScopeKind::Block);
        let inner = fx.declare(block, "x", DeclarationKind::BlockScoped, 20);

        let (in_block, _) = fx.resolve(block, "x", 40, ReferenceTarget::Lexical);
        assert_eq!(in_block, resolved(inner, vec![block], ResolutionPath::Lexical));

        let (at_top, _) = fx.resolve(ScopeId::root(), "x", 90, ReferenceTarget::Lexical);
        assert_eq!(at_top, resolved(outer, vec![ScopeId::root()], ResolutionPath::Lexical));
    }

    #[test]
    fn test_dead_zone_falls_through_to_outer() {
        let mut fx = Fixture::new();
        let outer = fx.declare(ScopeId::root(), "x", DeclarationKind::BlockScoped, 6);
        let block = fx.scope(ScopeId::root(), ScopeKind::Block);
        let inner = fx.declare(block, "x", DeclarationKind::BlockScoped, 40);

        let (resolution, hints) = fx.resolve(block, "x", 20, ReferenceTarget::Lexical);
        assert_eq!(resolution, resolved(outer, vec![block, ScopeId::root()], ResolutionPath::Lexical));
        assert_eq!(hints.len(), 1);
        assert!(matches!(hints[0], Diagnostic::TemporalDeadZone { skipped, .. } if skipped == inner));
    }

    #[test]
    fn test_dead_zone_without_outer_is_unresolved() {
        let mut fx = Fixture::new();
        fx.declare(ScopeId::root(), "x", DeclarationKind::BlockScoped, 40);

        let (resolution, hints) = fx.resolve(ScopeId::root(), "x", 10, ReferenceTarget::Lexical);
        assert_eq!(resolution, Resolution::Unresolved);
        assert_eq!(hints.len(), 1);
    }

    #[test]
    fn test_nested_function_is_not_in_dead_zone() {
        let mut fx = Fixture::new();
        let func = fx.scope(ScopeId::root(), ScopeKind::Function);
        let x = fx.declare(ScopeId::root(), "x", DeclarationKind::BlockScoped, 40);

        let (resolution, hints) = fx.resolve(func, "x", 20, ReferenceTarget::Lexical);
        assert_eq!(resolution, resolved(x, vec![func, ScopeId::root()], ResolutionPath::Lexical));
        assert!(hints.is_empty());
    }

    #[test]
    fn test_class_body_is_not_in_dead_zone() {
        let mut fx = Fixture::new();
        let class_scope = fx.scope(ScopeId::root(), ScopeKind::ClassBody);
        let c = fx.declare(ScopeId::root(), "C", DeclarationKind::BlockScoped, 900);

        let (resolution, hints) = fx.resolve(class_scope, "C", 20, ReferenceTarget::Lexical);
        assert_eq!(resolution, resolved(c, vec![class_scope, ScopeId::root()], ResolutionPath::Lexical));
        assert!(hints.is_empty());

        // heritage sits outside the body and still reads too early
        let (resolution, hints) = fx.resolve(ScopeId::root(), "C", 15, ReferenceTarget::Lexical);
        assert_eq!(resolution, Resolution::Unresolved);
        assert_eq!(hints.len(), 1);
    }

    #[test]
    fn test_hoisted_visible_before_declaration() {
        let mut fx = Fixture::new();
        let f = fx.declare(ScopeId::root(), "f", DeclarationKind::FunctionHoisted, 40);
        let v = fx.declare(ScopeId::root(), "v", DeclarationKind::FunctionScoped, 60);

        assert_eq!(fx.resolve(ScopeId::root(), "f", 5, ReferenceTarget::Lexical).0, resolved(f, vec![ScopeId::root()], ResolutionPath::Lexical));
        assert_eq!(fx.resolve(ScopeId::root(), "v", 5, ReferenceTarget::Lexical).0, resolved(v, vec![ScopeId::root()], ResolutionPath::Lexical));
    }

    #[test]
    fn test_member_path_and_fallback() {
        let mut fx = Fixture::new();
        let outer_v = fx.declare(ScopeId::root(), "w", DeclarationKind::BlockScoped, 0);
        let class_scope = fx.scope(ScopeId::root(), ScopeKind::ClassBody);
        let method = fx.scope(class_scope, ScopeKind::Function);
        let member = fx.declare(class_scope, "v", DeclarationKind::ClassMember, 30);
        let target = ReferenceTarget::Member { class_scope: Some(class_scope) };

        let (via_member, _) = fx.resolve(method, "v", 80, target);
        assert_eq!(via_member, resolved(member, vec![method, class_scope], ResolutionPath::Member));

        // not a member: falls back to the lexical chain
        let (fallback, _) = fx.resolve(method, "w", 80, target);
        assert_eq!(fallback, resolved(outer_v, vec![method, class_scope, ScopeId::root()], ResolutionPath::Lexical));
    }

    #[test]
    fn test_bare_name_never_reaches_members() {
        let mut fx = Fixture::new();
        let class_scope = fx.scope(ScopeId::root(), ScopeKind::ClassBody);
        let method = fx.scope(class_scope, ScopeKind::Function);
        fx.declare(class_scope, "v", DeclarationKind::ClassMember, 30);

        let (resolution, _) = fx.resolve(method, "v", 80, ReferenceTarget::Lexical);
        assert_eq!(resolution, Resolution::Unresolved);
    }

    #[test]
    fn test_unresolved_reference() {
        let fx = Fixture::new();
        let (resolution, hints) = fx.resolve(ScopeId::root(), "console", 0, ReferenceTarget::Lexical);
        assert_eq!(resolution, Resolution::Unresolved);
        assert!(hints.is_empty());
    }
}
