//! Scope tree data structure
//!
//! The scope tree tracks:
//! - Scope hierarchy (parent/child relationships, children in source order)
//! - Declarations owned by each scope, keyed by name
//!
//! Scopes live in an arena indexed by [`ScopeId`]; parent and child links are
//! ids, never owning pointers.

use crate::declaration::DeclarationId;
use crate::span::Span;
use serde::Serialize;
use std::collections::BTreeMap;

/// Unique identifier for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The global scope ID
    pub fn root() -> Self {
        Self(0)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    /// Program level scope
    Global,
    /// Function/method body, including its parameters
    Function,
    /// Block that holds block-scoped declarations
    Block,
    /// Class body, holding member declarations only
    ClassBody,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Global => "global",
            ScopeKind::Function => "function",
            ScopeKind::Block => "block",
            ScopeKind::ClassBody => "class-body",
        }
    }

    /// Function-level declarations register in the nearest scope of these kinds
    pub fn is_hoist_target(&self) -> bool {
        matches!(self, ScopeKind::Global | ScopeKind::Function)
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One lexical region
#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Name of the function or class that opened the scope, if any
    pub name: Option<String>,
    pub span: Span,
    /// Declarations owned by this scope: name → declaration
    pub declarations: BTreeMap<String, DeclarationId>,
    /// Child scopes in source order
    pub children: Vec<ScopeId>,
    #[serde(skip)]
    sealed: bool,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>, name: Option<String>, span: Span) -> Self {
        Self {
            id,
            kind,
            parent,
            name,
            span,
            declarations: BTreeMap::new(),
            children: Vec::new(),
            sealed: false,
        }
    }

    /// Whether the scope has been closed to new declarations
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

/// Scope tree rooted at the global scope
#[derive(Debug, Clone, Serialize)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Create a new scope tree with a root global scope covering `span`
    pub fn new(span: Span) -> Self {
        Self {
            scopes: vec![Scope::new(ScopeId::root(), ScopeKind::Global, None, None, span)],
        }
    }

    /// Create a new child scope
    pub fn add_scope(&mut self, parent: ScopeId, kind: ScopeKind, name: Option<String>, span: Span) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, kind, Some(parent), name, span));
        self.scopes[parent.index()].children.push(id);
        id
    }

    /// Close a scope to further declarations
    pub fn seal(&mut self, scope: ScopeId) {
        self.scopes[scope.index()].sealed = true;
    }

    /// Bind `name` to a declaration in a scope
    pub fn bind(&mut self, scope: ScopeId, name: impl Into<String>, declaration: DeclarationId) {
        let target = &mut self.scopes[scope.index()];
        debug_assert!(!target.sealed, "declaration added to sealed scope {}", scope);
        target.declarations.insert(name.into(), declaration);
    }

    /// Get a scope by id
    pub fn get(&self, scope: ScopeId) -> Option<&Scope> {
        self.scopes.get(scope.index())
    }

    pub fn contains(&self, scope: ScopeId) -> bool {
        scope.index() < self.scopes.len()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// All scopes in creation (pre-order) order
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Get the parent of a scope
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.get(scope).and_then(|s| s.parent)
    }

    /// Get the kind of a scope
    pub fn kind(&self, scope: ScopeId) -> Option<ScopeKind> {
        self.get(scope).map(|s| s.kind)
    }

    /// Look up a declaration in a scope (not walking parents)
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<DeclarationId> {
        self.get(scope).and_then(|s| s.declarations.get(name).copied())
    }

    /// Get scope chain from a scope up to root
    pub fn scope_chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = vec![scope];
        let mut current = scope;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Scopes from `from` up to and including `to`, or `None` if `to` is not
    /// an ancestor-or-self of `from`
    pub fn path_between(&self, from: ScopeId, to: ScopeId) -> Option<Vec<ScopeId>> {
        let mut path = Vec::new();
        let mut current = Some(from);
        while let Some(scope) = current {
            path.push(scope);
            if scope == to {
                return Some(path);
            }
            current = self.parent(scope);
        }
        None
    }

    pub fn is_ancestor_or_self(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        self.path_between(scope, ancestor).is_some()
    }

    /// Nearest enclosing function or global scope (the scope itself included)
    pub fn hoist_target(&self, scope: ScopeId) -> ScopeId {
        self.scope_chain(scope)
            .into_iter()
            .find(|s| self.kind(*s).is_some_and(|k| k.is_hoist_target()))
            .unwrap_or_else(ScopeId::root)
    }

    /// Number of hops from the global scope
    pub fn depth(&self, scope: ScopeId) -> usize {
        self.scope_chain(scope).len() - 1
    }

    /// Human-readable path built from named function and class scopes,
    /// e.g. `outer::inner`, or `global` at top level
    pub fn scope_path(&self, scope: ScopeId) -> String {
        let mut parts: Vec<&str> = self
            .scope_chain(scope)
            .into_iter()
            .filter_map(|s| self.get(s).and_then(|s| s.name.as_deref()))
            .collect();

        if parts.is_empty() {
            return "global".to_string();
        }
        parts.reverse();
        parts.join("::")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0, 1, 1)
    }

    #[test]
    fn test_scope_hierarchy() {
        let mut tree = ScopeTree::new(span());

        let class_scope = tree.add_scope(ScopeId::root(), ScopeKind::ClassBody, Some("C".into()), span());
        let method_scope = tree.add_scope(class_scope, ScopeKind::Function, Some("m".into()), span());

        assert_eq!(tree.parent(method_scope), Some(class_scope));
        assert_eq!(tree.parent(class_scope), Some(ScopeId::root()));
        assert_eq!(tree.parent(ScopeId::root()), None);
        assert_eq!(tree.get(ScopeId::root()).unwrap().children, vec![class_scope]);
    }

    #[test]
    fn test_local_lookup() {
        let mut tree = ScopeTree::new(span());
        let func = tree.add_scope(ScopeId::root(), ScopeKind::Function, None, span());

        tree.bind(ScopeId::root(), "g", DeclarationId(0));
        tree.bind(func, "a", DeclarationId(1));

        assert_eq!(tree.lookup_local(func, "a"), Some(DeclarationId(1)));
        assert_eq!(tree.lookup_local(func, "g"), None);
        assert_eq!(tree.lookup_local(ScopeId::root(), "g"), Some(DeclarationId(0)));
    }

    #[test]
    fn test_scope_chain_and_paths() {
        let mut tree = ScopeTree::new(span());

        let s1 = tree.add_scope(ScopeId::root(), ScopeKind::Function, Some("outer".into()), span());
        let s2 = tree.add_scope(s1, ScopeKind::Block, None, span());
        let s3 = tree.add_scope(s2, ScopeKind::Function, Some("inner".into()), span());
        let sibling = tree.add_scope(ScopeId::root(), ScopeKind::Block, None, span());

        assert_eq!(tree.scope_chain(s3), vec![s3, s2, s1, ScopeId::root()]);
        assert_eq!(tree.path_between(s3, s1), Some(vec![s3, s2, s1]));
        assert_eq!(tree.path_between(s3, sibling), None);
        assert!(tree.is_ancestor_or_self(s3, s3));
        assert_eq!(tree.depth(s3), 3);
        assert_eq!(tree.hoist_target(s2), s1);
        assert_eq!(tree.hoist_target(sibling), ScopeId::root());
        assert_eq!(tree.scope_path(s3), "outer::inner");
        assert_eq!(tree.scope_path(sibling), "global");
    }

    #[test]
    fn test_seal() {
        let mut tree = ScopeTree::new(span());
        let block = tree.add_scope(ScopeId::root(), ScopeKind::Block, None, span());
        assert!(!tree.get(block).unwrap().is_sealed());
        tree.seal(block);
        assert!(tree.get(block).unwrap().is_sealed());
    }
}
