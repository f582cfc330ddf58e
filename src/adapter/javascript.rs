//! JavaScript language adapter
//!
//! Parses JavaScript with tree-sitter and lowers the concrete tree into the
//! core vocabulary:
//! - `let`/`const`/`class` → block-scoped declarators
//! - `var` → function-scoped declarators
//! - function declarations and imports → hoisted declarators
//! - methods, fields and accessors → class members
//! - `this.x` → implicit-instance member accesses

use super::framework::LanguageAdapter;
use crate::declaration::DeclarationKind;
use crate::span::Span;
use crate::syntax::{Access, IdentRole, NodeKind, Receiver, SyntaxNode};
use crate::{Error, Result};
use tree_sitter::{Language, Node, Parser, Tree};
use tracing::warn;

/// Extensions handled when no configuration overrides them
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx"];

/// JavaScript language adapter
pub struct JavaScriptAdapter {
    language: Language,
    extensions: Vec<String>,
}

impl JavaScriptAdapter {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the handled file extensions
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    /// Parse source text into a tree-sitter tree
    pub fn parse(&self, content: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| Error::Adapter(format!("Failed to set language: {}", e)))?;

        parser
            .parse(content, None)
            .ok_or_else(|| Error::Parse("Failed to parse source code".to_string()))
    }
}

impl Default for JavaScriptAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language_name(&self) -> &str {
        "JavaScript"
    }

    fn file_extensions(&self) -> &[String] {
        &self.extensions
    }

    fn lower(&self, source: &str) -> Result<SyntaxNode> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        if root.has_error() {
            warn!("source contains syntax errors; lowering what parsed");
        }

        let lowering = Lowering { source: source.as_bytes() };
        Ok(SyntaxNode::program(span(root), lowering.children(root)?))
    }
}

/// Concrete-tree → syntax-node translation for one source text
struct Lowering<'s> {
    source: &'s [u8],
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node) -> Result<String> {
        node.utf8_text(self.source)
            .map(str::to_string)
            .map_err(|e| Error::Adapter(format!("invalid UTF-8 at {}: {}", span(node), e)))
    }

    fn children(&self, node: Node) -> Result<Vec<SyntaxNode>> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.lower(child, &mut out)?;
        }
        Ok(out)
    }

    fn lower(&self, node: Node, out: &mut Vec<SyntaxNode>) -> Result<()> {
        match node.kind() {
            "comment" | "hash_bang_line" | "this" | "property_identifier"
            | "private_property_identifier" | "statement_identifier" | "jsx_closing_element" => {}
            "identifier" | "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => {
                out.push(SyntaxNode::reference(&self.text(node)?, span(node)));
            }
            "statement_block" | "switch_body" | "for_statement" => {
                out.push(SyntaxNode::block(span(node), self.children(node)?));
            }
            "for_in_statement" => out.push(self.for_in(node)?),
            "catch_clause" => out.push(self.catch_clause(node)?),
            "function_declaration" | "generator_function_declaration" => {
                let function = self.function(node)?;
                match node.child_by_field_name("name") {
                    Some(name) => out.push(declarator(
                        DeclarationKind::FunctionHoisted,
                        span(node),
                        vec![SyntaxNode::binding(&self.text(name)?, span(name)), function],
                    )),
                    None => out.push(function),
                }
            }
            "function_expression" | "function" | "generator_function" | "arrow_function"
            | "method_definition" => out.push(self.function(node)?),
            "class_declaration" | "class" => out.push(self.class(node)?),
            "lexical_declaration" | "variable_declaration" => self.declaration(node, out)?,
            "import_statement" => self.import(node, out)?,
            "export_specifier" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.lower(name, out)?;
                }
            }
            "member_expression" => self.member(node, Access::Read, out)?,
            "assignment_expression" | "augmented_assignment_expression" => {
                let access = if node.kind() == "assignment_expression" {
                    Access::Write
                } else {
                    Access::ReadWrite
                };
                let mut children = Vec::new();
                if let Some(left) = node.child_by_field_name("left") {
                    self.target(left, access, &mut children)?;
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.lower(right, &mut children)?;
                }
                out.push(SyntaxNode::other(node.kind(), span(node), children));
            }
            "update_expression" => {
                let mut children = Vec::new();
                if let Some(argument) = node.child_by_field_name("argument") {
                    self.target(argument, Access::ReadWrite, &mut children)?;
                }
                out.push(SyntaxNode::other(node.kind(), span(node), children));
            }
            "jsx_opening_element" | "jsx_self_closing_element" => {
                let tag = node.child_by_field_name("name");
                let mut children = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    // lowercase tags are intrinsic elements, not bindings
                    let intrinsic = Some(child.id()) == tag.map(|t| t.id())
                        && child.kind() == "identifier"
                        && self.text(child)?.starts_with(|c: char| c.is_ascii_lowercase());
                    if !intrinsic {
                        self.lower(child, &mut children)?;
                    }
                }
                out.push(SyntaxNode::other(node.kind(), span(node), children));
            }
            kind => out.push(SyntaxNode::other(kind, span(node), self.children(node)?)),
        }
        Ok(())
    }

    /// `let`/`const`/`var` statements; one declarator per binding clause
    fn declaration(&self, node: Node, out: &mut Vec<SyntaxNode>) -> Result<()> {
        let kind = if node.kind() == "lexical_declaration" {
            DeclarationKind::BlockScoped
        } else {
            DeclarationKind::FunctionScoped
        };

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "variable_declarator" {
                self.lower(child, out)?;
                continue;
            }
            let mut children = Vec::new();
            if let Some(name) = child.child_by_field_name("name") {
                self.pattern(name, &mut children)?;
            }
            if let Some(value) = child.child_by_field_name("value") {
                self.lower(value, &mut children)?;
            }
            out.push(declarator(kind, span(child), children));
        }
        Ok(())
    }

    /// Binding position: identifiers become declarations, default values and
    /// computed keys are ordinary expressions
    fn pattern(&self, node: Node, out: &mut Vec<SyntaxNode>) -> Result<()> {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                out.push(SyntaxNode::binding(&self.text(node)?, span(node)));
            }
            "object_pattern" | "array_pattern" | "rest_pattern" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.pattern(child, out)?;
                }
            }
            "pair_pattern" => {
                if let Some(key) = node.child_by_field_name("key") {
                    self.lower(key, out)?;
                }
                if let Some(value) = node.child_by_field_name("value") {
                    self.pattern(value, out)?;
                }
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.pattern(left, out)?;
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.lower(right, out)?;
                }
            }
            "comment" => {}
            _ => self.lower(node, out)?,
        }
        Ok(())
    }

    /// Assignment or update target
    fn target(&self, node: Node, access: Access, out: &mut Vec<SyntaxNode>) -> Result<()> {
        if node.kind() == "member_expression" {
            self.member(node, access, out)
        } else {
            self.lower(node, out)
        }
    }

    fn member(&self, node: Node, access: Access, out: &mut Vec<SyntaxNode>) -> Result<()> {
        let object = node.child_by_field_name("object");
        let property = node.child_by_field_name("property");

        match (object, property) {
            (Some(object), Some(property)) if object.kind() == "this" => {
                out.push(SyntaxNode::member(
                    Receiver::ImplicitInstance,
                    &self.text(property)?,
                    access,
                    span(node),
                    Vec::new(),
                ));
            }
            (Some(object), Some(property)) => {
                let mut children = Vec::new();
                self.lower(object, &mut children)?;
                out.push(SyntaxNode::member(Receiver::Other, &self.text(property)?, access, span(node), children));
            }
            _ => out.push(SyntaxNode::other(node.kind(), span(node), self.children(node)?)),
        }
        Ok(())
    }

    /// Function-like node → function boundary holding parameters and body
    fn function(&self, node: Node) -> Result<SyntaxNode> {
        let name = node.child_by_field_name("name");
        let mut children = Vec::new();

        // A named function expression binds its own name inside itself
        if let Some(name) = name {
            if matches!(node.kind(), "function_expression" | "function" | "generator_function") {
                children.push(declarator(
                    DeclarationKind::FunctionHoisted,
                    span(name),
                    vec![SyntaxNode::binding(&self.text(name)?, span(name))],
                ));
            }
        }

        if let Some(parameters) = node.child_by_field_name("parameters") {
            let mut cursor = parameters.walk();
            for parameter in parameters.named_children(&mut cursor) {
                if parameter.kind() != "comment" {
                    children.push(self.parameter(parameter)?);
                }
            }
        } else if let Some(parameter) = node.child_by_field_name("parameter") {
            children.push(self.parameter(parameter)?);
        }

        if let Some(body) = node.child_by_field_name("body") {
            if body.kind() == "statement_block" {
                children.extend(self.children(body)?);
            } else {
                self.lower(body, &mut children)?;
            }
        }

        let label = match name {
            Some(name) if name.kind() != "computed_property_name" => Some(self.text(name)?),
            _ => None,
        };
        Ok(SyntaxNode::new(NodeKind::FunctionBoundary { name: label }, span(node), children))
    }

    fn parameter(&self, node: Node) -> Result<SyntaxNode> {
        let mut pattern = Vec::new();
        self.pattern(node, &mut pattern)?;
        Ok(declarator(DeclarationKind::Parameter, span(node), pattern))
    }

    fn class(&self, node: Node) -> Result<SyntaxNode> {
        let name = node.child_by_field_name("name");
        let label = name.map(|n| self.text(n)).transpose()?;
        let mut parts = Vec::new();

        // heritage is evaluated in the enclosing scope
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "class_heritage" {
                parts.extend(self.children(child)?);
            }
        }

        let body = node.child_by_field_name("body");
        let members = match body {
            Some(body) => self.members(body)?,
            None => Vec::new(),
        };
        parts.push(SyntaxNode::class(label.as_deref(), span(body.unwrap_or(node)), members));

        let Some(name) = name else {
            return Ok(SyntaxNode::other(node.kind(), span(node), parts));
        };
        let mut children = vec![SyntaxNode::binding(&self.text(name)?, span(name))];
        children.extend(parts);
        let binding = declarator(DeclarationKind::BlockScoped, span(node), children);

        if node.kind() == "class_declaration" {
            Ok(binding)
        } else {
            // a named class expression binds its name around the class only
            Ok(SyntaxNode::block(span(node), vec![binding]))
        }
    }

    fn members(&self, body: Node) -> Result<Vec<SyntaxNode>> {
        let mut out = Vec::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "method_definition" => out.push(self.method(member)?),
                "field_definition" => {
                    let mut children = Vec::new();
                    match member.child_by_field_name("property") {
                        Some(property) if property.kind() != "computed_property_name" => {
                            children.push(SyntaxNode::binding(&self.text(property)?, span(property)));
                        }
                        Some(property) => self.lower(property, &mut children)?,
                        None => {}
                    }
                    if let Some(value) = member.child_by_field_name("value") {
                        self.lower(value, &mut children)?;
                    }
                    out.push(declarator(DeclarationKind::ClassMember, span(member), children));
                }
                "class_static_block" => {
                    let body = match member.child_by_field_name("body") {
                        Some(body) => self.children(body)?,
                        None => Vec::new(),
                    };
                    out.push(SyntaxNode::function(None, span(member), body));
                }
                _ => self.lower(member, &mut out)?,
            }
        }
        Ok(out)
    }

    fn method(&self, node: Node) -> Result<SyntaxNode> {
        let function = self.function(node)?;
        let Some(name) = node.child_by_field_name("name") else {
            return Ok(function);
        };
        if name.kind() == "computed_property_name" {
            let mut children = Vec::new();
            self.lower(name, &mut children)?;
            children.push(function);
            return Ok(SyntaxNode::other("method_definition", span(node), children));
        }

        let property = self.text(name)?;
        if is_accessor(node) {
            // getter/setter pairs share one member; each accessor is a write-site
            return Ok(SyntaxNode::member(
                Receiver::ImplicitInstance,
                &property,
                Access::Write,
                span(name),
                vec![function],
            ));
        }

        Ok(declarator(
            DeclarationKind::ClassMember,
            span(node),
            vec![SyntaxNode::binding(&property, span(name)), function],
        ))
    }

    fn for_in(&self, node: Node) -> Result<SyntaxNode> {
        let mut children = Vec::new();

        if let Some(left) = node.child_by_field_name("left") {
            let kind = node
                .child_by_field_name("kind")
                .map(|k| self.text(k))
                .transpose()?;
            match kind.as_deref() {
                Some("var") => {
                    let mut pattern = Vec::new();
                    self.pattern(left, &mut pattern)?;
                    children.push(declarator(DeclarationKind::FunctionScoped, span(left), pattern));
                }
                Some(_) => {
                    let mut pattern = Vec::new();
                    self.pattern(left, &mut pattern)?;
                    children.push(declarator(DeclarationKind::BlockScoped, span(left), pattern));
                }
                None => self.lower(left, &mut children)?,
            }
        }
        if let Some(right) = node.child_by_field_name("right") {
            self.lower(right, &mut children)?;
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.lower(body, &mut children)?;
        }

        Ok(SyntaxNode::block(span(node), children))
    }

    /// The catch parameter and the handler body share one block
    fn catch_clause(&self, node: Node) -> Result<SyntaxNode> {
        let mut children = Vec::new();
        if let Some(parameter) = node.child_by_field_name("parameter") {
            let mut pattern = Vec::new();
            self.pattern(parameter, &mut pattern)?;
            children.push(declarator(DeclarationKind::BlockScoped, span(parameter), pattern));
        }
        if let Some(body) = node.child_by_field_name("body") {
            children.extend(self.children(body)?);
        }
        Ok(SyntaxNode::block(span(node), children))
    }

    fn import(&self, node: Node, out: &mut Vec<SyntaxNode>) -> Result<()> {
        let mut cursor = node.walk();
        for clause in node.named_children(&mut cursor) {
            if clause.kind() != "import_clause" {
                continue;
            }
            let mut inner = clause.walk();
            for child in clause.named_children(&mut inner) {
                match child.kind() {
                    "identifier" => out.push(self.import_binding(child)?),
                    "namespace_import" => {
                        let mut names = child.walk();
                        for name in child.named_children(&mut names) {
                            if name.kind() == "identifier" {
                                out.push(self.import_binding(name)?);
                            }
                        }
                    }
                    "named_imports" => {
                        let mut specifiers = child.walk();
                        for specifier in child.named_children(&mut specifiers) {
                            let local = specifier
                                .child_by_field_name("alias")
                                .or_else(|| specifier.child_by_field_name("name"));
                            if let Some(local) = local.filter(|n| n.kind() == "identifier") {
                                out.push(self.import_binding(local)?);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn import_binding(&self, name: Node) -> Result<SyntaxNode> {
        Ok(declarator(
            DeclarationKind::FunctionHoisted,
            span(name),
            vec![SyntaxNode::binding(&self.text(name)?, span(name))],
        ))
    }
}

fn span(node: Node) -> Span {
    let position = node.start_position();
    Span::new(
        node.start_byte(),
        node.end_byte(),
        position.row as u32 + 1,
        position.column as u32 + 1,
    )
}

/// `get x()` / `set x(v)` method definitions
fn is_accessor(node: Node) -> bool {
    let mut cursor = node.walk();
    let accessor = node
        .children(&mut cursor)
        .any(|child| matches!(child.kind(), "get" | "set"));
    accessor
}

/// Declarator around `children`, or a plain container when the pattern
/// produced no binding (e.g. error recovery in the parser)
fn declarator(kind: DeclarationKind, span: Span, children: Vec<SyntaxNode>) -> SyntaxNode {
    if children.iter().any(has_binding) {
        SyntaxNode::declarator(kind, span, children)
    } else {
        SyntaxNode::other("pattern", span, children)
    }
}

fn has_binding(node: &SyntaxNode) -> bool {
    match &node.kind {
        NodeKind::Identifier { role: IdentRole::Declaration, .. } => true,
        NodeKind::VariableDeclarator { .. } => false,
        kind if kind.is_boundary() => false,
        _ => node.children.iter().any(has_binding),
    }
}
