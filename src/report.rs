//! Report rendering for lineage graphs
//!
//! The text form groups everything per declaration: the declaring construct,
//! then each use with the depth of its resolved scope chain.

use crate::diagnostics::Diagnostic;
use crate::edge::ResolutionPath;
use crate::graph::LineageGraph;
use crate::scope::ScopeId;
use serde::{Deserialize, Serialize};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Controls what the text report includes
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Only declarations with this name
    pub name: Option<String>,
    /// Include unresolved-reference diagnostics
    pub show_unresolved: bool,
    /// Prepend the scope tree
    pub show_scopes: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            name: None,
            show_unresolved: true,
            show_scopes: false,
        }
    }
}

/// Render a graph as plain text
pub fn render_text(graph: &LineageGraph, options: &ReportOptions) -> String {
    let mut out = String::new();

    if options.show_scopes {
        out.push_str(&render_scopes(graph));
        out.push('\n');
    }

    for declaration in graph.declarations() {
        if options.name.as_deref().is_some_and(|name| name != declaration.name) {
            continue;
        }

        out.push_str(&format!(
            "{} ({}) declared in {} at {}\n",
            declaration.name,
            declaration.kind,
            graph.scope_path(declaration.scope),
            declaration.span
        ));
        for redeclaration in &declaration.redeclarations {
            out.push_str(&format!("  also declared at {}\n", redeclaration));
        }

        let references = graph.references_of(declaration.id);
        if references.is_empty() {
            out.push_str("  (no references)\n");
        }
        for reference in references {
            let Some(edge) = graph.edge_for(reference.id) else {
                continue;
            };
            let hops = edge.hops();
            let via = match edge.path {
                ResolutionPath::Member => ", via member",
                ResolutionPath::Lexical => "",
            };
            out.push_str(&format!(
                "  referenced at {} in {} ({} hop{}{})\n",
                reference.span,
                graph.scope_path(reference.scope),
                hops,
                if hops == 1 { "" } else { "s" },
                via
            ));
        }
    }

    let diagnostics: Vec<&Diagnostic> = graph
        .diagnostics()
        .iter()
        .filter(|d| options.name.as_deref().is_none_or(|name| name == d.name()))
        .filter(|d| options.show_unresolved || !d.is_unresolved())
        .collect();

    if !diagnostics.is_empty() {
        out.push_str("\nDiagnostics:\n");
        for diagnostic in diagnostics {
            out.push_str(&format!("  {} {}\n", diagnostic.severity().as_str(), diagnostic));
        }
    }

    out
}

/// Indented scope tree, one line per scope with its declared names
pub fn render_scopes(graph: &LineageGraph) -> String {
    let mut out = String::new();
    write_scope(graph, ScopeId::root(), 0, &mut out);
    out
}

fn write_scope(graph: &LineageGraph, scope: ScopeId, depth: usize, out: &mut String) {
    let Some(node) = graph.scope(scope) else {
        return;
    };

    let names: Vec<&str> = graph
        .declarations_of(scope)
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    out.push_str(&format!("{}{} {}", "  ".repeat(depth), node.id, node.kind));
    if let Some(name) = &node.name {
        out.push_str(&format!(" {}", name));
    }
    if !names.is_empty() {
        out.push_str(&format!(" [{}]", names.join(", ")));
    }
    out.push('\n');

    for child in &node.children {
        write_scope(graph, *child, depth + 1, out);
    }
}

/// Render a graph as pretty JSON
pub fn render_json(graph: &LineageGraph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::LineageTracker;
    use std::path::Path;

    fn graph(source: &str) -> LineageGraph {
        LineageTracker::new().analyze_source(Path::new("t.js"), source).unwrap()
    }

    #[test]
    fn test_render_text_groups_by_declaration() {
        let text = render_text(&graph("let x = 1;\nfunction f() { return x; }\nx;"), &ReportOptions::default());
        let expected = "\
x (block-scoped) declared in global at 1:5
  referenced at 2:23 in f (1 hop)
  referenced at 3:1 in global (0 hops)
f (function-hoisted) declared in global at 2:10
  (no references)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_text_member_and_diagnostics() {
        let source = "class C { m() { this.v = y; return this.v; } }";
        let text = render_text(&graph(source), &ReportOptions::default());
        assert!(text.contains("v (class-member) declared in C at 1:17"));
        assert!(text.contains("referenced at 1:36 in C::m (1 hop, via member)"));
        assert!(text.contains("Diagnostics:\n  hint 1:26: unresolved reference to `y`"));

        let quiet = ReportOptions {
            show_unresolved: false,
            ..ReportOptions::default()
        };
        assert!(!render_text(&graph(source), &quiet).contains("Diagnostics"));
    }

    #[test]
    fn test_render_text_name_filter() {
        let options = ReportOptions {
            name: Some("b".to_string()),
            ..ReportOptions::default()
        };
        let text = render_text(&graph("var a = 1; var b = a; b; c;"), &options);
        assert!(text.starts_with("b (function-scoped)"));
        assert!(!text.contains("a (function-scoped)"));
        assert!(!text.contains("`c`"));
    }

    #[test]
    fn test_render_text_redeclarations() {
        let text = render_text(&graph("var r; var r;"), &ReportOptions::default());
        assert_eq!(text, "r (function-scoped) declared in global at 1:5\n  also declared at 1:12\n  (no references)\n");
    }

    #[test]
    fn test_render_scopes() {
        let tree = render_scopes(&graph("let a; function f(p) { { let b; } }"));
        assert_eq!(tree, "#0 global [a, f]\n  #1 function f [p]\n    #2 block [b]\n");
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&graph("let a = 1; a;")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["declarations"][0]["name"], "a");
        assert_eq!(value["declarations"][0]["kind"], "block-scoped");
        assert_eq!(value["edges"][0]["path"], "lexical");
        assert!(value.get("edge_by_reference").is_none());
    }
}
