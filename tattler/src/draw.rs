//! Graphviz DOT rendering of flow graphs.
//!
//! Emits plain DOT text, with no graphviz binding behind it: an `initial`
//! point node into the root, one labeled node per graph node, every edge
//! with its letter, and a `final` point node collecting the exits. Nodes
//! render in registration order, so the output is stable enough to
//! snapshot.

use std::fmt::Display;

use tree_sitter::Node;

use crate::cfa::Cfa;
use crate::locate::LocalizedNode;
use crate::syntax;

/// How a payload renders inside its DOT node box.
pub trait DotLabel {
    /// Multi-line label text; `to_dot` escapes it.
    fn dot_label(&self, source: &str) -> String;
}

impl DotLabel for Node<'_> {
    fn dot_label(&self, source: &str) -> String {
        let start = self.start_position();
        let end = self.end_position();
        // Colons collide with DOT port syntax; strip them from the
        // snippet.
        let snippet = syntax::text(*self, source).replace(':', "");
        format!(
            "Ln. {}-{}, Col. {}-{}\n\"{}\"",
            start.row, end.row, start.column, end.column, snippet
        )
    }
}

impl DotLabel for LocalizedNode<'_> {
    fn dot_label(&self, source: &str) -> String {
        let location = self.location.as_deref().unwrap_or("?");
        format!("BB loc. {}\n{}", location, self.syntax.dot_label(source))
    }
}

fn escape(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for ch in label.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn edge_line(dot: &mut String, source: impl Display, destination: impl Display, label: Option<&str>) {
    match label {
        Some(label) => {
            dot.push_str(&format!("    {source} -> {destination} [label=\"{label}\"];\n"));
        }
        None => dot.push_str(&format!("    {source} -> {destination};\n")),
    }
}

/// Renders `cfa` as a DOT digraph called `name` (which must be a plain
/// DOT identifier).
#[must_use]
pub fn to_dot<N: DotLabel>(cfa: &Cfa<N>, source: &str, name: &str) -> String {
    let mut dot = String::new();
    dot.push_str(&format!("digraph {name} {{\n"));

    dot.push_str("    initial [shape=point];\n");
    // An empty unit finalizes to a rootless graph; it still renders, as
    // the two points with nothing between them.
    if cfa.contains(cfa.root()) {
        edge_line(&mut dot, "initial", cfa.root(), None);
    }

    dot.push_str("    final [shape=point];\n");
    for (id, label) in cfa.finals() {
        edge_line(&mut dot, id, "final", label.map(|label| label.letter()));
    }

    for (id, payload) in cfa.nodes() {
        dot.push_str(&format!(
            "    {id} [label=\"{}\"];\n",
            escape(&payload.dot_label(source))
        ));
        for edge in cfa.outgoing_edges(id) {
            edge_line(
                &mut dot,
                edge.source,
                edge.destination,
                edge.label.map(|label| label.letter()),
            );
        }
    }

    dot.push_str("}\n");
    dot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .expect("Should load C grammar");
        parser.parse(source, None).expect("Should parse")
    }

    #[test]
    fn test_dot_of_a_single_statement() {
        let source = "a = 1;";
        let tree = parse(source);
        let cfa = Cfa::from_syntax(tree.root_node(), source).expect("Should build");

        let dot = to_dot(&cfa, source, "cfa");
        insta::assert_snapshot!(dot, @r#"
        digraph cfa {
            initial [shape=point];
            initial -> n0;
            final [shape=point];
            n0 -> final;
            n0 [label="Ln. 0-0, Col. 0-6\n\"a = 1;\""];
        }
        "#);
    }

    #[test]
    fn test_dot_marks_branch_edges_with_letters() {
        let source = "while(a) { }";
        let tree = parse(source);
        let cfa = Cfa::from_syntax(tree.root_node(), source).expect("Should build");

        let dot = to_dot(&cfa, source, "flow");
        insta::assert_snapshot!(dot, @r#"
        digraph flow {
            initial [shape=point];
            initial -> n0;
            final [shape=point];
            n0 -> final [label="F"];
            n0 [label="Ln. 0-0, Col. 5-8\n\"(a)\""];
            n0 -> n3 [label="T"];
            n3 [label="Ln. 0-0, Col. 9-12\n\"{ }\""];
            n3 -> n0;
        }
        "#);
    }

    #[test]
    fn test_dot_of_a_localized_graph_carries_locations() {
        let source = "TATTLE_LOCATION(0);a = 1;";
        let tree = parse(source);
        let cfa = Cfa::from_syntax(tree.root_node(), source).expect("Should build");
        let localized =
            crate::locate::localize(&cfa, source, &crate::probes::ProbeDialect::default());

        let dot = to_dot(&localized, source, "located");
        insta::assert_snapshot!(dot, @r#"
        digraph located {
            initial [shape=point];
            initial -> n0;
            final [shape=point];
            n2 -> final;
            n0 [label="BB loc. 0\nLn. 0-0, Col. 0-19\n\"TATTLE_LOCATION(0);\""];
            n0 -> n2;
            n2 [label="BB loc. 0\nLn. 0-0, Col. 19-25\n\"a = 1;\""];
        }
        "#);
    }

    #[test]
    fn test_quotes_and_colons_are_sanitized() {
        let source = "SUM: x = \"a\";";
        let tree = parse(source);
        let cfa = Cfa::from_syntax(tree.root_node(), source).expect("Should build");

        let dot = to_dot(&cfa, source, "cfa");
        assert!(dot.contains("SUM x = \\\"a\\\";"));
        assert!(!dot.contains("SUM:"));
    }
}
