//! Site discovery: the syntax anchors a flow graph needs probes on.

use rustc_hash::FxHashSet;
use tree_sitter::Node;

use crate::cfa::Cfa;
use crate::syntax::{self, NodeKind};

/// Maps every flow node onto the statements that must carry probes,
/// deduplicated, in first-seen order.
///
/// Conditions map to their owning `if`/`while`/`do`/`switch` statement,
/// statements in a `for` body map to the loop (the body has no flow node
/// of its own), plain statements map to themselves, and a statement
/// leading a function body additionally maps to the definition. When the
/// graph covers a whole translation unit, the unit anchor comes first so
/// the file prologue probe takes location zero.
#[must_use]
pub fn discover<'tree>(cfa: &Cfa<Node<'tree>>) -> Vec<Node<'tree>> {
    let mut sites: Vec<Node<'tree>> = Vec::new();
    let mut seen: FxHashSet<usize> = FxHashSet::default();
    let mut push = |site: Node<'tree>| {
        if seen.insert(site.id()) {
            sites.push(site);
        }
    };

    if let Some(&root) = cfa.node(cfa.root()) {
        let unit = syntax::leading_ancestor_of_kinds(
            root,
            &[NodeKind::FunctionDefinition, NodeKind::TranslationUnit],
        );
        if let Some(unit) = unit {
            if NodeKind::of(unit) == NodeKind::TranslationUnit {
                push(unit);
            }
        }
    }

    for (_, &node) in cfa.nodes() {
        if syntax::is_condition_of(node, NodeKind::If) {
            push_parent(node, &mut push);
        }
        if syntax::is_condition_of(node, NodeKind::While) {
            push_parent(node, &mut push);
        }
        if syntax::is_condition_of(node, NodeKind::Do) {
            push_parent(node, &mut push);
        }
        if syntax::is_body_of_for(node) {
            if let Some(for_stmt) = syntax::leading_ancestor_of_kinds(node, &[NodeKind::For]) {
                push(for_stmt);
            }
        }
        if syntax::is_condition_of(node, NodeKind::Switch) {
            push_parent(node, &mut push);
        }
        match NodeKind::of(node) {
            NodeKind::Labeled => {
                push(node);
                if let Some(inner) = node.named_child(1) {
                    push(inner);
                }
            }
            NodeKind::Expression | NodeKind::Declaration | NodeKind::Return | NodeKind::Goto => {
                push(node);
            }
            _ => {}
        }
        if syntax::leading_function_definition(node).is_some() {
            if let Some(function) = syntax::ancestor_of_kinds(node, &[NodeKind::FunctionDefinition])
            {
                push(function);
            }
        }
    }

    sites
}

fn push_parent<'tree>(node: Node<'tree>, push: &mut impl FnMut(Node<'tree>)) {
    if let Some(parent) = node.parent() {
        push(parent);
    }
}
