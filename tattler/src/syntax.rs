//! Thin classification layer over `tree-sitter-c` nodes.
//!
//! Everything downstream (graph construction, site discovery, probe
//! planning) works in terms of [`NodeKind`] and the field accessors here
//! instead of raw grammar kind strings, so grammar spelling lives in one
//! place.

use tree_sitter::Node;

/// Statement-level categories of the C grammar the pipeline cares about.
///
/// Anything else (comments, preprocessor directives, expressions reached
/// outside statement position) maps to [`NodeKind::Other`] and flows
/// through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `translation_unit`, the tree root.
    TranslationUnit,
    /// `function_definition`.
    FunctionDefinition,
    /// `compound_statement`, a `{ ... }` block.
    Compound,
    /// `expression_statement`.
    Expression,
    /// `declaration`.
    Declaration,
    /// `if_statement`.
    If,
    /// `while_statement`.
    While,
    /// `do_statement`.
    Do,
    /// `for_statement`.
    For,
    /// `switch_statement`.
    Switch,
    /// `case_statement`, one arm of a switch body.
    Case,
    /// `break_statement`.
    Break,
    /// `continue_statement`.
    Continue,
    /// `return_statement`.
    Return,
    /// `labeled_statement`.
    Labeled,
    /// `goto_statement`.
    Goto,
    /// `else_clause`, the grammar wrapper around an else arm.
    ElseClause,
    /// `comment`.
    Comment,
    /// Any node kind without flow-graph relevance.
    Other,
}

impl NodeKind {
    /// Classifies a raw grammar node.
    #[must_use]
    pub fn of(node: Node<'_>) -> Self {
        match node.kind() {
            "translation_unit" => NodeKind::TranslationUnit,
            "function_definition" => NodeKind::FunctionDefinition,
            "compound_statement" => NodeKind::Compound,
            "expression_statement" => NodeKind::Expression,
            "declaration" => NodeKind::Declaration,
            "if_statement" => NodeKind::If,
            "while_statement" => NodeKind::While,
            "do_statement" => NodeKind::Do,
            "for_statement" => NodeKind::For,
            "switch_statement" => NodeKind::Switch,
            "case_statement" => NodeKind::Case,
            "break_statement" => NodeKind::Break,
            "continue_statement" => NodeKind::Continue,
            "return_statement" => NodeKind::Return,
            "labeled_statement" => NodeKind::Labeled,
            "goto_statement" => NodeKind::Goto,
            "else_clause" => NodeKind::ElseClause,
            "comment" => NodeKind::Comment,
            _ => NodeKind::Other,
        }
    }
}

/// Control structures that own conditions or bodies.
pub const STRUCTURES: [NodeKind; 6] = [
    NodeKind::If,
    NodeKind::While,
    NodeKind::Do,
    NodeKind::For,
    NodeKind::Switch,
    NodeKind::FunctionDefinition,
];

/// Named children of `node`, in source order.
pub fn named_children<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    (0..node.named_child_count()).filter_map(move |i| node.named_child(u32::try_from(i).ok()?))
}

/// Source text of `node`. Empty on byte ranges that are not valid UTF-8.
#[must_use]
pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// `condition` field of a control structure.
#[must_use]
pub fn condition<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("condition")
}

/// `consequence` field of an `if_statement`.
#[must_use]
pub fn consequence<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("consequence")
}

/// Statement carried by the else arm of an `if_statement`.
///
/// The grammar wraps the arm in an `else_clause` node; callers always want
/// the statement inside it (a compound, another `if_statement`, or a single
/// statement), so the wrapper is unwrapped here.
#[must_use]
pub fn else_body<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let clause = node.child_by_field_name("alternative")?;
    if NodeKind::of(clause) == NodeKind::ElseClause {
        clause.named_child(0)
    } else {
        Some(clause)
    }
}

/// `body` field of a loop, switch or function definition.
#[must_use]
pub fn body<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("body")
}

/// `initializer` field of a `for_statement`.
#[must_use]
pub fn for_initializer<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("initializer")
}

/// `condition` field of a `for_statement`.
#[must_use]
pub fn for_condition<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("condition")
}

/// `update` field of a `for_statement`.
#[must_use]
pub fn for_update<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("update")
}

/// Body statement of a `for_statement`: the `body` field when the grammar
/// provides it, otherwise the last named child.
#[must_use]
pub fn for_body<'t>(node: Node<'t>) -> Option<Node<'t>> {
    body(node).or_else(|| {
        let count = node.named_child_count();
        if count == 0 {
            None
        } else {
            node.named_child(u32::try_from(count - 1).ok()?)
        }
    })
}

/// `label` field of a `labeled_statement` or `goto_statement`.
#[must_use]
pub fn label<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("label")
}

/// `value` field of a `case_statement`. `None` for `default:` arms.
#[must_use]
pub fn case_value<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("value")
}

/// Whether a `case_statement` is a `default:` arm.
#[must_use]
pub fn is_default_case(node: Node<'_>) -> bool {
    case_value(node).is_none()
}

/// Whether a `case_statement` carries no statements of its own.
#[must_use]
pub fn is_empty_case(node: Node<'_>) -> bool {
    if is_default_case(node) {
        node.named_child_count() < 1
    } else {
        // The value expression is itself a named child.
        node.named_child_count() == 1
    }
}

/// Whether `node` is the value expression of a `case_statement`.
#[must_use]
pub fn is_case_value(node: Node<'_>) -> bool {
    node.parent().is_some_and(|parent| {
        NodeKind::of(parent) == NodeKind::Case && case_value(parent) == Some(node)
    })
}

/// Whether the else arm of `node` is another `if_statement` (an
/// `else if` chain link rather than a terminal else block).
#[must_use]
pub fn has_else_if(node: Node<'_>) -> bool {
    else_body(node).is_some_and(|alt| NodeKind::of(alt) == NodeKind::If)
}

/// Nearest ancestor whose kind is in `kinds`, however deep.
#[must_use]
pub fn ancestor_of_kinds<'t>(node: Node<'t>, kinds: &[NodeKind]) -> Option<Node<'t>> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if kinds.contains(&NodeKind::of(parent)) {
            return Some(parent);
        }
        current = parent;
    }
    None
}

/// Nearest ancestor whose kind is in `kinds`, reachable by only ever being
/// the first named child of the intermediate nodes.
///
/// The kind test runs before the first-child test on each link, so the
/// matching ancestor itself does not need `node`'s chain to be its first
/// named child.
#[must_use]
pub fn leading_ancestor_of_kinds<'t>(node: Node<'t>, kinds: &[NodeKind]) -> Option<Node<'t>> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if kinds.contains(&NodeKind::of(parent)) {
            return Some(parent);
        }
        if parent.named_child(0) != Some(current) {
            return None;
        }
        current = parent;
    }
    None
}

/// Whether `node` sits on the leading statement chain of `target`: every
/// link up to and including the one into `target` goes through a first
/// named child.
#[must_use]
pub fn on_leading_chain_of(node: Node<'_>, target: Node<'_>) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if parent.named_child(0) != Some(current) {
            return false;
        }
        if parent == target {
            return true;
        }
        current = parent;
    }
    false
}

/// The `function_definition` whose body `node` leads, if any.
///
/// A statement leads a function body when the chain from the statement up
/// to the definition runs through first named children, except that the
/// final link must land on the definition's `body` field. On a kind match
/// with the wrong field the walk keeps ascending without the first-child
/// requirement for that link.
#[must_use]
pub fn leading_function_definition<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if NodeKind::of(parent) == NodeKind::FunctionDefinition {
            let body = body(parent)?;
            if body == current {
                return Some(parent);
            }
        } else if parent.named_child(0) != Some(current) {
            return None;
        }
        current = parent;
    }
    None
}

/// Nearest enclosing control structure, however deep.
#[must_use]
pub fn nearest_structure<'t>(node: Node<'t>) -> Option<Node<'t>> {
    ancestor_of_kinds(node, &STRUCTURES)
}

/// Whether `node` fills `field` of its nearest enclosing structure and that
/// structure has kind `kind`.
#[must_use]
pub fn is_field_of(node: Node<'_>, kind: NodeKind, field: &str) -> bool {
    let Some(structure) = nearest_structure(node) else {
        return false;
    };
    NodeKind::of(structure) == kind && structure.child_by_field_name(field) == Some(node)
}

/// Whether `node` is the condition of an enclosing structure of kind `kind`.
#[must_use]
pub fn is_condition_of(node: Node<'_>, kind: NodeKind) -> bool {
    is_field_of(node, kind, "condition")
}

/// Whether `node` is (or leads) the body of an enclosing `for_statement`.
///
/// The loop body carries no dedicated flow node of its own, so membership
/// is judged by the leading chain into the loop's body statement.
#[must_use]
pub fn is_body_of_for(node: Node<'_>) -> bool {
    let Some(for_stmt) = leading_ancestor_of_kinds(node, &[NodeKind::For]) else {
        return false;
    };
    let Some(for_body) = for_body(for_stmt) else {
        return false;
    };
    for_body == node || on_leading_chain_of(node, for_body)
}
