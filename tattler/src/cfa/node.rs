use tree_sitter::Node;

/// Build-time node payload.
///
/// The builder wires edges to nodes whose statement has not been reached
/// yet; such a node is a pending placeholder until the cursor reaches a
/// statement and anchors it in place. Finalization consumes every
/// placeholder, so finished graphs carry bare [`Node`] payloads and the
/// two-state shape never leaks out of the build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Draft<'tree> {
    /// No statement yet; absorbs the next statement the cursor reaches.
    Pending,
    /// Anchored to a concrete statement.
    Anchored(Node<'tree>),
}

impl<'tree> Draft<'tree> {
    /// Whether the node is still a placeholder.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Draft::Pending)
    }

    /// The anchored statement, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<Node<'tree>> {
        match self {
            Draft::Anchored(node) => Some(*node),
            Draft::Pending => None,
        }
    }
}
