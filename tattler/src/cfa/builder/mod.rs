//! Statement-walk construction of control flow automata.
//!
//! The builder keeps a cursor into the graph while it walks the statement
//! tree. Control constructs wire edges to placeholder nodes for locations
//! whose statement has not been reached yet (join points, loop exits); the
//! cursor anchors a placeholder in place when flow arrives there. See
//! [`Draft`] for the two node states.

mod visits;

use compact_str::CompactString;
use smallvec::SmallVec;
use tree_sitter::Node;

use super::{Cfa, Draft, EdgeLabel, NodeId};
use crate::error::BuildError;

/// One breakable region, innermost last.
struct Frame {
    /// Where `continue` lands. A switch frame has no target of its own.
    continue_target: Option<NodeId>,
    /// Where `break` lands.
    break_target: NodeId,
}

/// Grows a [`Cfa`] of draft nodes while walking a statement tree.
pub(super) struct CfaBuilder<'tree, 'src> {
    cfa: Cfa<Draft<'tree>>,
    /// The node flow currently falls out of.
    current: NodeId,
    /// Stack of (continue target, break target) regions.
    frames: SmallVec<[Frame; 4]>,
    /// Labels seen so far, by name.
    labels: Vec<(NodeId, CompactString)>,
    /// Gotos seen so far, by target name; forward gotos wait here.
    gotos: Vec<(NodeId, CompactString)>,
    source: &'src str,
}

impl<'tree, 'src> CfaBuilder<'tree, 'src> {
    pub(super) fn new(source: &'src str) -> Self {
        let cfa = Cfa::new(Draft::Pending);
        let current = cfa.root();
        CfaBuilder {
            cfa,
            current,
            frames: SmallVec::new(),
            labels: Vec::new(),
            gotos: Vec::new(),
            source,
        }
    }

    /// Walks `root` and finalizes: every slot still pending afterwards
    /// (the cursor past the last statement, a loop exit reached only by
    /// break edges) promotes its ingoing edge sources to additional
    /// finals (labels kept) and is removed, so the finished graph is
    /// placeholder-free.
    pub(super) fn build(mut self, root: Node<'tree>) -> Result<Cfa<Node<'tree>>, BuildError> {
        self.accept(root)?;
        let unanchored: Vec<NodeId> = self
            .cfa
            .nodes()
            .filter(|(_, draft)| draft.is_pending())
            .map(|(id, _)| id)
            .collect();
        for id in unanchored {
            let promoted = self.cfa.ingoing_edges(id).to_vec();
            for edge in promoted {
                self.cfa.add_final(edge.source, edge.label);
            }
            self.cfa.remove(id);
        }
        self.cfa
            .try_map(|draft| draft.anchor().ok_or(BuildError::Unanchored))
    }

    fn is_pending(&self, id: NodeId) -> bool {
        self.cfa.node(id).is_some_and(|draft| draft.is_pending())
    }

    /// Moves the cursor onto `next`: a pending cursor absorbs `next`'s
    /// anchor in place (its identity and wired edges survive), an anchored
    /// cursor grows a plain edge. Returns the node the cursor rests on.
    fn advance(&mut self, next: NodeId) -> NodeId {
        if self.is_pending(self.current) {
            let incoming = self.cfa.node(next).copied();
            if let Some(draft) = incoming {
                if let Some(payload) = self.cfa.node_mut(self.current) {
                    *payload = draft;
                }
            }
            self.current
        } else {
            self.branch_to(self.current, next, None)
        }
    }

    /// Adds the edge and rests the cursor on `destination`.
    fn branch_to(
        &mut self,
        source: NodeId,
        destination: NodeId,
        label: Option<EdgeLabel>,
    ) -> NodeId {
        self.cfa.branch(source, destination, label);
        self.current = destination;
        destination
    }

    fn anchored(&mut self, node: Node<'tree>) -> NodeId {
        self.cfa.allocate(Draft::Anchored(node))
    }

    fn pending(&mut self) -> NodeId {
        self.cfa.allocate(Draft::Pending)
    }

    fn text(&self, node: Node<'_>) -> &'src str {
        crate::syntax::text(node, self.source)
    }

    /// Registers a label statement and resolves every waiting goto naming
    /// it. The cursor is restored around the edge creation.
    fn note_label(&mut self, name: &str, label_stmt: NodeId) {
        self.labels.push((label_stmt, CompactString::from(name)));
        let saved = self.current;
        let waiting: SmallVec<[NodeId; 2]> = self
            .gotos
            .iter()
            .filter(|(_, goto_name)| goto_name.as_str() == name)
            .map(|&(id, _)| id)
            .collect();
        for goto_stmt in waiting {
            self.branch_to(goto_stmt, label_stmt, Some(EdgeLabel::Goto));
        }
        self.current = saved;
    }

    /// Records a goto and wires it to every already-seen matching label.
    /// The cursor is restored around the edge creation.
    fn note_goto(&mut self, name: &str, goto_stmt: NodeId) {
        self.gotos.push((goto_stmt, CompactString::from(name)));
        let saved = self.current;
        let seen: SmallVec<[NodeId; 2]> = self
            .labels
            .iter()
            .filter(|(_, label_name)| label_name.as_str() == name)
            .map(|&(id, _)| id)
            .collect();
        for label_stmt in seen {
            self.branch_to(goto_stmt, label_stmt, Some(EdgeLabel::Goto));
        }
        self.current = saved;
    }

    /// Edge to the innermost break target. Without an enclosing breakable
    /// region the statement stays edgeless.
    fn wire_break(&mut self, source: NodeId) {
        if let Some(frame) = self.frames.last() {
            let target = frame.break_target;
            self.branch_to(source, target, Some(EdgeLabel::Break));
        }
    }

    /// Edge to the innermost frame's continue target. A switch frame
    /// carries none, so a continue directly under one wires nothing.
    fn wire_continue(&mut self, source: NodeId) {
        if let Some(target) = self.frames.last().and_then(|frame| frame.continue_target) {
            self.branch_to(source, target, Some(EdgeLabel::Continue));
        }
    }
}

impl<'tree> Cfa<Node<'tree>> {
    /// Builds the control flow automaton of a statement subtree, usually a
    /// whole `translation_unit` or one function body.
    ///
    /// # Errors
    ///
    /// [`BuildError::Structural`] when a construct lacks a field its
    /// grammar guarantees, which indicates a malformed parse.
    pub fn from_syntax(root: Node<'tree>, source: &str) -> Result<Self, BuildError> {
        CfaBuilder::new(source).build(root)
    }
}
