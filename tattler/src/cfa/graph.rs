use std::collections::VecDeque;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Handle to a node owned by a [`Cfa`].
///
/// Handles stay valid across node removal; resolving a removed handle
/// simply yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Label carried by a conditional or jump edge.
///
/// `Continue` and `Case` render with the same letter; they stay distinct
/// values so matching on them never conflates loop re-entry with switch
/// dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    /// Condition held.
    True,
    /// Condition failed.
    False,
    /// `break` out of the innermost loop or switch.
    Break,
    /// `continue` back to the innermost loop head.
    Continue,
    /// `goto` to a label.
    Goto,
    /// Switch dispatch onto a `case` value.
    Case,
    /// Switch dispatch onto the `default` arm.
    Default,
}

impl EdgeLabel {
    /// One-letter rendering used in DOT output and final markers.
    #[must_use]
    pub fn letter(self) -> &'static str {
        match self {
            EdgeLabel::True => "T",
            EdgeLabel::False => "F",
            EdgeLabel::Break => "B",
            EdgeLabel::Continue | EdgeLabel::Case => "C",
            EdgeLabel::Goto => "G",
            EdgeLabel::Default => "D",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// A directed edge between two registered nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Origin node.
    pub source: NodeId,
    /// Target node.
    pub destination: NodeId,
    /// `None` for plain fallthrough flow.
    pub label: Option<EdgeLabel>,
}

#[derive(Debug)]
struct Slot<N> {
    payload: N,
    registered: bool,
}

type EdgeList = SmallVec<[Edge; 2]>;

/// A control flow automaton over payloads of type `N`.
///
/// Nodes are allocated first and only *registered* (made part of the graph)
/// once an edge touches them; the root is registered at construction.
/// Iteration order is registration order, which downstream passes rely on.
#[derive(Debug)]
pub struct Cfa<N> {
    slots: Vec<Option<Slot<N>>>,
    order: Vec<NodeId>,
    root: NodeId,
    outgoing: FxHashMap<NodeId, EdgeList>,
    ingoing: FxHashMap<NodeId, EdgeList>,
    additional_finals: Vec<(NodeId, Option<EdgeLabel>)>,
}

impl<N> Cfa<N> {
    /// Creates a graph whose root node carries `root` and is already
    /// registered.
    pub fn new(root: N) -> Self {
        let mut cfa = Cfa {
            slots: Vec::new(),
            order: Vec::new(),
            root: NodeId(0),
            outgoing: FxHashMap::default(),
            ingoing: FxHashMap::default(),
            additional_finals: Vec::new(),
        };
        let id = cfa.allocate(root);
        cfa.root = id;
        cfa.register(id);
        cfa
    }

    /// The root handle. May refer to a removed node after finalization of
    /// an empty unit.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocates a node outside the graph. It joins the graph (and the
    /// iteration order) at the first [`Cfa::branch`] that touches it.
    pub fn allocate(&mut self, payload: N) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Slot {
            payload,
            registered: false,
        }));
        id
    }

    /// Whether `id` is currently part of the graph.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some_and(|slot| slot.registered)
    }

    /// Payload of `id`, registered or not. `None` once the node has been
    /// dropped from the graph's slot table.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&N> {
        self.slot(id).map(|slot| &slot.payload)
    }

    /// Mutable payload access, same resolution rules as [`Cfa::node`].
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .map(|slot| &mut slot.payload)
    }

    /// Registered nodes with their payloads, in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> {
        self.order
            .iter()
            .filter_map(move |&id| self.node(id).map(|payload| (id, payload)))
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Adds an edge, registering either endpoint that is not yet part of
    /// the graph. Appends unconditionally: parallel duplicates are legal.
    pub fn branch(&mut self, source: NodeId, destination: NodeId, label: Option<EdgeLabel>) {
        self.register(source);
        self.register(destination);
        let edge = Edge {
            source,
            destination,
            label,
        };
        self.outgoing.entry(source).or_default().push(edge);
        self.ingoing.entry(destination).or_default().push(edge);
    }

    /// Outgoing edges of `id` in insertion order. Empty for nodes outside
    /// the graph.
    #[must_use]
    pub fn outgoing_edges(&self, id: NodeId) -> &[Edge] {
        self.outgoing.get(&id).map_or(&[], |edges| edges.as_slice())
    }

    /// Ingoing edges of `id` in insertion order.
    #[must_use]
    pub fn ingoing_edges(&self, id: NodeId) -> &[Edge] {
        self.ingoing.get(&id).map_or(&[], |edges| edges.as_slice())
    }

    /// Destinations of the outgoing edges of `id`, duplicates preserved.
    #[must_use]
    pub fn outgoing(&self, id: NodeId) -> Vec<NodeId> {
        self.outgoing_edges(id)
            .iter()
            .map(|edge| edge.destination)
            .collect()
    }

    /// Sources of the ingoing edges of `id`, duplicates preserved.
    #[must_use]
    pub fn ingoing(&self, id: NodeId) -> Vec<NodeId> {
        self.ingoing_edges(id)
            .iter()
            .map(|edge| edge.source)
            .collect()
    }

    /// Marks a registered node as an additional final under `label`.
    ///
    /// Returns `false` (and records nothing) when `id` is not part of the
    /// graph.
    pub fn add_final(&mut self, id: NodeId, label: Option<EdgeLabel>) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.additional_finals.push((id, label));
        true
    }

    /// Exit points of the graph: every registered node without outgoing
    /// edges (unlabeled), in registration order, followed by the additional
    /// finals. The same (node, label) pair is never reported twice; the
    /// same node may appear under distinct labels.
    #[must_use]
    pub fn finals(&self) -> Vec<(NodeId, Option<EdgeLabel>)> {
        let mut finals: Vec<(NodeId, Option<EdgeLabel>)> = self
            .nodes()
            .filter(|&(id, _)| self.outgoing_edges(id).is_empty())
            .map(|(id, _)| (id, None))
            .collect();
        for &entry in &self.additional_finals {
            if !finals.contains(&entry) {
                finals.push(entry);
            }
        }
        finals
    }

    /// Drops `id` from the graph, splicing flow around it: every (ingoing,
    /// outgoing) pair not touching `id` itself becomes an edge from the
    /// ingoing source to the outgoing destination, carrying the ingoing
    /// edge's label. All edges touching `id` disappear, as do its
    /// additional-final entries. No-op for nodes outside the graph.
    pub fn remove(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        let ins = self.ingoing.remove(&id).unwrap_or_default();
        let outs = self.outgoing.remove(&id).unwrap_or_default();
        for ingoing in &ins {
            if ingoing.source == id {
                continue;
            }
            for outgoing in &outs {
                if outgoing.destination == id {
                    continue;
                }
                self.branch(ingoing.source, outgoing.destination, ingoing.label);
            }
        }
        for edge in &ins {
            if edge.source != id {
                if let Some(list) = self.outgoing.get_mut(&edge.source) {
                    remove_first(list, edge);
                }
            }
        }
        for edge in &outs {
            if edge.destination != id {
                if let Some(list) = self.ingoing.get_mut(&edge.destination) {
                    remove_first(list, edge);
                }
            }
        }
        self.order.retain(|&node| node != id);
        self.set_registered(id, false);
        self.additional_finals.retain(|&(node, _)| node != id);
    }

    /// Rewires every edge touching `before` onto `after` and drops `before`
    /// from the graph. When `after` was not yet registered it inherits
    /// `before`'s place in the iteration order; otherwise the merged node
    /// keeps its own place and gains `before`'s edges. Self-loops on
    /// `before` become self-loops on `after`. Additional finals follow the
    /// rewire. No-op when the two handles are equal or `before` is not
    /// part of the graph.
    pub fn replace(&mut self, before: NodeId, after: NodeId) {
        if before == after || !self.contains(before) {
            return;
        }
        let ins = self.ingoing.remove(&before).unwrap_or_default();
        let outs = self.outgoing.remove(&before).unwrap_or_default();
        for edge in &ins {
            if edge.source != before {
                if let Some(list) = self.outgoing.get_mut(&edge.source) {
                    remove_first(list, edge);
                }
            }
        }
        for edge in &outs {
            if edge.destination != before {
                if let Some(list) = self.ingoing.get_mut(&edge.destination) {
                    remove_first(list, edge);
                }
            }
        }
        if self.contains(after) {
            self.order.retain(|&node| node != before);
        } else {
            self.set_registered(after, true);
            for node in &mut self.order {
                if *node == before {
                    *node = after;
                }
            }
        }
        self.set_registered(before, false);
        for edge in ins {
            let source = if edge.source == before {
                after
            } else {
                edge.source
            };
            self.branch(source, after, edge.label);
        }
        for edge in outs {
            if edge.source == before && edge.destination == before {
                // self-loop, already rewired by the ingoing pass
                continue;
            }
            let destination = if edge.destination == before {
                after
            } else {
                edge.destination
            };
            self.branch(after, destination, edge.label);
        }
        if self.root == before {
            self.root = after;
        }
        for entry in &mut self.additional_finals {
            if entry.0 == before {
                entry.0 = after;
            }
        }
    }

    /// Nodes reachable from the root in breadth-first order.
    #[must_use]
    pub fn breadth_first(&self) -> Vec<NodeId> {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let mut traversal = Vec::new();
        if !self.contains(self.root) {
            return traversal;
        }
        visited.insert(self.root);
        queue.push_back(self.root);
        while let Some(id) = queue.pop_front() {
            traversal.push(id);
            for edge in self.outgoing_edges(id) {
                if visited.insert(edge.destination) {
                    queue.push_back(edge.destination);
                }
            }
        }
        traversal
    }

    /// Every simple (cycle-free) path from `from` to `to`.
    #[must_use]
    pub fn all_simple_paths(&self, from: NodeId, to: NodeId) -> Vec<Vec<NodeId>> {
        let mut paths = Vec::new();
        if !self.contains(from) || !self.contains(to) {
            return paths;
        }
        let mut current = vec![from];
        let mut on_path: FxHashSet<NodeId> = FxHashSet::default();
        on_path.insert(from);
        self.extend_paths(to, &mut current, &mut on_path, &mut paths);
        paths
    }

    fn extend_paths(
        &self,
        to: NodeId,
        current: &mut Vec<NodeId>,
        on_path: &mut FxHashSet<NodeId>,
        paths: &mut Vec<Vec<NodeId>>,
    ) {
        let Some(&last) = current.last() else {
            return;
        };
        if last == to {
            paths.push(current.clone());
            return;
        }
        for edge in self.outgoing_edges(last) {
            let next = edge.destination;
            if on_path.contains(&next) {
                continue;
            }
            current.push(next);
            on_path.insert(next);
            self.extend_paths(to, current, on_path, paths);
            current.pop();
            on_path.remove(&next);
        }
    }

    /// Converts every registered payload, keeping handles, order, edges and
    /// finals intact. Allocated-but-never-registered slots are dropped.
    pub(crate) fn try_map<M, E>(self, mut f: impl FnMut(N) -> Result<M, E>) -> Result<Cfa<M>, E> {
        let mut slots = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            match slot {
                Some(slot) if slot.registered => slots.push(Some(Slot {
                    payload: f(slot.payload)?,
                    registered: true,
                })),
                _ => slots.push(None),
            }
        }
        Ok(Cfa {
            slots,
            order: self.order,
            root: self.root,
            outgoing: self.outgoing,
            ingoing: self.ingoing,
            additional_finals: self.additional_finals,
        })
    }

    /// Rebuilds the graph with payloads produced by `f`, keeping handles,
    /// iteration order, edges and the root. Additional finals are not
    /// carried over; the rebuilt graph reports structural finals only.
    pub(crate) fn map_ref<M>(&self, mut f: impl FnMut(&N) -> M) -> Cfa<M> {
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                slot.as_ref().map(|slot| Slot {
                    payload: f(&slot.payload),
                    registered: slot.registered,
                })
            })
            .collect();
        Cfa {
            slots,
            order: self.order.clone(),
            root: self.root,
            outgoing: self.outgoing.clone(),
            ingoing: self.ingoing.clone(),
            additional_finals: Vec::new(),
        }
    }

    fn slot(&self, id: NodeId) -> Option<&Slot<N>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn set_registered(&mut self, id: NodeId, registered: bool) {
        if let Some(slot) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
            slot.registered = registered;
        }
    }

    fn register(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
            if !slot.registered {
                slot.registered = true;
                self.order.push(id);
            }
        }
    }
}

fn remove_first(list: &mut EdgeList, edge: &Edge) {
    if let Some(position) = list.iter().position(|candidate| candidate == edge) {
        list.remove(position);
    }
}
