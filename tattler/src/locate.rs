//! Location propagation over an instrumented flow graph.
//!
//! Once a source is instrumented, every flow point sits next to a probe
//! statement carrying a location id. Localization clones the flow graph
//! with id-annotated payloads: probe nodes are seeded with their own id,
//! ids flood forward along edges (first writer wins), and switch case
//! values take the id of their first successor, since their probe sits
//! after the `case ...:` colon rather than before it.
//!
//! The localized graph mirrors the source graph exactly: same handles,
//! same iteration order, same edges. Additional finals do not carry over,
//! so [`Cfa::finals`] on a localized graph reports structural exits only.

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use tree_sitter::Node;

use crate::cfa::{Cfa, NodeId};
use crate::probes::ProbeDialect;
use crate::syntax;

/// A flow node annotated with the location id of the probe covering it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedNode<'tree> {
    /// The anchored syntax node.
    pub syntax: Node<'tree>,
    /// Location id, `None` until propagation reaches the node.
    pub location: Option<CompactString>,
}

/// A flow graph whose nodes carry location ids.
pub type LocalizedCfa<'tree> = Cfa<LocalizedNode<'tree>>;

/// Localizes `cfa` against the probes present in `source`.
///
/// The result has the same shape as the input; only the payloads differ.
/// Nodes unreachable from the root keep a `None` location unless they are
/// probes themselves.
#[must_use]
pub fn localize<'tree>(
    cfa: &Cfa<Node<'tree>>,
    source: &str,
    dialect: &ProbeDialect,
) -> LocalizedCfa<'tree> {
    let mut localized = cfa.map_ref(|&syntax| LocalizedNode {
        syntax,
        location: None,
    });
    seed_probes(&mut localized, source, dialect);
    flood_locations(&mut localized);
    correct_case_values(&mut localized);
    localized
}

/// Maps every probed location id in `cfa` to the node carrying the probe.
///
/// When two probes render the same id, the one latest in iteration order
/// wins.
#[must_use]
pub fn probe_locations(
    cfa: &LocalizedCfa<'_>,
    source: &str,
    dialect: &ProbeDialect,
) -> FxHashMap<CompactString, NodeId> {
    let mut locations = FxHashMap::default();
    for (id, payload) in cfa.nodes() {
        if let Some(location) = dialect.extract_location(payload.syntax, source) {
            locations.insert(CompactString::from(location), id);
        }
    }
    locations
}

fn seed_probes(cfa: &mut LocalizedCfa<'_>, source: &str, dialect: &ProbeDialect) {
    let seeds: Vec<(NodeId, CompactString)> = cfa
        .nodes()
        .filter_map(|(id, payload)| {
            dialect
                .extract_location(payload.syntax, source)
                .map(|location| (id, CompactString::from(location)))
        })
        .collect();
    for (id, location) in seeds {
        if let Some(payload) = cfa.node_mut(id) {
            payload.location = Some(location);
        }
    }
}

fn flood_locations(cfa: &mut LocalizedCfa<'_>) {
    let mut frontier = vec![cfa.root()];
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    seen.insert(cfa.root());

    while let Some(id) = frontier.pop() {
        let location = cfa.node(id).and_then(|payload| payload.location.clone());
        let edges = cfa.outgoing_edges(id).to_vec();
        for edge in edges {
            if seen.insert(edge.destination) {
                frontier.push(edge.destination);
            }
            if let Some(payload) = cfa.node_mut(edge.destination) {
                if payload.location.is_none() {
                    payload.location = location.clone();
                }
            }
        }
    }
}

fn correct_case_values(cfa: &mut LocalizedCfa<'_>) {
    let case_values: Vec<NodeId> = cfa
        .nodes()
        .filter(|&(_, payload)| syntax::is_case_value(payload.syntax))
        .map(|(id, _)| id)
        .collect();
    for id in case_values {
        let Some(&edge) = cfa.outgoing_edges(id).first() else {
            continue;
        };
        let location = cfa
            .node(edge.destination)
            .and_then(|payload| payload.location.clone());
        if let Some(payload) = cfa.node_mut(id) {
            payload.location = location;
        }
    }
}
