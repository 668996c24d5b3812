//! Following recorded location sequences through a localized flow graph.
//!
//! A run of an instrumented program emits the ids of the probes it
//! passed. Mapping such a sequence back onto graph nodes recovers the
//! path the execution took, including the nodes between two probes that
//! share a location id.

use rustc_hash::FxHashSet;

use crate::cfa::NodeId;
use crate::locate::LocalizedCfa;

fn location_of<'a>(cfa: &'a LocalizedCfa<'_>, id: NodeId) -> Option<&'a str> {
    cfa.node(id).and_then(|payload| payload.location.as_deref())
}

/// Walks `cfa` from the root along a recorded sequence of location ids,
/// yielding the nodes the execution passed through, in order.
///
/// For each recorded id the walk first steps onto an outgoing neighbor
/// carrying it (when the current node does not), then runs along
/// same-location nodes, stopping early as soon as the *following*
/// recorded id shows up on an outgoing edge. An id with no matching
/// neighbor contributes no nodes; the walk picks up again at the next id.
#[must_use]
pub fn follow(cfa: &LocalizedCfa<'_>, locations: &[&str]) -> Vec<NodeId> {
    let mut visited = Vec::new();
    let mut current = cfa.root();
    for (index, &location) in locations.iter().enumerate() {
        let next_location = locations.get(index + 1).copied();
        if location_of(cfa, current) != Some(location) {
            for edge in cfa.outgoing_edges(current) {
                if location_of(cfa, edge.destination) == Some(location) {
                    current = edge.destination;
                }
            }
        }
        current = run_location(cfa, location, current, next_location, &mut visited);
    }
    visited
}

/// Runs along nodes carrying `location`, starting at `start`, pushing
/// every node passed. Returns the last node pushed, or `start` untouched
/// when it does not carry `location` at all.
fn run_location(
    cfa: &LocalizedCfa<'_>,
    location: &str,
    start: NodeId,
    next_location: Option<&str>,
    visited: &mut Vec<NodeId>,
) -> NodeId {
    if location_of(cfa, start) != Some(location) {
        return start;
    }
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let mut current = start;
    loop {
        visited.push(current);
        seen.insert(current);

        let mut advanced = false;
        let mut next = current;
        for edge in cfa.outgoing_edges(current) {
            let destination = location_of(cfa, edge.destination);
            if next_location.is_some() && destination == next_location {
                // The following recorded id is one step away; this run
                // ends here no matter what the earlier edges offered.
                advanced = false;
                break;
            } else if destination == Some(location) {
                next = edge.destination;
                advanced = true;
            }
        }
        // The seen set cuts same-location cycles, which otherwise would
        // replay the identical edge scan forever.
        if !advanced || seen.contains(&next) {
            return current;
        }
        current = next;
    }
}

/// Cuts a recorded sequence at every final node's location.
///
/// Each cut ends with the final's id; a trailing run that never reaches
/// a final is dropped. Useful for separating the executions of a unit
/// that was entered several times within one recording.
#[must_use]
pub fn split_on_finals<'s>(cfa: &LocalizedCfa<'_>, locations: &[&'s str]) -> Vec<Vec<&'s str>> {
    let final_locations: Vec<Option<&str>> = cfa
        .finals()
        .iter()
        .map(|&(id, _)| location_of(cfa, id))
        .collect();

    let mut runs = Vec::new();
    let mut run: Vec<&'s str> = Vec::new();
    for &location in locations {
        run.push(location);
        if final_locations.contains(&Some(location)) {
            runs.push(std::mem::take(&mut run));
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfa::Cfa;
    use crate::locate::localize;
    use crate::probes::ProbeDialect;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .expect("Should load C grammar");
        parser.parse(source, None).expect("Should parse")
    }

    // The instrumented form of `if(a) { } else { }` with a trailing
    // statement; node order is leading probe, condition, true-arm probe,
    // trailing probe, false-arm probe.
    const IF_ELSE: &str = "TATTLE_LOCATION(0);if(a) {TATTLE_LOCATION(2); } \
                           else {TATTLE_LOCATION(3); }TATTLE_LOCATION(1);";

    #[test]
    fn test_follow_walks_the_true_arm() {
        let tree = parse(IF_ELSE);
        let cfa = Cfa::from_syntax(tree.root_node(), IF_ELSE).expect("Should build");
        let localized = localize(&cfa, IF_ELSE, &ProbeDialect::default());
        let ids: Vec<NodeId> = localized.nodes().map(|(id, _)| id).collect();

        let walk = follow(&localized, &["0", "2", "1"]);
        assert_eq!(walk, vec![ids[0], ids[1], ids[2], ids[3]]);
    }

    #[test]
    fn test_follow_walks_the_false_arm() {
        let tree = parse(IF_ELSE);
        let cfa = Cfa::from_syntax(tree.root_node(), IF_ELSE).expect("Should build");
        let localized = localize(&cfa, IF_ELSE, &ProbeDialect::default());
        let ids: Vec<NodeId> = localized.nodes().map(|(id, _)| id).collect();

        let walk = follow(&localized, &["0", "3", "1"]);
        assert_eq!(walk, vec![ids[0], ids[1], ids[4], ids[3]]);
    }

    #[test]
    fn test_follow_runs_along_shared_locations() {
        let source = "TATTLE_LOCATION(0);while(a) {TATTLE_LOCATION(1); }TATTLE_LOCATION(2);";
        let tree = parse(source);
        let cfa = Cfa::from_syntax(tree.root_node(), source).expect("Should build");
        let localized = localize(&cfa, source, &ProbeDialect::default());
        let ids: Vec<NodeId> = localized.nodes().map(|(id, _)| id).collect();

        // A single "0" covers both the leading probe and the condition,
        // which inherited its id.
        let walk = follow(&localized, &["0"]);
        assert_eq!(walk, vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_follow_stops_a_run_before_the_next_location() {
        let source = "TATTLE_LOCATION(0);while(a) {TATTLE_LOCATION(1); }TATTLE_LOCATION(2);";
        let tree = parse(source);
        let cfa = Cfa::from_syntax(tree.root_node(), source).expect("Should build");
        let localized = localize(&cfa, source, &ProbeDialect::default());
        let ids: Vec<NodeId> = localized.nodes().map(|(id, _)| id).collect();

        // With "1" recorded next, the "0" run must not slide onto the
        // condition's body edge prematurely; it still covers root and
        // condition, then the body probe matches "1".
        let walk = follow(&localized, &["0", "1"]);
        assert_eq!(walk, vec![ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_unmatched_locations_contribute_nothing() {
        let tree = parse(IF_ELSE);
        let cfa = Cfa::from_syntax(tree.root_node(), IF_ELSE).expect("Should build");
        let localized = localize(&cfa, IF_ELSE, &ProbeDialect::default());
        let ids: Vec<NodeId> = localized.nodes().map(|(id, _)| id).collect();

        let walk = follow(&localized, &["0", "9", "2"]);
        assert_eq!(walk, vec![ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_split_on_finals_cuts_after_each_exit() {
        let tree = parse(IF_ELSE);
        let cfa = Cfa::from_syntax(tree.root_node(), IF_ELSE).expect("Should build");
        let localized = localize(&cfa, IF_ELSE, &ProbeDialect::default());

        let runs = split_on_finals(&localized, &["0", "2", "1", "0", "3", "1"]);
        assert_eq!(runs, vec![vec!["0", "2", "1"], vec!["0", "3", "1"]]);
    }

    #[test]
    fn test_split_drops_a_trailing_partial_run() {
        let tree = parse(IF_ELSE);
        let cfa = Cfa::from_syntax(tree.root_node(), IF_ELSE).expect("Should build");
        let localized = localize(&cfa, IF_ELSE, &ProbeDialect::default());

        let runs = split_on_finals(&localized, &["0", "2", "1", "0", "3"]);
        assert_eq!(runs, vec![vec!["0", "2", "1"]]);
    }
}
