use super::*;

fn chain_of_three() -> (Cfa<&'static str>, NodeId, NodeId, NodeId) {
    let mut cfa = Cfa::new("root");
    let root = cfa.root();
    let n1 = cfa.allocate("n1");
    let n2 = cfa.allocate("n2");
    cfa.branch(root, n1, None);
    cfa.branch(n1, n2, None);
    (cfa, root, n1, n2)
}

#[test]
fn test_outgoing_of_single_edge() {
    let mut cfa = Cfa::new("root");
    let root = cfa.root();
    let n1 = cfa.allocate("n1");
    cfa.branch(root, n1, None);

    assert_eq!(cfa.outgoing(root), vec![n1]);
    assert_eq!(cfa.outgoing_edges(root).len(), 1);
    assert!(cfa.outgoing(n1).is_empty());
}

#[test]
fn test_ingoing_of_single_edge() {
    let mut cfa = Cfa::new("root");
    let root = cfa.root();
    let n1 = cfa.allocate("n1");
    cfa.branch(root, n1, None);

    assert_eq!(cfa.ingoing(n1), vec![root]);
    assert_eq!(cfa.ingoing_edges(n1).len(), 1);
    assert!(cfa.ingoing(root).is_empty());
}

#[test]
fn test_allocation_alone_does_not_register() {
    let mut cfa = Cfa::new("root");
    let loose = cfa.allocate("loose");

    assert!(!cfa.contains(loose));
    assert_eq!(cfa.node_count(), 1);
    assert_eq!(cfa.node(loose), Some(&"loose"), "payload is reachable before registration");

    let root = cfa.root();
    cfa.branch(root, loose, None);
    assert!(cfa.contains(loose));
    assert_eq!(cfa.node_count(), 2);
}

#[test]
fn test_registration_order_is_iteration_order() {
    let mut cfa = Cfa::new("root");
    let root = cfa.root();
    let b = cfa.allocate("b");
    let a = cfa.allocate("a");
    cfa.branch(root, a, None);
    cfa.branch(root, b, None);

    let order: Vec<&str> = cfa.nodes().map(|(_, payload)| *payload).collect();
    assert_eq!(order, vec!["root", "a", "b"]);
}

#[test]
fn test_branch_keeps_parallel_duplicates() {
    let mut cfa = Cfa::new("root");
    let root = cfa.root();
    let n1 = cfa.allocate("n1");
    cfa.branch(root, n1, Some(EdgeLabel::True));
    cfa.branch(root, n1, Some(EdgeLabel::True));

    assert_eq!(cfa.outgoing_edges(root).len(), 2);
    assert_eq!(cfa.ingoing_edges(n1).len(), 2);
}

#[test]
fn test_remove_middle_splices_flow() {
    let (mut cfa, root, n1, n2) = chain_of_three();
    cfa.remove(n1);

    assert_eq!(cfa.outgoing(root), vec![n2]);
    assert_eq!(cfa.ingoing(n2), vec![root]);
    assert!(!cfa.contains(n1));
    assert!(cfa.outgoing_edges(n1).is_empty());
    assert!(cfa.ingoing_edges(n1).is_empty());
    assert_eq!(cfa.node_count(), 2);
}

#[test]
fn test_remove_last_leaves_no_dangling_edges() {
    let (mut cfa, _, n1, n2) = chain_of_three();
    cfa.remove(n2);

    assert!(cfa.outgoing(n1).is_empty());
    assert!(!cfa.contains(n2));
}

#[test]
fn test_remove_center_connects_all_pairs() {
    let mut cfa = Cfa::new("i1");
    let i1 = cfa.root();
    let i2 = cfa.allocate("i2");
    let center = cfa.allocate("center");
    let o1 = cfa.allocate("o1");
    let o2 = cfa.allocate("o2");
    cfa.branch(i1, center, None);
    cfa.branch(i2, center, None);
    cfa.branch(center, o1, None);
    cfa.branch(center, o2, None);

    cfa.remove(center);

    for source in [i1, i2] {
        let mut destinations = cfa.outgoing(source);
        destinations.sort();
        let mut expected = vec![o1, o2];
        expected.sort();
        assert_eq!(destinations, expected);
    }
    for destination in [o1, o2] {
        let mut sources = cfa.ingoing(destination);
        sources.sort();
        let mut expected = vec![i1, i2];
        expected.sort();
        assert_eq!(sources, expected);
    }
}

#[test]
fn test_remove_splice_inherits_ingoing_label() {
    let mut cfa = Cfa::new("cond");
    let cond = cfa.root();
    let join = cfa.allocate("join");
    let tail = cfa.allocate("tail");
    cfa.branch(cond, join, Some(EdgeLabel::False));
    cfa.branch(join, tail, None);

    cfa.remove(join);

    let edges = cfa.outgoing_edges(cond);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].destination, tail);
    assert_eq!(edges[0].label, Some(EdgeLabel::False));
}

#[test]
fn test_finals_are_zero_outgoing_nodes() {
    let (cfa, _, _, n2) = chain_of_three();
    assert_eq!(cfa.finals(), vec![(n2, None)]);
}

#[test]
fn test_additional_finals_dedup_by_pair() {
    let (mut cfa, _, n1, n2) = chain_of_three();
    assert!(cfa.add_final(n1, Some(EdgeLabel::False)));
    assert!(cfa.add_final(n1, Some(EdgeLabel::False)));
    assert!(cfa.add_final(n1, Some(EdgeLabel::True)));
    assert!(cfa.add_final(n2, None));

    let finals = cfa.finals();
    // structural final first, additional pairs deduped, (n2, None) folded
    // into its structural entry
    assert_eq!(
        finals,
        vec![
            (n2, None),
            (n1, Some(EdgeLabel::False)),
            (n1, Some(EdgeLabel::True)),
        ]
    );
}

#[test]
fn test_add_final_rejects_unregistered_nodes() {
    let mut cfa = Cfa::new("root");
    let loose = cfa.allocate("loose");
    assert!(!cfa.add_final(loose, None));
    assert!(cfa.finals().iter().all(|&(id, _)| id != loose));
}

#[test]
fn test_remove_purges_additional_finals() {
    let (mut cfa, _, n1, _) = chain_of_three();
    assert!(cfa.add_final(n1, Some(EdgeLabel::Break)));
    cfa.remove(n1);
    assert!(cfa.finals().iter().all(|&(id, _)| id != n1));
}

#[test]
fn test_replace_moves_edges_onto_new_node() {
    let (mut cfa, root, n1, n2) = chain_of_three();
    let swap = cfa.allocate("swap");
    cfa.replace(n1, swap);

    assert!(!cfa.contains(n1));
    assert!(cfa.contains(swap));
    assert_eq!(cfa.outgoing(root), vec![swap]);
    assert_eq!(cfa.outgoing(swap), vec![n2]);
    assert_eq!(cfa.ingoing(n2), vec![swap]);
    // the new node takes the replaced node's place in iteration order
    let order: Vec<&str> = cfa.nodes().map(|(_, payload)| *payload).collect();
    assert_eq!(order, vec!["root", "swap", "n2"]);
}

#[test]
fn test_replace_merges_into_registered_node() {
    let (mut cfa, root, n1, n2) = chain_of_three();
    cfa.replace(n1, n2);

    assert!(!cfa.contains(n1));
    assert_eq!(cfa.outgoing(root), vec![n2]);
    // n1's self-edge candidates collapse: n1 -> n2 becomes n2 -> n2
    assert_eq!(cfa.outgoing(n2), vec![n2]);
}

#[test]
fn test_breadth_first_visits_level_by_level() {
    let mut cfa = Cfa::new("cond");
    let cond = cfa.root();
    let left = cfa.allocate("left");
    let right = cfa.allocate("right");
    let join = cfa.allocate("join");
    cfa.branch(cond, left, Some(EdgeLabel::True));
    cfa.branch(cond, right, Some(EdgeLabel::False));
    cfa.branch(left, join, None);
    cfa.branch(right, join, None);

    assert_eq!(cfa.breadth_first(), vec![cond, left, right, join]);
}

#[test]
fn test_all_simple_paths_through_diamond() {
    let mut cfa = Cfa::new("cond");
    let cond = cfa.root();
    let left = cfa.allocate("left");
    let right = cfa.allocate("right");
    let join = cfa.allocate("join");
    cfa.branch(cond, left, Some(EdgeLabel::True));
    cfa.branch(cond, right, Some(EdgeLabel::False));
    cfa.branch(left, join, None);
    cfa.branch(right, join, None);

    let mut paths = cfa.all_simple_paths(cond, join);
    paths.sort();
    assert_eq!(
        paths,
        vec![vec![cond, left, join], vec![cond, right, join]]
    );
}

#[test]
fn test_all_simple_paths_ignore_cycles() {
    let mut cfa = Cfa::new("head");
    let head = cfa.root();
    let body = cfa.allocate("body");
    let exit = cfa.allocate("exit");
    cfa.branch(head, body, Some(EdgeLabel::True));
    cfa.branch(body, head, None);
    cfa.branch(head, exit, Some(EdgeLabel::False));

    let paths = cfa.all_simple_paths(head, exit);
    assert_eq!(paths, vec![vec![head, exit]]);
}
