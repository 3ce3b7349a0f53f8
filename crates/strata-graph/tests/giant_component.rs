use strata_core::NodeId;
use strata_graph::{giant_component, LeafGraph};

fn node(raw: u32) -> NodeId {
    NodeId::from_raw(raw)
}

fn path(graph: &mut LeafGraph, nodes: &[u32]) {
    for pair in nodes.windows(2) {
        graph.add_edge(node(pair[0]), node(pair[1])).unwrap();
    }
}

#[test]
fn keeps_the_largest_component() {
    // A 5-node path and an 8-node path.
    let mut graph = LeafGraph::with_nodes(13);
    path(&mut graph, &[0, 1, 2, 3, 4]);
    path(&mut graph, &[5, 6, 7, 8, 9, 10, 11, 12]);

    let giant = giant_component(&graph).unwrap();
    assert_eq!(giant.node_count(), 8);
    assert_eq!(giant.edge_count(), 7);
}

#[test]
fn surviving_nodes_are_renumbered_in_original_order() {
    let mut graph = LeafGraph::with_nodes(13);
    path(&mut graph, &[0, 1, 2, 3, 4]);
    path(&mut graph, &[5, 6, 7, 8, 9, 10, 11, 12]);

    let giant = giant_component(&graph).unwrap();
    // Original nodes 5..=12 map to 0..=7 in ascending order, so the path
    // structure survives under the compact ids.
    for raw in 0..7 {
        assert!(giant.has_edge(node(raw), node(raw + 1)));
    }
    assert_eq!(giant.degree(node(0)).unwrap(), 1);
    assert_eq!(giant.degree(node(1)).unwrap(), 2);
}

#[test]
fn size_ties_keep_the_first_discovered_component() {
    // A triangle over 0..=2 and a path over 3..=5: both have three nodes,
    // so the triangle discovered first must win.
    let mut graph = LeafGraph::with_nodes(6);
    graph.add_edge(node(0), node(1)).unwrap();
    graph.add_edge(node(1), node(2)).unwrap();
    graph.add_edge(node(2), node(0)).unwrap();
    path(&mut graph, &[3, 4, 5]);

    let giant = giant_component(&graph).unwrap();
    assert_eq!(giant.node_count(), 3);
    assert_eq!(giant.edge_count(), 3);
}

#[test]
fn empty_graph_stays_empty() {
    let giant = giant_component(&LeafGraph::empty()).unwrap();
    assert_eq!(giant.node_count(), 0);
    assert_eq!(giant.edge_count(), 0);
}

#[test]
fn isolated_nodes_reduce_to_a_single_node() {
    let graph = LeafGraph::with_nodes(4);
    let giant = giant_component(&graph).unwrap();
    assert_eq!(giant.node_count(), 1);
    assert_eq!(giant.edge_count(), 0);
}

#[test]
fn duplicate_pairs_are_emitted_once() {
    let mut graph = LeafGraph::with_nodes(2);
    graph.add_edge(node(0), node(1)).unwrap();
    graph.add_edge(node(1), node(0)).unwrap();

    let giant = giant_component(&graph).unwrap();
    assert_eq!(giant.node_count(), 2);
    assert_eq!(giant.edge_count(), 1);
}
