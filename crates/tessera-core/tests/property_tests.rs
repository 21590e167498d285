//! # Property-Based Tests
//!
//! Randomized checks of the recorder and neighborhood invariants.

use proptest::collection::vec;
use proptest::prelude::*;
use tessera_core::{
    ChangeRecorder, Graph, GraphObject, History, IndexedNeighborhood, KeyedNeighborhood, Link,
    Node, NodeId, ObjectId, Selector, Value, graph_from_bytes, graph_to_bytes,
};

/// One random mutation. Indices pick among whatever exists at apply time.
#[derive(Debug, Clone)]
enum Op {
    AddNode,
    RemoveNode(usize),
    Connect(usize, usize),
    Disconnect(usize),
    SetAttribute(usize, u8, i64),
    UnsetAttribute(usize, u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::AddNode),
        1 => any::<usize>().prop_map(Op::RemoveNode),
        3 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Connect(a, b)),
        1 => any::<usize>().prop_map(Op::Disconnect),
        2 => (any::<usize>(), 0u8..3, any::<i64>()).prop_map(|(o, k, v)| Op::SetAttribute(o, k, v)),
        1 => (any::<usize>(), 0u8..3).prop_map(|(o, k)| Op::UnsetAttribute(o, k)),
    ]
}

fn apply(graph: &mut Graph, op: &Op) {
    let nodes: Vec<NodeId> = graph.node_ids().collect();
    let objects: Vec<ObjectId> = graph
        .node_ids()
        .map(Into::into)
        .chain(graph.link_ids().map(Into::into))
        .collect();

    match *op {
        Op::AddNode => {
            graph.new_node();
        }
        Op::RemoveNode(i) if !nodes.is_empty() => {
            graph.remove_node(nodes[i % nodes.len()]);
        }
        Op::Connect(a, b) if !nodes.is_empty() => {
            graph.connect_nodes(nodes[a % nodes.len()], nodes[b % nodes.len()]);
        }
        Op::Disconnect(i) => {
            let links: Vec<_> = graph.link_ids().collect();
            if !links.is_empty() {
                graph.disconnect(links[i % links.len()]);
            }
        }
        Op::SetAttribute(o, k, v) if !objects.is_empty() => {
            graph.set_attribute(objects[o % objects.len()], format!("k{k}"), v);
        }
        Op::UnsetAttribute(o, k) if !objects.is_empty() => {
            graph.unset_attribute(objects[o % objects.len()], format!("k{k}"));
        }
        _ => {}
    }
}

fn seeded(ops: &[Op]) -> Graph {
    let mut graph = Graph::new();
    for op in ops {
        apply(&mut graph, op);
    }
    graph
}

fn state(graph: &Graph) -> (Vec<Node>, Vec<Link>) {
    (graph.nodes().cloned().collect(), graph.links().cloned().collect())
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Replaying a recording restores nodes, links and attributes exactly.
    #[test]
    fn recorded_activity_is_reversible(
        setup in vec(op(), 0..20),
        activity in vec(op(), 1..30),
    ) {
        let mut graph = seeded(&setup);
        let before = state(&graph);

        let inverse = ChangeRecorder::record(&mut graph, |graph| {
            for op in &activity {
                apply(graph, op);
            }
        });
        graph.apply_changes(&inverse);

        prop_assert_eq!(state(&graph), before);
    }

    /// Undoing every step and redoing them all returns to the final state.
    #[test]
    fn history_round_trips(steps in vec(vec(op(), 1..6), 1..8)) {
        let mut graph = Graph::new();
        let mut history = History::new();
        let initial = state(&graph);

        for step in &steps {
            history.perform(&mut graph, |graph| {
                for op in step {
                    apply(graph, op);
                }
            });
        }
        let last = state(&graph);

        while history.undo(&mut graph) {}
        prop_assert_eq!(state(&graph), initial);

        while history.redo(&mut graph) {}
        prop_assert_eq!(state(&graph), last);
    }

    /// Removing any member leaves a dense index sequence in prior order.
    #[test]
    fn indexed_removal_keeps_dense_indices(len in 1usize..12, pick in any::<usize>()) {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let items: Vec<NodeId> = (0..len).map(|_| graph.new_node()).collect();
        let list = IndexedNeighborhood::new(root, Selector::new("item"));
        for item in &items {
            list.append(&mut graph, *item);
        }

        let doomed = items[pick % len];
        list.remove(&mut graph, doomed);

        let expected: Vec<NodeId> = items.iter().copied().filter(|item| *item != doomed).collect();
        prop_assert_eq!(list.nodes(&graph), expected);
        let indices: Vec<Option<Value>> = list
            .links(&graph)
            .into_iter()
            .map(|link| link.attribute("index").cloned())
            .collect();
        let dense: Vec<Option<Value>> = (0..len - 1).map(|i| Some(Value::Int(i as i64))).collect();
        prop_assert_eq!(indices, dense);
    }

    /// Every key maps to at most one link, whatever order keys are written in.
    #[test]
    fn keyed_writes_keep_one_link_per_key(writes in vec((0u8..4, 0usize..3), 1..20)) {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let targets: Vec<NodeId> = (0..3).map(|_| graph.new_node()).collect();
        let dict = KeyedNeighborhood::new(root, Selector::new("field"));

        for (key, target) in &writes {
            dict.set_node(&mut graph, targets[*target], i64::from(*key));
        }

        let keys = dict.keys(&graph);
        prop_assert_eq!(keys.len(), dict.count(&graph));
        for (key, _) in &writes {
            let last = writes.iter().rev().find(|(k, _)| k == key).map(|(_, t)| targets[*t]);
            prop_assert_eq!(dict.node(&graph, i64::from(*key)), last);
        }
    }

    /// Binary snapshots restore the same state and allocator position.
    #[test]
    fn binary_snapshot_round_trips(setup in vec(op(), 0..30)) {
        let mut graph = seeded(&setup);
        let bytes = graph_to_bytes(&graph).expect("serialize");
        let mut restored = graph_from_bytes(&bytes).expect("deserialize");

        prop_assert_eq!(state(&restored), state(&graph));
        prop_assert_eq!(restored.new_node(), graph.new_node());
    }
}
