//! # Graph Snapshot
//!
//! A serde image of a graph that keeps every identifier.
//!
//! Snapshots arrive from files and are therefore untrusted. [`GraphSnapshot::restore`]
//! checks everything the graph would otherwise panic on before touching a
//! graph, then rebuilds through the ordinary mutation API.

use crate::graph::Graph;
use crate::ids::MAX_OBJECT_ID;
use crate::{Link, LinkId, Node, NodeId, TesseraError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Serializable image of a [`Graph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Attached nodes in id order.
    pub nodes: Vec<Node>,
    /// Attached links in id order.
    pub links: Vec<Link>,
    /// Next identifier the allocator would issue.
    pub next_id: u64,
}

impl From<&Graph> for GraphSnapshot {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            links: graph.links().cloned().collect(),
            next_id: graph.ids.peek(),
        }
    }
}

impl GraphSnapshot {
    /// Check that the snapshot describes a well-formed graph.
    ///
    /// Besides structure, the restored allocator must still have an
    /// identifier left to issue.
    pub fn validate(&self) -> Result<(), TesseraError> {
        let mut seen = BTreeSet::new();
        let mut node_ids = BTreeSet::new();

        for node in &self.nodes {
            let Some(id @ NodeId(raw)) = node.id() else {
                return Err(TesseraError::InvalidSnapshot("node without id".to_string()));
            };
            Self::claim(&mut seen, raw)?;
            node_ids.insert(id);
        }

        for link in &self.links {
            let Some(LinkId(raw)) = link.id() else {
                return Err(TesseraError::InvalidSnapshot("link without id".to_string()));
            };
            Self::claim(&mut seen, raw)?;
            for endpoint in [link.origin(), link.target()] {
                if !node_ids.contains(&endpoint) {
                    return Err(TesseraError::InvalidSnapshot(format!(
                        "link {raw} references missing {endpoint}"
                    )));
                }
            }
        }

        let highest = seen.last().copied().unwrap_or(0);
        if self.next_id > MAX_OBJECT_ID || highest >= MAX_OBJECT_ID {
            return Err(TesseraError::InvalidSnapshot(
                "identifier space exhausted".to_string(),
            ));
        }

        Ok(())
    }

    fn claim(seen: &mut BTreeSet<u64>, raw: u64) -> Result<(), TesseraError> {
        if raw == 0 || raw > MAX_OBJECT_ID {
            return Err(TesseraError::InvalidSnapshot(format!("object id {raw} is reserved")));
        }
        if !seen.insert(raw) {
            return Err(TesseraError::InvalidSnapshot(format!("duplicate id {raw}")));
        }
        Ok(())
    }

    /// Validate and rebuild the graph.
    ///
    /// Identifiers survive the trip and the allocator resumes at `next_id`
    /// (or past the highest restored id, whichever is larger).
    pub fn restore(self) -> Result<Graph, TesseraError> {
        self.validate()?;

        let mut graph = Graph::new();
        for node in self.nodes {
            graph.add_node(node);
        }
        for link in self.links {
            graph.add_link(link);
        }
        if self.next_id > 1 {
            graph.ids.mark_used(self.next_id - 1);
        }

        tracing::debug!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            "snapshot restored"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, Labels, Value, label_set};

    fn sample() -> Graph {
        let mut graph = Graph::new();
        let a = graph.create_node(label_set(["Person"]), Attributes::new(), None);
        let b = graph.new_node();
        let link = graph.connect(a, b, Labels::new(), Attributes::new(), None);
        graph.set_attribute(link, "label", "knows");
        let gone = graph.new_node();
        graph.remove_node(gone);
        graph
    }

    #[test]
    fn restore_keeps_ids_and_allocator_position() {
        let graph = sample();
        let snapshot = GraphSnapshot::from(&graph);
        assert_eq!(snapshot.next_id, 5);

        let mut restored = snapshot.clone().restore().expect("restore");
        assert_eq!(GraphSnapshot::from(&restored), snapshot);
        assert_eq!(restored.new_node(), NodeId(5));
        assert_eq!(
            restored.attribute(LinkId(3), "label"),
            Some(&Value::from("knows"))
        );
    }

    #[test]
    fn rejects_dangling_endpoint() {
        let mut snapshot = GraphSnapshot::from(&sample());
        snapshot.nodes.retain(|node| node.id() != Some(NodeId(2)));

        assert!(matches!(
            snapshot.restore(),
            Err(TesseraError::InvalidSnapshot(message)) if message.contains("node 2")
        ));
    }

    #[test]
    fn rejects_ids_shared_between_tables() {
        let mut snapshot = GraphSnapshot::from(&sample());
        snapshot.links[0].id = Some(LinkId(1));

        assert!(matches!(
            snapshot.validate(),
            Err(TesseraError::InvalidSnapshot(message)) if message == "duplicate id 1"
        ));
    }

    #[test]
    fn rejects_detached_and_zero_ids() {
        let mut detached = GraphSnapshot::from(&sample());
        detached.nodes[0].id = None;
        assert!(detached.validate().is_err());

        let mut zero = GraphSnapshot::from(&sample());
        zero.nodes[1].id = Some(NodeId(0));
        assert!(zero.validate().is_err());
    }

    #[test]
    fn rejects_reserved_and_exhausting_ids() {
        let mut reserved = GraphSnapshot::from(&sample());
        reserved.nodes[0].id = Some(NodeId(u64::MAX));
        assert!(matches!(
            reserved.validate(),
            Err(TesseraError::InvalidSnapshot(message)) if message.contains("is reserved")
        ));

        let mut last = GraphSnapshot::from(&sample());
        last.nodes[1].id = Some(NodeId(MAX_OBJECT_ID));
        last.links[0].target = NodeId(MAX_OBJECT_ID);
        assert!(matches!(
            last.validate(),
            Err(TesseraError::InvalidSnapshot(message)) if message == "identifier space exhausted"
        ));

        let mut counter = GraphSnapshot::from(&sample());
        counter.next_id = u64::MAX;
        assert!(counter.validate().is_err());
    }

    #[test]
    fn restored_graph_near_the_limit_still_issues_fresh_ids() {
        let mut snapshot = GraphSnapshot::from(&sample());
        snapshot.nodes[0].id = Some(NodeId(MAX_OBJECT_ID - 1));
        snapshot.links[0].origin = NodeId(MAX_OBJECT_ID - 1);

        let mut restored = snapshot.restore().expect("restore");
        assert_eq!(restored.new_node(), NodeId(MAX_OBJECT_ID));
        assert_eq!(restored.node_count(), 3);
    }

    #[test]
    fn small_next_id_does_not_rewind_allocator() {
        let mut snapshot = GraphSnapshot::from(&sample());
        snapshot.next_id = 0;

        let mut restored = snapshot.restore().expect("restore");
        assert_eq!(restored.new_node(), NodeId(4));
    }
}
