//! Unordered view over the links matching a selector.

use super::Selector;
use crate::graph::Graph;
use crate::{Attributes, Link, LinkId, NodeId};

/// The links of `node` matching `selector`, with no extra structure.
///
/// Nothing is cached: every read scans the represented node's links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledNeighborhood {
    node: NodeId,
    selector: Selector,
}

impl LabelledNeighborhood {
    #[must_use]
    pub fn new(node: NodeId, selector: Selector) -> Self {
        Self { node, selector }
    }

    /// The represented node.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Matching links in link-id order.
    pub fn links<'g>(&self, graph: &'g Graph) -> Vec<&'g Link> {
        self.selector.select(graph, self.node)
    }

    /// Identifiers of the matching links.
    pub fn link_ids(&self, graph: &Graph) -> Vec<LinkId> {
        self.links(graph).into_iter().filter_map(Link::id).collect()
    }

    /// Far endpoints of the matching links.
    pub fn nodes(&self, graph: &Graph) -> Vec<NodeId> {
        self.links(graph)
            .into_iter()
            .map(|link| self.selector.endpoint(link))
            .collect()
    }

    pub fn count(&self, graph: &Graph) -> usize {
        self.links(graph).len()
    }

    pub fn is_empty(&self, graph: &Graph) -> bool {
        self.count(graph) == 0
    }

    /// Whether some matching link reaches `other`.
    pub fn contains(&self, graph: &Graph, other: NodeId) -> bool {
        self.links(graph)
            .into_iter()
            .any(|link| self.selector.endpoint(link) == other)
    }

    /// Add a matching link to `other`. The label attribute is set for you.
    pub fn add(&self, graph: &mut Graph, other: NodeId, attributes: Attributes) -> LinkId {
        self.selector.connect(graph, self.node, other, attributes)
    }

    /// Disconnect every matching link that reaches `other`. Returns how many.
    pub fn disconnect_node(&self, graph: &mut Graph, other: NodeId) -> usize {
        let doomed: Vec<LinkId> = self
            .links(graph)
            .into_iter()
            .filter(|link| self.selector.endpoint(link) == other)
            .filter_map(Link::id)
            .collect();
        Self::disconnect_each(graph, doomed)
    }

    /// Disconnect every matching link. Returns how many.
    pub fn disconnect_all(&self, graph: &mut Graph) -> usize {
        let doomed = self.link_ids(graph);
        Self::disconnect_each(graph, doomed)
    }

    pub(crate) fn disconnect_each(graph: &mut Graph, links: Vec<LinkId>) -> usize {
        let count = links.len();
        for link in links {
            graph.disconnect(link);
        }
        count
    }
}
