//! Optional single-valued slot.

use super::{LabelledNeighborhood, Selector};
use crate::graph::Graph;
use crate::{Attributes, Link, LinkId, NodeId};

/// At most one matching link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodOfOne {
    base: LabelledNeighborhood,
}

impl NeighborhoodOfOne {
    #[must_use]
    pub fn new(node: NodeId, selector: Selector) -> Self {
        Self {
            base: LabelledNeighborhood::new(node, selector),
        }
    }

    #[must_use]
    pub const fn labelled(&self) -> &LabelledNeighborhood {
        &self.base
    }

    /// The matching link, or the first one if the slot was overfilled elsewhere.
    pub fn link<'g>(&self, graph: &'g Graph) -> Option<&'g Link> {
        self.base.links(graph).into_iter().next()
    }

    pub fn node(&self, graph: &Graph) -> Option<NodeId> {
        self.link(graph)
            .map(|link| self.base.selector().endpoint(link))
    }

    /// Point the slot at `other`, dropping any previous link.
    pub fn set(&self, graph: &mut Graph, other: NodeId) -> LinkId {
        self.base.disconnect_all(graph);
        self.base.add(graph, other, Attributes::new())
    }

    /// Empty the slot. Returns how many links were removed.
    pub fn remove(&self, graph: &mut Graph) -> usize {
        self.base.disconnect_all(graph)
    }
}
