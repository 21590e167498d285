//! Ordered collection view.
//!
//! Matching links are ordered by a numeric index attribute. After every
//! removal the remaining links are renumbered to a dense `0..N-1` sequence
//! in their previous relative order.

use super::{LabelledNeighborhood, Selector};
use crate::graph::Graph;
use crate::primitives::DEFAULT_INDEX_ATTRIBUTE;
use crate::{Attributes, GraphObject, Link, LinkId, NodeId, Value};
use std::cmp::Ordering;

/// Ordered list of nodes backed by indexed links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedNeighborhood {
    base: LabelledNeighborhood,
    index_attribute: String,
}

impl IndexedNeighborhood {
    #[must_use]
    pub fn new(node: NodeId, selector: Selector) -> Self {
        Self {
            base: LabelledNeighborhood::new(node, selector),
            index_attribute: DEFAULT_INDEX_ATTRIBUTE.to_string(),
        }
    }

    #[must_use]
    pub fn with_index_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.index_attribute = attribute.into();
        self
    }

    #[must_use]
    pub const fn labelled(&self) -> &LabelledNeighborhood {
        &self.base
    }

    #[must_use]
    pub fn index_attribute(&self) -> &str {
        &self.index_attribute
    }

    fn index_value<'l>(&self, link: &'l Link) -> Option<&'l Value> {
        link.attribute(&self.index_attribute)
            .filter(|value| value.is_numeric())
    }

    /// Links ordered by index. Links without a numeric index come first;
    /// ties keep link-id order.
    pub fn links<'g>(&self, graph: &'g Graph) -> Vec<&'g Link> {
        let mut links = self.base.links(graph);
        links.sort_by(|a, b| match (self.index_value(a), self.index_value(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.numeric_cmp(y).unwrap_or(Ordering::Equal),
        });
        links
    }

    pub fn link_ids(&self, graph: &Graph) -> Vec<LinkId> {
        self.links(graph).into_iter().filter_map(Link::id).collect()
    }

    /// Member nodes in index order.
    pub fn nodes(&self, graph: &Graph) -> Vec<NodeId> {
        let selector = self.base.selector();
        self.links(graph)
            .into_iter()
            .map(|link| selector.endpoint(link))
            .collect()
    }

    pub fn count(&self, graph: &Graph) -> usize {
        self.base.count(graph)
    }

    pub fn is_empty(&self, graph: &Graph) -> bool {
        self.base.is_empty(graph)
    }

    /// Member at `position` in index order.
    pub fn node_at(&self, graph: &Graph, position: usize) -> Option<NodeId> {
        self.nodes(graph).get(position).copied()
    }

    /// One past the highest index in use, or 0 when empty.
    pub fn end_index(&self, graph: &Graph) -> i64 {
        self.base
            .links(graph)
            .into_iter()
            .filter_map(|link| match self.index_value(link) {
                Some(Value::Int(i)) => Some(*i),
                Some(Value::Float(x)) => Some(*x as i64),
                _ => None,
            })
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Add `other` at the end.
    pub fn append(&self, graph: &mut Graph, other: NodeId) -> LinkId {
        self.append_with(graph, other, Attributes::new())
    }

    /// Add `other` at the end with extra link attributes.
    pub fn append_with(&self, graph: &mut Graph, other: NodeId, mut attributes: Attributes) -> LinkId {
        let index = self.end_index(graph);
        attributes.insert(self.index_attribute.clone(), Value::Int(index));
        self.base.add(graph, other, attributes)
    }

    /// Insert `other` so it ends up at `position` (clamped to the end).
    ///
    /// Members are renumbered densely around the new entry.
    pub fn insert(&self, graph: &mut Graph, other: NodeId, position: usize) -> LinkId {
        let ordered = self.link_ids(graph);
        let position = position.min(ordered.len());
        for (current, link) in ordered.into_iter().enumerate() {
            let index = if current < position { current } else { current + 1 };
            self.set_index(graph, link, index);
        }
        let mut attributes = Attributes::new();
        attributes.insert(self.index_attribute.clone(), Value::Int(position as i64));
        self.base.add(graph, other, attributes)
    }

    /// Remove every link to `other` and renumber the rest. Returns how many
    /// links were removed.
    pub fn remove(&self, graph: &mut Graph, other: NodeId) -> usize {
        let removed = self.base.disconnect_node(graph, other);
        self.renumber(graph);
        removed
    }

    /// Remove the single member at `position` and renumber the rest.
    pub fn remove_at(&self, graph: &mut Graph, position: usize) -> Option<NodeId> {
        let link = *self.link_ids(graph).get(position)?;
        let member = graph
            .link(link)
            .map(|link| self.base.selector().endpoint(link))?;
        graph.disconnect(link);
        self.renumber(graph);
        Some(member)
    }

    /// Rewrite the index of every matching link to `0..N-1` in current order.
    ///
    /// Only links whose index actually changes are touched.
    pub fn renumber(&self, graph: &mut Graph) {
        for (position, link) in self.link_ids(graph).into_iter().enumerate() {
            self.set_index(graph, link, position);
        }
    }

    fn set_index(&self, graph: &mut Graph, link: LinkId, position: usize) {
        let index = Value::Int(position as i64);
        if graph.attribute(link, &self.index_attribute) != Some(&index) {
            graph.set_attribute(link, self.index_attribute.clone(), index);
        }
    }
}
