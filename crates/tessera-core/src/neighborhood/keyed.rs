//! Dictionary view: at most one current link per key.

use super::{LabelledNeighborhood, Selector};
use crate::graph::Graph;
use crate::primitives::DEFAULT_KEY_ATTRIBUTE;
use crate::{Attributes, GraphObject, Link, LinkId, NodeId, Value};
use std::cmp::Ordering;

/// Key -> node mapping backed by keyed links.
///
/// The graph itself would allow several links with the same key; writes
/// through this view remove every existing link for a key before adding
/// the new one, which also repairs duplicates created elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedNeighborhood {
    base: LabelledNeighborhood,
    key_attribute: String,
}

impl KeyedNeighborhood {
    #[must_use]
    pub fn new(node: NodeId, selector: Selector) -> Self {
        Self {
            base: LabelledNeighborhood::new(node, selector),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
        }
    }

    #[must_use]
    pub fn with_key_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.key_attribute = attribute.into();
        self
    }

    #[must_use]
    pub const fn labelled(&self) -> &LabelledNeighborhood {
        &self.base
    }

    #[must_use]
    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    /// Matching links ordered by key; links without a key come first.
    pub fn links<'g>(&self, graph: &'g Graph) -> Vec<&'g Link> {
        let mut links = self.base.links(graph);
        links.sort_by(|a, b| {
            match (a.attribute(&self.key_attribute), b.attribute(&self.key_attribute)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.sort_cmp(y),
            }
        });
        links
    }

    /// Member nodes in key order.
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

    fn links_for_key<'g>(&self, graph: &'g Graph, key: &Value) -> Vec<&'g Link> {
        self.links(graph)
            .into_iter()
            .filter(|link| link.attribute(&self.key_attribute) == Some(key))
            .collect()
    }

    /// Node stored under `key`.
    pub fn node(&self, graph: &Graph, key: impl Into<Value>) -> Option<NodeId> {
        let key = key.into();
        self.links_for_key(graph, &key)
            .first()
            .map(|link| self.base.selector().endpoint(link))
    }

    /// Store `other` under `key`, replacing whatever was there.
    pub fn set_node(&self, graph: &mut Graph, other: NodeId, key: impl Into<Value>) -> LinkId {
        let key = key.into();
        self.remove_key(graph, &key);
        let mut attributes = Attributes::new();
        attributes.insert(self.key_attribute.clone(), key);
        self.base.add(graph, other, attributes)
    }

    /// Remove every link stored under `key`. Returns how many.
    pub fn remove_node(&self, graph: &mut Graph, key: impl Into<Value>) -> usize {
        let key = key.into();
        self.remove_key(graph, &key)
    }

    fn remove_key(&self, graph: &mut Graph, key: &Value) -> usize {
        let doomed: Vec<LinkId> = self
            .links_for_key(graph, key)
            .into_iter()
            .filter_map(Link::id)
            .collect();
        LabelledNeighborhood::disconnect_each(graph, doomed)
    }

    /// Distinct keys in order.
    ///
    /// Keys are distinct under the same equality [`node`](Self::node) looks
    /// them up with, so `Int(1)` and `Float(1.0)` are both reported.
    pub fn keys(&self, graph: &Graph) -> Vec<Value> {
        self.entries(graph).into_iter().map(|(key, _)| key).collect()
    }

    /// `(key, node)` pairs in key order. Duplicated keys report their first link.
    pub fn entries(&self, graph: &Graph) -> Vec<(Value, NodeId)> {
        let selector = self.base.selector();
        let mut entries: Vec<(Value, NodeId)> = Vec::new();
        for link in self.links(graph) {
            let Some(key) = link.attribute(&self.key_attribute) else {
                continue;
            };
            // Keys that sort equal need not be equal, so a run can interleave them.
            if entries.iter().rev().any(|(seen, _)| seen == key) {
                continue;
            }
            entries.push((key.clone(), selector.endpoint(link)));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_node_replaces_existing_key() {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let x = graph.new_node();
        let y = graph.new_node();
        let fields = KeyedNeighborhood::new(root, Selector::new("field"));

        fields.set_node(&mut graph, x, "author");
        fields.set_node(&mut graph, y, "author");

        let author = fields
            .links(&graph)
            .into_iter()
            .filter(|link| link.attribute("key") == Some(&Value::from("author")))
            .count();
        assert_eq!(author, 1);
        assert_eq!(fields.node(&graph, "author"), Some(y));
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn set_node_repairs_duplicates() {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let x = graph.new_node();
        let y = graph.new_node();
        let fields = KeyedNeighborhood::new(root, Selector::new("field"));
        let mut duplicate = Attributes::new();
        duplicate.insert("key".into(), Value::from("k"));
        fields.labelled().add(&mut graph, x, duplicate.clone());
        fields.labelled().add(&mut graph, x, duplicate);

        fields.set_node(&mut graph, y, "k");

        assert_eq!(fields.count(&graph), 1);
        assert_eq!(fields.node(&graph, "k"), Some(y));
    }

    #[test]
    fn keys_are_sorted_and_distinct() {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let a = graph.new_node();
        let b = graph.new_node();
        let fields = KeyedNeighborhood::new(root, Selector::new("field"));
        fields.set_node(&mut graph, a, "zeta");
        fields.set_node(&mut graph, b, "alpha");
        let mut duplicate = Attributes::new();
        duplicate.insert("key".into(), Value::from("zeta"));
        fields.labelled().add(&mut graph, b, duplicate);

        assert_eq!(fields.keys(&graph), vec![Value::from("alpha"), Value::from("zeta")]);
        assert_eq!(
            fields.entries(&graph),
            vec![(Value::from("alpha"), b), (Value::from("zeta"), a)]
        );
        assert_eq!(fields.nodes(&graph), vec![b, a, b]);
    }

    #[test]
    fn numerically_equal_keys_of_different_types_stay_distinct() {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let a = graph.new_node();
        let b = graph.new_node();
        let fields = KeyedNeighborhood::new(root, Selector::new("field"));
        for (node, key) in [(a, Value::Int(1)), (b, Value::Float(1.0)), (b, Value::Int(1))] {
            let mut attributes = Attributes::new();
            attributes.insert("key".into(), key);
            fields.labelled().add(&mut graph, node, attributes);
        }

        assert_eq!(fields.keys(&graph), vec![Value::Int(1), Value::Float(1.0)]);
        assert_eq!(
            fields.entries(&graph),
            vec![(Value::Int(1), a), (Value::Float(1.0), b)]
        );
        assert_eq!(fields.node(&graph, Value::Float(1.0)), Some(b));
    }

    #[test]
    fn remove_node_by_key() {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let a = graph.new_node();
        let fields = KeyedNeighborhood::new(root, Selector::new("field"));
        fields.set_node(&mut graph, a, 1);
        fields.set_node(&mut graph, a, 2);

        assert_eq!(fields.remove_node(&mut graph, 1), 1);
        assert_eq!(fields.remove_node(&mut graph, 1), 0);
        assert_eq!(fields.node(&graph, 1), None);
        assert_eq!(fields.node(&graph, 2), Some(a));
    }
}
