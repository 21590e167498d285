//! Selectors identify a subset of a node's links.

use crate::graph::Graph;
use crate::primitives::DEFAULT_LABEL_ATTRIBUTE;
use crate::{Attributes, GraphObject, Labels, Link, LinkId, NodeId, TesseraError, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of the selected links relative to the represented node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Links whose origin is the represented node.
    #[default]
    Outgoing,
    /// Links whose target is the represented node.
    Incoming,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
        })
    }
}

impl FromStr for Direction {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "outgoing" | "out" => Ok(Self::Outgoing),
            "incoming" | "in" => Ok(Self::Incoming),
            _ => Err(TesseraError::UnknownDirection(s.to_string())),
        }
    }
}

/// "Links carrying `label_attribute == label`, seen from `direction`".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub label: String,
    pub direction: Direction,
    pub label_attribute: String,
}

impl Selector {
    /// Selector for outgoing links with the default label attribute.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::outgoing(label)
    }

    #[must_use]
    pub fn outgoing(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            direction: Direction::Outgoing,
            label_attribute: DEFAULT_LABEL_ATTRIBUTE.to_string(),
        }
    }

    #[must_use]
    pub fn incoming(label: impl Into<String>) -> Self {
        Self {
            direction: Direction::Incoming,
            ..Self::outgoing(label)
        }
    }

    #[must_use]
    pub fn with_label_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.label_attribute = attribute.into();
        self
    }

    /// Whether `link` carries this selector's label.
    #[must_use]
    pub fn matches(&self, link: &Link) -> bool {
        matches!(
            link.attribute(&self.label_attribute),
            Some(Value::String(label)) if *label == self.label
        )
    }

    /// The node at the far end of `link` as seen from the represented node.
    #[must_use]
    pub const fn endpoint(&self, link: &Link) -> NodeId {
        match self.direction {
            Direction::Outgoing => link.target(),
            Direction::Incoming => link.origin(),
        }
    }

    /// Matching links of `node`, in link-id order.
    pub fn select<'g>(&self, graph: &'g Graph, node: NodeId) -> Vec<&'g Link> {
        let candidates: Box<dyn Iterator<Item = &'g Link> + 'g> = match self.direction {
            Direction::Outgoing => Box::new(graph.outgoing(node)),
            Direction::Incoming => Box::new(graph.incoming(node)),
        };
        candidates.filter(|link| self.matches(link)).collect()
    }

    /// Create a matching link between `node` and `other`.
    pub fn connect(
        &self,
        graph: &mut Graph,
        node: NodeId,
        other: NodeId,
        mut attributes: Attributes,
    ) -> LinkId {
        attributes.insert(
            self.label_attribute.clone(),
            Value::String(self.label.clone()),
        );
        let (origin, target) = match self.direction {
            Direction::Outgoing => (node, other),
            Direction::Incoming => (other, node),
        };
        graph.connect(origin, target, Labels::new(), attributes, None)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}={}", self.direction, self.label_attribute, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("Incoming".parse::<Direction>().ok(), Some(Direction::Incoming));
        assert_eq!("out".parse::<Direction>().ok(), Some(Direction::Outgoing));
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(TesseraError::UnknownDirection(_))
        ));
    }

    #[test]
    fn select_filters_by_label_and_direction() {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let a = graph.new_node();
        let b = graph.new_node();
        let item = Selector::new("item");

        item.connect(&mut graph, root, a, Attributes::new());
        Selector::new("other").connect(&mut graph, root, b, Attributes::new());
        Selector::incoming("item").connect(&mut graph, root, b, Attributes::new());

        let outgoing: Vec<NodeId> = item
            .select(&graph, root)
            .into_iter()
            .map(|link| item.endpoint(link))
            .collect();
        assert_eq!(outgoing, vec![a]);

        let incoming = Selector::incoming("item");
        let sources: Vec<NodeId> = incoming
            .select(&graph, root)
            .into_iter()
            .map(|link| incoming.endpoint(link))
            .collect();
        assert_eq!(sources, vec![b]);
    }

    #[test]
    fn custom_label_attribute() {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let a = graph.new_node();
        let selector = Selector::new("tag").with_label_attribute("role");

        let link = selector.connect(&mut graph, root, a, Attributes::new());

        assert_eq!(graph.attribute(link, "role"), Some(&Value::from("tag")));
        assert_eq!(graph.attribute(link, "label"), None);
        assert_eq!(selector.select(&graph, root).len(), 1);
        assert!(Selector::new("tag").select(&graph, root).is_empty());
    }

    #[test]
    fn non_string_label_does_not_match() {
        let mut graph = Graph::new();
        let root = graph.new_node();
        let a = graph.new_node();
        let link = graph.connect_nodes(root, a);
        graph.set_attribute(link, "label", 1);

        assert!(Selector::new("1").select(&graph, root).is_empty());
    }
}
