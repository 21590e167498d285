//! # Graph Objects
//!
//! Nodes and links are plain values. While attached they live inside a
//! [`Graph`](crate::Graph)'s tables and are referred to everywhere else by
//! [`NodeId`]/[`LinkId`]. A value with `id == None` is detached: it was
//! either never added or was handed back by a removal.

use crate::{LinkId, NodeId, ObjectId, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Set of string labels attached to an object.
pub type Labels = BTreeSet<String>;

/// Attribute key -> value mapping of an object.
pub type Attributes = BTreeMap<String, Value>;

/// Build a label set from anything string-like.
pub fn label_set<I, S>(labels: I) -> Labels
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels.into_iter().map(Into::into).collect()
}

/// Build an attribute map from key/value pairs.
pub fn attribute_map<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Which kind of object a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Node,
    Link,
}

/// Accessors shared by nodes and links.
pub trait GraphObject {
    /// Identifier while attached, `None` when detached.
    fn object_id(&self) -> Option<ObjectId>;

    fn kind(&self) -> ObjectKind;

    fn labels(&self) -> &Labels;

    fn attributes(&self) -> &Attributes;

    fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes().get(key)
    }

    fn has_label(&self, label: &str) -> bool {
        self.labels().contains(label)
    }
}

// =============================================================================
// NODE
// =============================================================================

/// A graph vertex. Has no structural fields of its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: Option<NodeId>,
    #[serde(default)]
    pub(crate) labels: Labels,
    #[serde(default)]
    pub(crate) attributes: Attributes,
}

impl Node {
    /// Create a detached node.
    #[must_use]
    pub fn new(labels: Labels, attributes: Attributes) -> Self {
        Self {
            id: None,
            labels,
            attributes,
        }
    }

    /// Create a detached node that will keep `id` when added to a graph.
    #[must_use]
    pub fn with_id(id: NodeId, labels: Labels, attributes: Attributes) -> Self {
        Self {
            id: Some(id),
            labels,
            attributes,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<NodeId> {
        self.id
    }

    /// Add a label to a detached value.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    /// Set an attribute on a detached value.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl GraphObject for Node {
    fn object_id(&self) -> Option<ObjectId> {
        self.id.map(ObjectId::Node)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Node
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

// =============================================================================
// LINK
// =============================================================================

/// A directed edge from `origin` to `target`.
///
/// Both endpoints must be attached to the same graph as the link for the
/// link's whole attached lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub(crate) id: Option<LinkId>,
    pub(crate) origin: NodeId,
    pub(crate) target: NodeId,
    #[serde(default)]
    pub(crate) labels: Labels,
    #[serde(default)]
    pub(crate) attributes: Attributes,
}

impl Link {
    /// Create a detached link between two node identifiers.
    #[must_use]
    pub fn new(origin: NodeId, target: NodeId, labels: Labels, attributes: Attributes) -> Self {
        Self {
            id: None,
            origin,
            target,
            labels,
            attributes,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<LinkId> {
        self.id
    }

    #[must_use]
    pub const fn origin(&self) -> NodeId {
        self.origin
    }

    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// Whether `node` is the origin or the target of this link.
    #[must_use]
    pub fn is_incident(&self, node: NodeId) -> bool {
        self.origin == node || self.target == node
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl GraphObject for Link {
    fn object_id(&self) -> Option<ObjectId> {
        self.id.map(ObjectId::Link)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Link
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
