//! # Graph Store
//!
//! The in-memory attributed multigraph for Tessera.
//!
//! The graph exclusively owns every node and link it has accepted, in two
//! `BTreeMap` tables keyed by identifier. Everything outside the graph
//! refers to objects by [`NodeId`]/[`LinkId`], so a removed object cannot
//! leave a dangling reference behind.
//!
//! ## Change Emission
//!
//! Every mutation builds one [`ChangeEvent`], broadcasts `will_change` with
//! the graph untouched, applies the mutation, then broadcasts `did_change`.
//!
//! ## Cascading Removal
//!
//! [`Graph::remove_node`] disconnects each incident link through
//! [`Graph::disconnect`] first, so every cascaded link gets its own
//! `Disconnect` event (in link-id order) before the node's `RemoveNode`.
//!
//! ## Failure Semantics
//!
//! Id collisions, links to nodes outside the graph and mutation of unknown
//! objects are invariant violations and panic. Lookups of unknown ids
//! return `None`.

use crate::change::{ChangeEvent, Observer, Subscription};
use crate::ids::{IdentityAllocator, MAX_OBJECT_ID};
use crate::types::invariant_violation;
use crate::{Attributes, GraphObject, Labels, Link, LinkId, Node, NodeId, ObjectId, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Values handed back by [`Graph::remove_node`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    /// The detached node (id cleared).
    pub node: Node,
    /// Every link that was cascaded away with the node (ids cleared).
    pub links: Vec<Link>,
}

struct ObserverEntry {
    subscription: Subscription,
    observer: Box<dyn Observer>,
}

// =============================================================================
// GRAPH
// =============================================================================

/// The graph store.
#[derive(Default)]
pub struct Graph {
    /// Node storage: NodeId -> Node
    nodes: BTreeMap<NodeId, Node>,

    /// Link storage: LinkId -> Link
    links: BTreeMap<LinkId, Link>,

    /// Allocator shared by nodes and links.
    pub(crate) ids: IdentityAllocator,

    /// Registered observers, in registration order.
    observers: Vec<ObserverEntry>,

    /// Next subscription handle.
    next_subscription: u64,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes)
            .field("links", &self.links)
            .field("ids", &self.ids)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Subscription
    // -------------------------------------------------------------------------

    /// Register an observer. Observers are notified in registration order.
    pub fn subscribe(&mut self, observer: impl Observer + 'static) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription = self.next_subscription.saturating_add(1);
        self.observers.push(ObserverEntry {
            subscription,
            observer: Box::new(observer),
        });
        subscription
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.observers.len();
        self.observers
            .retain(|entry| entry.subscription != subscription);
        self.observers.len() != before
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn will_change(&mut self, event: &ChangeEvent) {
        tracing::trace!(event = event.name(), subject = ?event.subject(), "will change");
        self.notify(event, |observer, event, graph| observer.will_change(event, graph));
    }

    fn did_change(&mut self, event: &ChangeEvent) {
        tracing::trace!(event = event.name(), subject = ?event.subject(), "did change");
        self.notify(event, |observer, event, graph| observer.did_change(event, graph));
    }

    fn notify(
        &mut self,
        event: &ChangeEvent,
        call: impl Fn(&mut dyn Observer, &ChangeEvent, &Graph),
    ) {
        if self.observers.is_empty() {
            return;
        }
        // Observers get a shared view of the graph while they run.
        let mut observers = std::mem::take(&mut self.observers);
        for entry in &mut observers {
            call(entry.observer.as_mut(), event, self);
        }
        observers.append(&mut self.observers);
        self.observers = observers;
    }

    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------

    fn is_id_taken(&self, raw: u64) -> bool {
        self.nodes.contains_key(&NodeId(raw)) || self.links.contains_key(&LinkId(raw))
    }

    fn claim_id(&mut self, explicit: Option<u64>) -> u64 {
        match explicit {
            Some(0) => invariant_violation(format_args!("object id 0 is reserved")),
            Some(raw) if raw > MAX_OBJECT_ID => {
                invariant_violation(format_args!("object id {raw} is reserved"))
            }
            Some(raw) => {
                if self.is_id_taken(raw) {
                    invariant_violation(format_args!("id {raw} is already used in this graph"));
                }
                self.ids.mark_used(raw);
                raw
            }
            None => self.ids.next_id(),
        }
    }

    // -------------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------------

    /// Create and register a node, emitting `AddNode`.
    ///
    /// Panics if `id` already names a node or link of this graph.
    pub fn create_node(&mut self, labels: Labels, attributes: Attributes, id: Option<NodeId>) -> NodeId {
        self.add_node(Node {
            id,
            labels,
            attributes,
        })
    }

    /// Create a node with no labels and no attributes.
    pub fn new_node(&mut self) -> NodeId {
        self.create_node(Labels::new(), Attributes::new(), None)
    }

    /// Attach a node value, emitting `AddNode`.
    ///
    /// A value that carries an id keeps it; a detached value gets a fresh
    /// one. Panics if the carried id is already used in this graph.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.claim_id(node.id.map(|id| id.0)));
        node.id = Some(id);

        let event = ChangeEvent::AddNode(node.clone());
        self.will_change(&event);
        self.nodes.insert(id, node);
        self.did_change(&event);

        tracing::debug!(node = id.0, "node added");
        id
    }

    /// Remove a node and every incident link.
    ///
    /// Each incident link is disconnected (and announced) first, then
    /// `RemoveNode` is emitted for the node. Panics if the node is not part
    /// of this graph.
    pub fn remove_node(&mut self, id: NodeId) -> RemovedNode {
        if !self.nodes.contains_key(&id) {
            invariant_violation(format_args!("remove of {id}, which is not in this graph"));
        }

        let incident: Vec<LinkId> = self
            .links
            .iter()
            .filter(|(_, link)| link.is_incident(id))
            .map(|(link_id, _)| *link_id)
            .collect();
        let links: Vec<Link> = incident
            .into_iter()
            .map(|link_id| self.disconnect(link_id))
            .collect();

        let Some(node) = self.nodes.get(&id).cloned() else {
            invariant_violation(format_args!("{id} vanished during removal"));
        };
        let event = ChangeEvent::RemoveNode(node);
        self.will_change(&event);
        let removed = self.nodes.remove(&id);
        self.did_change(&event);

        let Some(mut node) = removed else {
            invariant_violation(format_args!("{id} vanished during removal"));
        };
        node.id = None;

        tracing::debug!(node = id.0, cascaded = links.len(), "node removed");
        RemovedNode { node, links }
    }

    // -------------------------------------------------------------------------
    // Links
    // -------------------------------------------------------------------------

    /// Create and register a link from `origin` to `target`, emitting `Connect`.
    ///
    /// Panics if either endpoint is not a node of this graph or if `id` is
    /// already used.
    pub fn connect(
        &mut self,
        origin: NodeId,
        target: NodeId,
        labels: Labels,
        attributes: Attributes,
        id: Option<LinkId>,
    ) -> LinkId {
        self.add_link(Link {
            id,
            origin,
            target,
            labels,
            attributes,
        })
    }

    /// Connect two nodes with an unlabelled, attribute-free link.
    pub fn connect_nodes(&mut self, origin: NodeId, target: NodeId) -> LinkId {
        self.connect(origin, target, Labels::new(), Attributes::new(), None)
    }

    /// Attach a link value, emitting `Connect`.
    ///
    /// A value that carries an id keeps it; a detached value gets a fresh
    /// one. Panics if an endpoint is missing or the id is already used.
    pub fn add_link(&mut self, mut link: Link) -> LinkId {
        for endpoint in [link.origin, link.target] {
            if !self.nodes.contains_key(&endpoint) {
                invariant_violation(format_args!(
                    "link endpoint {endpoint} is not in this graph"
                ));
            }
        }
        let id = LinkId(self.claim_id(link.id.map(|id| id.0)));
        link.id = Some(id);

        let event = ChangeEvent::Connect(link.clone());
        self.will_change(&event);
        self.links.insert(id, link);
        self.did_change(&event);

        tracing::debug!(link = id.0, "link connected");
        id
    }

    /// Remove a link, emitting `Disconnect`. Returns the detached value.
    ///
    /// Panics if the link is not part of this graph.
    pub fn disconnect(&mut self, id: LinkId) -> Link {
        let Some(link) = self.links.get(&id).cloned() else {
            invariant_violation(format_args!("disconnect of {id}, which is not in this graph"));
        };

        let event = ChangeEvent::Disconnect(link);
        self.will_change(&event);
        let removed = self.links.remove(&id);
        self.did_change(&event);

        let Some(mut link) = removed else {
            invariant_violation(format_args!("{id} vanished during disconnect"));
        };
        link.id = None;

        tracing::debug!(link = id.0, "link disconnected");
        link
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    /// Get an attribute of an attached object.
    #[must_use]
    pub fn attribute(&self, object: impl Into<ObjectId>, key: &str) -> Option<&Value> {
        self.object(object.into())?.attribute(key)
    }

    /// Set an attribute, emitting `SetAttribute`.
    pub fn set_attribute(
        &mut self,
        object: impl Into<ObjectId>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.update_attribute(object, key, Some(value.into()));
    }

    /// Remove an attribute, emitting `UnsetAttribute`.
    pub fn unset_attribute(&mut self, object: impl Into<ObjectId>, key: impl Into<String>) {
        self.update_attribute(object, key, None);
    }

    /// Set (`Some`) or remove (`None`) an attribute.
    ///
    /// Panics if the object is not part of this graph.
    pub fn update_attribute(
        &mut self,
        object: impl Into<ObjectId>,
        key: impl Into<String>,
        value: Option<Value>,
    ) {
        let object = object.into();
        let key = key.into();
        if !self.contains(object) {
            invariant_violation(format_args!(
                "attribute '{key}' set on {object}, which is not in this graph"
            ));
        }

        let event = match &value {
            Some(value) => ChangeEvent::SetAttribute(object, key.clone(), value.clone()),
            None => ChangeEvent::UnsetAttribute(object, key.clone()),
        };
        self.will_change(&event);
        if let Some(attributes) = self.attributes_mut(object) {
            match value {
                Some(value) => {
                    attributes.insert(key, value);
                }
                None => {
                    attributes.remove(&key);
                }
            }
        }
        self.did_change(&event);
    }

    fn attributes_mut(&mut self, object: ObjectId) -> Option<&mut Attributes> {
        match object {
            ObjectId::Node(id) => self.nodes.get_mut(&id).map(|node| &mut node.attributes),
            ObjectId::Link(id) => self.links.get_mut(&id).map(|link| &mut link.attributes),
        }
    }

    // -------------------------------------------------------------------------
    // Replay
    // -------------------------------------------------------------------------

    /// Apply one change event through the ordinary mutation operations.
    ///
    /// Events emitted while replaying are observed like any other mutation.
    pub fn apply_change(&mut self, event: &ChangeEvent) {
        match event {
            ChangeEvent::AddNode(node) => {
                self.add_node(node.clone());
            }
            ChangeEvent::RemoveNode(node) => {
                let Some(id) = node.id else {
                    invariant_violation(format_args!("replay of RemoveNode for a detached node"));
                };
                self.remove_node(id);
            }
            ChangeEvent::Connect(link) => {
                self.add_link(link.clone());
            }
            ChangeEvent::Disconnect(link) => {
                let Some(id) = link.id else {
                    invariant_violation(format_args!("replay of Disconnect for a detached link"));
                };
                self.disconnect(id);
            }
            ChangeEvent::SetAttribute(object, key, value) => {
                self.update_attribute(*object, key.clone(), Some(value.clone()));
            }
            ChangeEvent::UnsetAttribute(object, key) => {
                self.update_attribute(*object, key.clone(), None);
            }
        }
    }

    /// Apply a sequence of change events front to back.
    pub fn apply_changes(&mut self, events: &[ChangeEvent]) {
        for event in events {
            self.apply_change(event);
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Lookup a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Lookup a link by id.
    #[must_use]
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// Lookup either kind of object.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&dyn GraphObject> {
        match id {
            ObjectId::Node(id) => self.node(id).map(|node| node as &dyn GraphObject),
            ObjectId::Link(id) => self.link(id).map(|link| link as &dyn GraphObject),
        }
    }

    /// Resolve a raw identifier to whichever object currently holds it.
    #[must_use]
    pub fn resolve(&self, raw: u64) -> Option<ObjectId> {
        if self.nodes.contains_key(&NodeId(raw)) {
            Some(ObjectId::Node(NodeId(raw)))
        } else if self.links.contains_key(&LinkId(raw)) {
            Some(ObjectId::Link(LinkId(raw)))
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn contains_link(&self, id: LinkId) -> bool {
        self.links.contains_key(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        match id {
            ObjectId::Node(id) => self.contains_node(id),
            ObjectId::Link(id) => self.contains_link(id),
        }
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All links in id order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        self.nodes.keys().copied()
    }

    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> {
        self.links.keys().copied()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Links whose origin is `node`. Linear in the total link count.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |link| link.origin == node)
    }

    /// Links whose target is `node`. Linear in the total link count.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |link| link.target == node)
    }

    /// Links with `node` as origin or target. A self-loop appears once.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |link| link.is_incident(node))
    }

    /// Has incoming links but no outgoing ones.
    #[must_use]
    pub fn is_sink(&self, node: NodeId) -> bool {
        self.outgoing(node).next().is_none() && self.incoming(node).next().is_some()
    }

    /// Has outgoing links but no incoming ones.
    #[must_use]
    pub fn is_source(&self, node: NodeId) -> bool {
        self.incoming(node).next().is_none() && self.outgoing(node).next().is_some()
    }

    /// Has no links at all.
    #[must_use]
    pub fn is_orphan(&self, node: NodeId) -> bool {
        self.neighbours(node).next().is_none()
    }

    /// Nodes carrying `label`, in id order.
    pub fn nodes_with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Node> {
        self.nodes.values().filter(move |node| node.has_label(label))
    }
}

// =============================================================================
// TESTS
// =============================================================================
