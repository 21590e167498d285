//! # Change Events
//!
//! Every mutation of a [`Graph`] is described by exactly one [`ChangeEvent`]
//! and announced to registered [`Observer`]s in two synchronous phases:
//!
//! 1. `will_change`: the graph is still in its pre-mutation state
//! 2. `did_change`: the mutation has been applied
//!
//! Observers are invoked in registration order, in-line, inside the
//! mutating call. An observer must not mutate the graph it observes.

use crate::graph::Graph;
use crate::{Link, Node, ObjectId, Value};
use serde::{Deserialize, Serialize};

/// One atomic mutation of a graph.
///
/// Node and link payloads are snapshots of the object taken while it was
/// attached, so they carry their identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeEvent {
    AddNode(Node),
    RemoveNode(Node),
    Connect(Link),
    Disconnect(Link),
    SetAttribute(ObjectId, String, Value),
    UnsetAttribute(ObjectId, String),
}

impl ChangeEvent {
    /// The object this event is about.
    #[must_use]
    pub fn subject(&self) -> Option<ObjectId> {
        match self {
            Self::AddNode(node) | Self::RemoveNode(node) => node.id.map(ObjectId::Node),
            Self::Connect(link) | Self::Disconnect(link) => link.id.map(ObjectId::Link),
            Self::SetAttribute(object, _, _) | Self::UnsetAttribute(object, _) => Some(*object),
        }
    }

    /// Short name of the event tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddNode(_) => "add_node",
            Self::RemoveNode(_) => "remove_node",
            Self::Connect(_) => "connect",
            Self::Disconnect(_) => "disconnect",
            Self::SetAttribute(..) => "set_attribute",
            Self::UnsetAttribute(..) => "unset_attribute",
        }
    }
}

/// Which notification phase an observer is being called for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Will,
    Did,
}

/// Receives change notifications from a graph.
pub trait Observer {
    /// Called before the mutation; `graph` shows the old state.
    fn will_change(&mut self, _event: &ChangeEvent, _graph: &Graph) {}

    /// Called after the mutation; `graph` shows the new state.
    fn did_change(&mut self, _event: &ChangeEvent, _graph: &Graph) {}
}

/// Handle returned by [`Graph::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(pub(crate) u64);

/// Observer built from a closure receiving both phases.
pub struct ObserverFn<F>(F);

impl<F> Observer for ObserverFn<F>
where
    F: FnMut(Phase, &ChangeEvent, &Graph),
{
    fn will_change(&mut self, event: &ChangeEvent, graph: &Graph) {
        (self.0)(Phase::Will, event, graph);
    }

    fn did_change(&mut self, event: &ChangeEvent, graph: &Graph) {
        (self.0)(Phase::Did, event, graph);
    }
}

/// Wrap a closure as an [`Observer`].
pub fn observer_fn<F>(f: F) -> ObserverFn<F>
where
    F: FnMut(Phase, &ChangeEvent, &Graph),
{
    ObserverFn(f)
}
