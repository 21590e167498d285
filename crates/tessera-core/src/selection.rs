//! # Object Selection
//!
//! A user-managed list of graph objects with two listener streams:
//!
//! - selection listeners hear about every `set_objects`
//! - graph-change listeners hear about `did_change` events whose subject
//!   is currently selected, once the selection watches a graph
//!
//! The selection is a cheap shared handle. Clones see the same list and the
//! same listeners. Members that leave the graph stay selected until the
//! owner replaces the list.

use crate::change::{ChangeEvent, Observer, Subscription};
use crate::graph::Graph;
use crate::ObjectId;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle for removing a listener registered on an [`ObjectSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type SelectionListener = Box<dyn FnMut(&[ObjectId])>;
type GraphListener = Box<dyn FnMut(&ChangeEvent)>;

#[derive(Default)]
struct SelectionState {
    objects: Vec<ObjectId>,
    selection_listeners: Vec<(ListenerId, SelectionListener)>,
    graph_listeners: Vec<(ListenerId, GraphListener)>,
    next_listener: u64,
}

impl SelectionState {
    fn allocate_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.saturating_add(1);
        id
    }
}

/// Shared list of selected objects.
#[derive(Clone, Default)]
pub struct ObjectSelection {
    state: Rc<RefCell<SelectionState>>,
}

impl fmt::Debug for ObjectSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ObjectSelection")
            .field("objects", &state.objects)
            .field("selection_listeners", &state.selection_listeners.len())
            .field("graph_listeners", &state.graph_listeners.len())
            .finish()
    }
}

impl ObjectSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection that starts with `objects`. No listener is notified.
    #[must_use]
    pub fn with_objects(objects: Vec<ObjectId>) -> Self {
        let selection = Self::new();
        selection.state.borrow_mut().objects = objects;
        selection
    }

    /// The selected objects, in the order they were given.
    #[must_use]
    pub fn objects(&self) -> Vec<ObjectId> {
        self.state.borrow().objects.clone()
    }

    /// Replace the selection and notify selection listeners.
    pub fn set_objects(&self, objects: Vec<ObjectId>) {
        let mut listeners = {
            let mut state = self.state.borrow_mut();
            state.objects = objects.clone();
            std::mem::take(&mut state.selection_listeners)
        };
        tracing::debug!(selected = objects.len(), "selection changed");

        for (_, listener) in &mut listeners {
            listener(&objects);
        }
        self.restore_selection_listeners(listeners);
    }

    #[must_use]
    pub fn contains(&self, object: ObjectId) -> bool {
        self.state.borrow().objects.contains(&object)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().objects.is_empty()
    }

    /// Listen for replacements of the selected list.
    pub fn on_selection_change(&self, listener: impl FnMut(&[ObjectId]) + 'static) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_listener();
        state.selection_listeners.push((id, Box::new(listener)));
        id
    }

    /// Listen for graph changes to selected objects.
    pub fn on_graph_change(&self, listener: impl FnMut(&ChangeEvent) + 'static) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_listener();
        state.graph_listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener of either stream. Returns `false` if it was unknown.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.selection_listeners.len() + state.graph_listeners.len();
        state.selection_listeners.retain(|(listener, _)| *listener != id);
        state.graph_listeners.retain(|(listener, _)| *listener != id);
        state.selection_listeners.len() + state.graph_listeners.len() != before
    }

    /// Forward `graph`'s post-mutation events about selected objects.
    ///
    /// The graph only holds a weak reference: once every handle to this
    /// selection is dropped the observer goes quiet. Unsubscribe with the
    /// returned handle to detach it completely.
    pub fn watch(&self, graph: &mut Graph) -> Subscription {
        graph.subscribe(SelectionObserver {
            state: Rc::downgrade(&self.state),
        })
    }

    fn forward(&self, event: &ChangeEvent) {
        let mut listeners = {
            let mut state = self.state.borrow_mut();
            let selected = event
                .subject()
                .is_some_and(|subject| state.objects.contains(&subject));
            if !selected || state.graph_listeners.is_empty() {
                return;
            }
            std::mem::take(&mut state.graph_listeners)
        };

        for (_, listener) in &mut listeners {
            listener(event);
        }

        let mut state = self.state.borrow_mut();
        // Keep listeners registered while the old ones were running.
        listeners.append(&mut state.graph_listeners);
        state.graph_listeners = listeners;
    }

    fn restore_selection_listeners(&self, mut listeners: Vec<(ListenerId, SelectionListener)>) {
        let mut state = self.state.borrow_mut();
        listeners.append(&mut state.selection_listeners);
        state.selection_listeners = listeners;
    }
}

struct SelectionObserver {
    state: Weak<RefCell<SelectionState>>,
}

impl Observer for SelectionObserver {
    fn did_change(&mut self, event: &ChangeEvent, _graph: &Graph) {
        if let Some(state) = self.state.upgrade() {
            ObjectSelection { state }.forward(event);
        }
    }
}
