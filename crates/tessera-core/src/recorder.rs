//! # Change Recorder
//!
//! Observes the pre-mutation event stream of a graph while an activity runs
//! and builds the event list that undoes it.
//!
//! The recorder never mutates the graph. Replaying the returned list with
//! [`Graph::apply_changes`] restores node set, link set (with identifiers)
//! and attribute values as they were before the activity, provided nothing
//! else touched the graph in between.
//!
//! ## Inversion
//!
//! | observed               | inverse                                             |
//! |------------------------|-----------------------------------------------------|
//! | `AddNode(n)`           | `RemoveNode(n)`                                     |
//! | `RemoveNode(n)`        | `Connect(l)` per link still incident to n, `AddNode(n)` |
//! | `Connect(l)`           | `Disconnect(l)`                                     |
//! | `Disconnect(l)`        | `Connect(l)`                                        |
//! | `SetAttribute(o,k,_)`  | previous value of `o[k]`, or `UnsetAttribute(o,k)`  |
//! | `UnsetAttribute(o,k)`  | same as above                                       |

use crate::change::{ChangeEvent, Observer};
use crate::graph::Graph;
use std::cell::RefCell;
use std::rc::Rc;

/// Appends inverses to a shared log from `will_change`.
struct RecordingObserver {
    log: Rc<RefCell<Vec<ChangeEvent>>>,
}

impl Observer for RecordingObserver {
    fn will_change(&mut self, event: &ChangeEvent, graph: &Graph) {
        self.log
            .borrow_mut()
            .extend(ChangeRecorder::inverse_of(event, graph));
    }
}

/// Records reversible activities on a graph.
pub struct ChangeRecorder;

impl ChangeRecorder {
    /// Run `activity` and return the events that undo it, in replay order.
    pub fn record<F>(graph: &mut Graph, activity: F) -> Vec<ChangeEvent>
    where
        F: FnOnce(&mut Graph),
    {
        Self::record_with(graph, activity).1
    }

    /// Like [`record`](Self::record), also returning the activity's result.
    pub fn record_with<F, R>(graph: &mut Graph, activity: F) -> (R, Vec<ChangeEvent>)
    where
        F: FnOnce(&mut Graph) -> R,
    {
        let log = Rc::new(RefCell::new(Vec::new()));
        let subscription = graph.subscribe(RecordingObserver {
            log: Rc::clone(&log),
        });

        let result = activity(graph);

        graph.unsubscribe(subscription);
        let mut inverse = log.take();
        inverse.reverse();

        tracing::debug!(events = inverse.len(), "activity recorded");
        (result, inverse)
    }

    /// The events undoing `event`, computed against the pre-mutation graph.
    #[must_use]
    pub fn inverse_of(event: &ChangeEvent, graph: &Graph) -> Vec<ChangeEvent> {
        match event {
            ChangeEvent::AddNode(node) => vec![ChangeEvent::RemoveNode(node.clone())],
            ChangeEvent::RemoveNode(node) => {
                let mut inverse: Vec<ChangeEvent> = node
                    .id()
                    .map(|id| {
                        graph
                            .neighbours(id)
                            .cloned()
                            .map(ChangeEvent::Connect)
                            .collect()
                    })
                    .unwrap_or_default();
                inverse.push(ChangeEvent::AddNode(node.clone()));
                inverse
            }
            ChangeEvent::Connect(link) => vec![ChangeEvent::Disconnect(link.clone())],
            ChangeEvent::Disconnect(link) => vec![ChangeEvent::Connect(link.clone())],
            ChangeEvent::SetAttribute(object, key, _) | ChangeEvent::UnsetAttribute(object, key) => {
                let restore = match graph.attribute(*object, key) {
                    Some(old) => ChangeEvent::SetAttribute(*object, key.clone(), old.clone()),
                    None => ChangeEvent::UnsetAttribute(*object, key.clone()),
                };
                vec![restore]
            }
        }
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// Undo/redo stacks of recorded activities.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Vec<ChangeEvent>>,
    redo: Vec<Vec<ChangeEvent>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `activity` as one undoable step.
    ///
    /// Clears the redo stack. An activity that changes nothing leaves both
    /// stacks untouched.
    pub fn perform<F, R>(&mut self, graph: &mut Graph, activity: F) -> R
    where
        F: FnOnce(&mut Graph) -> R,
    {
        let (result, inverse) = ChangeRecorder::record_with(graph, activity);
        if !inverse.is_empty() {
            self.undo.push(inverse);
            self.redo.clear();
        }
        result
    }

    /// Undo the most recent step. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, graph: &mut Graph) -> bool {
        let Some(inverse) = self.undo.pop() else {
            return false;
        };
        let redo = ChangeRecorder::record(graph, |graph| graph.apply_changes(&inverse));
        self.redo.push(redo);
        tracing::debug!(remaining = self.undo.len(), "undo");
        true
    }

    /// Redo the most recently undone step. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self, graph: &mut Graph) -> bool {
        let Some(forward) = self.redo.pop() else {
            return false;
        };
        let undo = ChangeRecorder::record(graph, |graph| graph.apply_changes(&forward));
        self.undo.push(undo);
        tracing::debug!(remaining = self.redo.len(), "redo");
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Forget every recorded step.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
