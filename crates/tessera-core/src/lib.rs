//! # tessera-core
//!
//! The in-memory attributed multigraph for Tessera - THE LOGIC.
//!
//! This crate implements the semantic substrate of a personal knowledge
//! application: a directed multigraph whose nodes and links carry labels and
//! typed attributes, with change notification, reversible change recording
//! and neighborhood projections over labelled links.
//!
//! ## Layout
//!
//! - `types` → identifiers, attribute values, errors
//! - `object` → node and link values
//! - `graph` → the store that owns every attached object
//! - `change` → change events and observers
//! - `recorder` → inverse event recording and undo/redo history
//! - `neighborhood` → list, dictionary and slot views over a node's links
//! - `selection` → user-managed object selection
//! - `formats` → snapshot image and binary envelope
//!
//! ## Architectural Constraints
//!
//! - The graph is the only owner of nodes and links; everything else holds ids
//! - Deterministic: BTreeMap/BTreeSet only, iteration in id order
//! - Single-threaded and synchronous: observers run inside the mutating call
//! - Has NO async, NO network, NO file I/O (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod change;
pub mod formats;
pub mod graph;
pub mod ids;
pub mod neighborhood;
pub mod object;
pub mod primitives;
pub mod recorder;
pub mod selection;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use object::{Attributes, GraphObject, Labels, Link, Node, ObjectKind, attribute_map, label_set};
pub use types::{LinkId, NodeId, ObjectId, TesseraError, Value};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use change::{ChangeEvent, Observer, ObserverFn, Phase, Subscription, observer_fn};
pub use graph::{Graph, RemovedNode};
pub use ids::IdentityAllocator;
pub use recorder::{ChangeRecorder, History};
pub use selection::{ListenerId, ObjectSelection};

// =============================================================================
// RE-EXPORTS: Neighborhoods
// =============================================================================

pub use neighborhood::{
    Direction, IndexedNeighborhood, KeyedNeighborhood, LabelledNeighborhood, Neighborhood,
    NeighborhoodConfig, NeighborhoodKind, NeighborhoodOfOne, Selector,
};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{GraphSnapshot, PersistenceHeader, graph_from_bytes, graph_to_bytes};
