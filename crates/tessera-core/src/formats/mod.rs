//! # Formats
//!
//! Whole-graph representations used by the app layer's loaders and writers.
//!
//! - `snapshot`: the serde [`GraphSnapshot`] type and its validating restore
//! - `persistence`: the binary envelope (`TSRA` header + postcard payload)
//!
//! Pure transformations only. File I/O lives in the app layer.

pub mod persistence;
pub mod snapshot;

pub use persistence::{PersistenceHeader, graph_from_bytes, graph_to_bytes};
pub use snapshot::GraphSnapshot;
