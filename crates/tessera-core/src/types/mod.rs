//! # Core Type Definitions
//!
//! This module contains the scalar types shared by every part of the core:
//! - Object identifiers (`NodeId`, `LinkId`, `ObjectId`)
//! - Attribute values (`Value`)
//! - Error types (`TesseraError`)
//!
//! ## Determinism Guarantees
//!
//! Identifiers implement `Ord` so they can key `BTreeMap`/`BTreeSet`.
//! `Value` carries floats and is therefore only `PartialEq`; use
//! [`Value::sort_cmp`] where a total order is required.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

// =============================================================================
// OBJECT IDENTIFIERS
// =============================================================================

/// Identifier of a node attached to a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identifier of a link attached to a graph.
///
/// Node and link identifiers are drawn from the same allocator, so a raw
/// value never names both a node and a link of the same graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub u64);

/// Identifier of either kind of graph object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectId {
    Node(NodeId),
    Link(LinkId),
}

impl ObjectId {
    /// The raw numeric identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        match self {
            Self::Node(NodeId(raw)) | Self::Link(LinkId(raw)) => raw,
        }
    }

    /// The node identifier, if this names a node.
    #[must_use]
    pub const fn as_node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Link(_) => None,
        }
    }

    /// The link identifier, if this names a link.
    #[must_use]
    pub const fn as_link(self) -> Option<LinkId> {
        match self {
            Self::Link(id) => Some(id),
            Self::Node(_) => None,
        }
    }
}

impl From<NodeId> for ObjectId {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<LinkId> for ObjectId {
    fn from(id: LinkId) -> Self {
        Self::Link(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link {}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => id.fmt(f),
            Self::Link(id) => id.fmt(f),
        }
    }
}

// =============================================================================
// ATTRIBUTE VALUES
// =============================================================================

/// A typed scalar attribute value.
///
/// Typing is advisory: the graph stores whatever it is given and never
/// validates values against a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Get the value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the value as a bool, if it is a bool.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is an int.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float. Ints are widened.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Whether the value is an int or a float.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Compare two numeric values. Returns `None` if either side is not numeric.
    #[must_use]
    pub fn numeric_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => Some(a.total_cmp(b)),
            (Self::Int(a), Self::Float(b)) => Some(int_float_cmp(*a, *b)),
            (Self::Float(a), Self::Int(b)) => Some(int_float_cmp(*b, *a).reverse()),
            _ => None,
        }
    }

    /// Total order over all values: bools, then numbers, then strings.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        let rank = |value: &Self| match value {
            Self::Bool(_) => 0u8,
            Self::Int(_) | Self::Float(_) => 1,
            Self::String(_) => 2,
        };
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => self
                .numeric_cmp(other)
                .unwrap_or_else(|| rank(self).cmp(&rank(other))),
        }
    }
}

/// Exact comparison of an int against a float.
///
/// Agrees with `f64::total_cmp` on the float side: `-0.0` sorts just below
/// `0`, and NaNs sort past every int on the side of their sign.
fn int_float_cmp(int: i64, float: f64) -> Ordering {
    // Both bounds are exactly -2^63 and 2^63.
    const LOWER: f64 = i64::MIN as f64;
    const UPPER: f64 = i64::MAX as f64;

    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= UPPER {
        return Ordering::Less;
    }
    if float < LOWER {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal if float > whole => Ordering::Less,
        Ordering::Equal if float < whole || (int == 0 && float.is_sign_negative()) => {
            Ordering::Greater
        }
        ordering => ordering,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Recoverable errors of the Tessera core.
///
/// These arise only from untrusted input (snapshots, configuration, names
/// typed by a user). Broken invariants inside the graph are programmer
/// errors and panic instead.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A snapshot decoded fine but describes an impossible graph.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// No object with the given raw identifier exists.
    #[error("Object not found: {0}")]
    ObjectNotFound(u64),

    /// The neighborhood kind name is not one of `any`, `indexed`, `keyed`, `one`.
    #[error("Unknown neighborhood kind: {0}")]
    UnknownNeighborhoodKind(String),

    /// The direction name is not `outgoing` or `incoming`.
    #[error("Unknown direction: {0}")]
    UnknownDirection(String),

    /// A configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Abort on a broken graph invariant.
///
/// Used for cross-graph references, id collisions and operations on
/// detached objects. These indicate a bug in the caller.
#[cold]
#[track_caller]
#[allow(clippy::panic)]
pub(crate) fn invariant_violation(detail: fmt::Arguments<'_>) -> ! {
    panic!("invariant violation: {detail}")
}

// =============================================================================
// TESTS
// =============================================================================
