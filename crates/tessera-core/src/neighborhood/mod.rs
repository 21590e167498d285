//! # Neighborhoods
//!
//! Read/write projections of a node's links.
//!
//! A [`Selector`] picks the links of a represented node that carry a given
//! label; the views below reinterpret that subset:
//!
//! - [`LabelledNeighborhood`] - plain collection
//! - [`IndexedNeighborhood`] - ordered list with dense renumbering
//! - [`KeyedNeighborhood`] - dictionary, one link per key
//! - [`NeighborhoodOfOne`] - optional single value
//!
//! Views hold no link state. Every read re-scans the graph, so a view is
//! never stale no matter how the graph was mutated in between.

mod indexed;
mod keyed;
mod labelled;
mod one;
mod selector;

pub use indexed::IndexedNeighborhood;
pub use keyed::KeyedNeighborhood;
pub use labelled::LabelledNeighborhood;
pub use one::NeighborhoodOfOne;
pub use selector::{Direction, Selector};

use crate::graph::Graph;
use crate::primitives::{DEFAULT_INDEX_ATTRIBUTE, DEFAULT_KEY_ATTRIBUTE, DEFAULT_LABEL_ATTRIBUTE};
use crate::{Link, NodeId, TesseraError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// KIND
// =============================================================================

/// The closed set of neighborhood shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborhoodKind {
    #[default]
    Any,
    Indexed,
    Keyed,
    One,
}

impl NeighborhoodKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Indexed => "indexed",
            Self::Keyed => "keyed",
            Self::One => "one",
        }
    }
}

impl fmt::Display for NeighborhoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NeighborhoodKind {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" | "labelled" => Ok(Self::Any),
            "indexed" => Ok(Self::Indexed),
            "keyed" => Ok(Self::Keyed),
            "one" => Ok(Self::One),
            _ => Err(TesseraError::UnknownNeighborhoodKind(s.to_string())),
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Attribute names used when building neighborhoods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborhoodConfig {
    pub label_attribute: String,
    pub index_attribute: String,
    pub key_attribute: String,
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            label_attribute: DEFAULT_LABEL_ATTRIBUTE.to_string(),
            index_attribute: DEFAULT_INDEX_ATTRIBUTE.to_string(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
        }
    }
}

impl NeighborhoodConfig {
    /// Selector for `label` using the configured label attribute.
    #[must_use]
    pub fn selector(&self, label: impl Into<String>, direction: Direction) -> Selector {
        Selector {
            label: label.into(),
            direction,
            label_attribute: self.label_attribute.clone(),
        }
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// A neighborhood of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Neighborhood {
    Any(LabelledNeighborhood),
    Indexed(IndexedNeighborhood),
    Keyed(KeyedNeighborhood),
    One(NeighborhoodOfOne),
}

impl Neighborhood {
    /// Build a view of `kind` with default attribute names.
    #[must_use]
    pub fn new(kind: NeighborhoodKind, node: NodeId, selector: Selector) -> Self {
        Self::build(kind, node, selector, &NeighborhoodConfig::default())
    }

    /// Build a view of `kind` with attribute names taken from `config`.
    #[must_use]
    pub fn configured(
        kind: NeighborhoodKind,
        node: NodeId,
        label: impl Into<String>,
        direction: Direction,
        config: &NeighborhoodConfig,
    ) -> Self {
        Self::build(kind, node, config.selector(label, direction), config)
    }

    fn build(
        kind: NeighborhoodKind,
        node: NodeId,
        selector: Selector,
        config: &NeighborhoodConfig,
    ) -> Self {
        match kind {
            NeighborhoodKind::Any => Self::Any(LabelledNeighborhood::new(node, selector)),
            NeighborhoodKind::Indexed => Self::Indexed(
                IndexedNeighborhood::new(node, selector)
                    .with_index_attribute(config.index_attribute.clone()),
            ),
            NeighborhoodKind::Keyed => Self::Keyed(
                KeyedNeighborhood::new(node, selector)
                    .with_key_attribute(config.key_attribute.clone()),
            ),
            NeighborhoodKind::One => Self::One(NeighborhoodOfOne::new(node, selector)),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NeighborhoodKind {
        match self {
            Self::Any(_) => NeighborhoodKind::Any,
            Self::Indexed(_) => NeighborhoodKind::Indexed,
            Self::Keyed(_) => NeighborhoodKind::Keyed,
            Self::One(_) => NeighborhoodKind::One,
        }
    }

    /// The underlying unordered view.
    #[must_use]
    pub const fn labelled(&self) -> &LabelledNeighborhood {
        match self {
            Self::Any(view) => view,
            Self::Indexed(view) => view.labelled(),
            Self::Keyed(view) => view.labelled(),
            Self::One(view) => view.labelled(),
        }
    }

    /// Matching links in the order the view defines.
    pub fn links<'g>(&self, graph: &'g Graph) -> Vec<&'g Link> {
        match self {
            Self::Any(view) => view.links(graph),
            Self::Indexed(view) => view.links(graph),
            Self::Keyed(view) => view.links(graph),
            Self::One(view) => view.labelled().links(graph),
        }
    }

    /// Member nodes in the order the view defines.
    pub fn nodes(&self, graph: &Graph) -> Vec<NodeId> {
        let selector = self.labelled().selector();
        self.links(graph)
            .into_iter()
            .map(|link| selector.endpoint(link))
            .collect()
    }

    pub fn count(&self, graph: &Graph) -> usize {
        self.labelled().count(graph)
    }
}
