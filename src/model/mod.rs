//! Property-graph data model
//!
//! Nodes own their outgoing edges, grouped by relation id. Every record
//! builds its own containers, so no two instances ever share a property map,
//! label set or edge list.

pub mod edge;
pub mod node;

pub use edge::{Edge, EdgeMap};
pub use node::Node;

use crate::error::{GraphError, Result};
use std::fmt;

/// Node identifier (dense, zero-indexed, assigned at first registration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of this node in the registry's id-indexed storage
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relation identifier: index into a partition's relation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelId(pub u32);

impl RelId {
    /// Position of this relation's label in the relation table
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// String-keyed map of JSON scalar values
pub type PropMap = serde_json::Map<String, serde_json::Value>;

/// Confidence value, always within `[0.0, 1.0]`
///
/// ```
/// use nock::Truth;
///
/// assert_eq!(Truth::new(0.25).unwrap().value(), 0.25);
/// assert!(Truth::new(1.5).is_err());
/// assert!(Truth::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Truth(f64);

impl Truth {
    /// Full confidence (the default)
    pub const CERTAIN: Self = Self(crate::consts::DEFAULT_TRUTH);

    /// Validate a raw confidence value
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Range`] if `value` is outside `[0.0, 1.0]` or NaN
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GraphError::Range(value))
        }
    }

    /// Raw confidence value
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for Truth {
    fn default() -> Self {
        Self::CERTAIN
    }
}

impl TryFrom<f64> for Truth {
    type Error = GraphError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}
