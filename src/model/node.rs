//! Nodes (named graph entities)

use super::{Edge, EdgeMap, NodeId, PropMap, Truth};
use crate::consts::BASED_LOCAL;
use std::collections::BTreeSet;

/// Named graph entity with labels, properties and outgoing edges
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Dense id, fixed at first registration of `name`
    pub node_id: NodeId,
    /// Unique key within the partition
    pub name: String,
    /// [`BASED_LOCAL`], or a foreign id into another namespace
    pub shadow: i64,
    /// Whether this node participates in RDF export
    pub is_rdf: bool,
    /// Labels, iterated in ascending order
    pub label_set: BTreeSet<String>,
    /// Confidence
    pub truth: Truth,
    /// Node properties
    pub prop_map: PropMap,
    /// Outgoing edges, grouped by relation
    pub edge_map: EdgeMap,
}

impl Node {
    /// Create a locally based, non-RDF node with no labels, properties or edges
    #[must_use]
    pub fn new(node_id: NodeId, name: impl Into<String>) -> Self {
        Self {
            node_id,
            name: name.into(),
            shadow: BASED_LOCAL,
            is_rdf: false,
            label_set: BTreeSet::new(),
            truth: Truth::CERTAIN,
            prop_map: PropMap::new(),
            edge_map: EdgeMap::new(),
        }
    }

    /// Add an outgoing edge under its relation
    pub fn add_edge(&mut self, edge: Edge) {
        self.edge_map.push(edge);
    }

    /// Number of outgoing edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edge_map.num_edges()
    }
}
