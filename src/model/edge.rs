//! Edges and the per-node relation-grouped edge map

use super::{NodeId, PropMap, RelId, Truth};

/// Directed, relation-typed arc to a target node
///
/// The source node is implicit: edges live in their source node's [`EdgeMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Relation id (see [`crate::consts::BLANK_RELATION`])
    pub rel: RelId,
    /// Target node
    pub node_id: NodeId,
    /// Confidence
    pub truth: Truth,
    /// Edge properties
    pub prop_map: PropMap,
}

impl Edge {
    /// Create an edge with full confidence and no properties
    #[must_use]
    pub fn new(rel: RelId, node_id: NodeId) -> Self {
        Self {
            rel,
            node_id,
            truth: Truth::CERTAIN,
            prop_map: PropMap::new(),
        }
    }
}

/// Outgoing edges of one node, grouped by relation
///
/// Relation groups keep the order in which each relation was first used on
/// this node; edges within a group keep insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeMap {
    groups: Vec<(RelId, Vec<Edge>)>,
}

impl EdgeMap {
    /// Create an empty edge map
    #[must_use]
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Append an edge to the group for its relation
    pub fn push(&mut self, edge: Edge) {
        match self.groups.iter_mut().find(|(rel, _)| *rel == edge.rel) {
            Some((_, list)) => list.push(edge),
            None => self.groups.push((edge.rel, vec![edge])),
        }
    }

    /// Edges under one relation, in insertion order
    #[must_use]
    pub fn get(&self, rel: RelId) -> Option<&[Edge]> {
        self.groups
            .iter()
            .find(|(r, _)| *r == rel)
            .map(|(_, list)| list.as_slice())
    }

    /// Relation groups in first-use order
    pub fn iter(&self) -> impl Iterator<Item = (RelId, &[Edge])> + '_ {
        self.groups.iter().map(|(rel, list)| (*rel, list.as_slice()))
    }

    /// All edges, group by group
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.groups.iter().flat_map(|(_, list)| list.iter())
    }

    /// Number of distinct relations used
    #[must_use]
    pub fn num_relations(&self) -> usize {
        self.groups.len()
    }

    /// Total number of edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.groups.iter().map(|(_, list)| list.len()).sum()
    }

    /// True if the node has no outgoing edges
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
