//! Node name interning and node ownership

use crate::error::{GraphError, Result};
use crate::model::{Node, NodeId};
use rustc_hash::FxHashMap;

/// Interns node names to dense ids and owns the [`Node`] records
///
/// Registration is two-step: [`find_or_create_name`](Self::find_or_create_name)
/// reserves an id for a name, then [`register`](Self::register) stores the
/// node under that id. The name index and the node slots stay a bijection
/// once every reserved id has been registered.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    next_node_id: u32,
    names: FxHashMap<String, NodeId>,
    nodes: Vec<Option<Node>>,
}

impl NodeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, reserving the next sequential id if unseen
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyName`] if `name` is empty
    pub fn find_or_create_name(&mut self, name: &str) -> Result<NodeId> {
        if name.is_empty() {
            return Err(GraphError::EmptyName("node"));
        }

        if let Some(node_id) = self.names.get(name) {
            return Ok(*node_id);
        }

        let node_id = NodeId(self.next_node_id);
        self.names.insert(name.to_string(), node_id);
        self.nodes.push(None);
        self.next_node_id += 1;

        Ok(node_id)
    }

    /// Store a fully formed node under its (already reserved) id
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Internal`] if the node's id was never reserved
    /// for the node's name
    pub fn register(&mut self, node: Node) -> Result<()> {
        if self.names.get(node.name.as_str()) != Some(&node.node_id) {
            return Err(GraphError::Internal(format!(
                "node id {} is not reserved for |{}|",
                node.node_id, node.name
            )));
        }

        let idx = node.node_id.index();
        self.nodes[idx] = Some(node);

        Ok(())
    }

    /// Id registered for `name`
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Node registered for `name`
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Node> {
        self.id_of(name).and_then(|node_id| self.get(node_id))
    }

    /// Node stored under `node_id`
    #[must_use]
    pub fn get(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id.index()).and_then(Option::as_ref)
    }

    /// Mutable access to the node stored under `node_id`
    pub fn get_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id.index()).and_then(Option::as_mut)
    }

    /// Next id to be handed out (equals the number of reserved names)
    #[must_use]
    pub const fn next_node_id(&self) -> u32 {
        self.next_node_id
    }

    /// Number of reserved names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no name was ever reserved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Registered nodes in id (registration) order
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().flatten()
    }

    /// Reserved ids in registration order, including any not yet registered
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.next_node_id).map(NodeId)
    }

    /// Reserved ids ordered by ascending name
    #[must_use]
    pub fn ids_by_name(&self) -> Vec<NodeId> {
        let mut named: Vec<(&str, NodeId)> = self
            .names
            .iter()
            .map(|(name, node_id)| (name.as_str(), *node_id))
            .collect();
        named.sort_unstable();

        named.into_iter().map(|(_, node_id)| node_id).collect()
    }
}
