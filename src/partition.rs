//! Graph partition: row-stream ingestion and emission
//!
//! # Row sequencing
//!
//! ```text
//! node-row   src_name=A  edge_id=-1     ← A becomes the active node
//! edge-row   src_name=A  edge_id=0      ← A → dst
//! edge-row   src_name=A  edge_id=1      ← A → dst
//! node-row   src_name=B  edge_id=-1     ← B becomes the active node
//! edge-row   src_name=A  edge_id=0      ✗ sequencing violation
//! ```
//!
//! Ingestion is fail-fast: the first decode or sequencing error aborts the
//! load, reporting the row number and content. A partition that returned an
//! error must be discarded.

use crate::codec::{EdgeRow, NodeRow, RawRow, Row};
use crate::consts::NOT_FOUND;
use crate::error::{GraphError, Result};
use crate::model::{Edge, Node, NodeId, PropMap, RelId, Truth};
use crate::registry::{NodeRegistry, RelationTable};
use rustc_hash::FxHashSet;
use std::io::{self, Write};
use tracing::{debug, info};

/// What a node-row does when its name already exists as an edge-target
/// placeholder (a node auto-created because an earlier edge pointed at it)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderPolicy {
    /// First write wins: the placeholder keeps its fields and the full
    /// definition is dropped. Compatible with files written by earlier tools.
    #[default]
    KeepFirst,
    /// The first full definition overwrites the placeholder's fields
    /// (its id and edges are kept).
    Fill,
}

/// Self-contained graph shard owning its nodes, edges and relation table
///
/// # Example
///
/// ```
/// use nock::Partition;
///
/// let mut part = Partition::new(0);
/// let src = part.find_or_create_node("recipe").unwrap().node_id;
/// let dst = part.find_or_create_node("egg").unwrap().node_id;
/// part.create_edge(src, "uses_ingredient", dst).unwrap();
///
/// let rows: Vec<_> = part.iter_gen_rows(true).collect::<Result<_, _>>().unwrap();
/// assert_eq!(rows.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Partition {
    /// Partition identifier (cross-partition semantics are not modeled)
    pub part_id: i64,
    registry: NodeRegistry,
    relations: RelationTable,
    policy: PlaceholderPolicy,
    placeholders: FxHashSet<NodeId>,
}

impl Partition {
    /// Create an empty partition
    #[must_use]
    pub fn new(part_id: i64) -> Self {
        Self {
            part_id,
            registry: NodeRegistry::new(),
            relations: RelationTable::new(),
            policy: PlaceholderPolicy::default(),
            placeholders: FxHashSet::default(),
        }
    }

    /// Set the placeholder policy used by ingestion
    #[must_use]
    pub const fn with_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Placeholder policy used by ingestion
    #[must_use]
    pub const fn policy(&self) -> PlaceholderPolicy {
        self.policy
    }

    /// Node name table
    #[must_use]
    pub const fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Relation label table
    #[must_use]
    pub const fn relations(&self) -> &RelationTable {
        &self.relations
    }

    /// Number of registered nodes
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.registry.iter().count()
    }

    /// Number of edges across all nodes
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.registry.iter().map(Node::num_edges).sum()
    }

    /// Registered nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.registry.iter()
    }

    /// Node registered under `name`
    #[must_use]
    pub fn lookup_node(&self, name: &str) -> Option<&Node> {
        self.registry.lookup(name)
    }

    /// Node stored under `node_id`
    #[must_use]
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.registry.get(node_id)
    }

    /// Mutable access to the node stored under `node_id`
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.registry.get_mut(node_id)
    }

    /// Reserve (or look up) the id for a node name
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyName`] if `name` is empty
    pub fn create_node_name(&mut self, name: &str) -> Result<NodeId> {
        self.registry.find_or_create_name(name)
    }

    /// Add a fully formed node whose id was reserved with
    /// [`create_node_name`](Self::create_node_name)
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Internal`] if the id was not reserved for the name
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        self.registry.register(node)
    }

    /// Look up a node by name, registering a default node if it is new
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyName`] if `name` is empty
    pub fn find_or_create_node(&mut self, name: &str) -> Result<&mut Node> {
        let node_id = self.registry.find_or_create_name(name)?;

        if self.registry.get(node_id).is_none() {
            self.registry.register(Node::new(node_id, name))?;
        }

        self.node_mut_or_fault(node_id)
    }

    /// Integer id for a relation label, appending it when `create` is set
    pub fn get_edge_rel(&mut self, rel_name: &str, create: bool) -> Option<RelId> {
        if create {
            Some(self.relations.intern(rel_name))
        } else {
            self.relations.lookup(rel_name)
        }
    }

    /// Connect two registered nodes with full confidence and no properties
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Internal`] if either node is not registered
    pub fn create_edge(&mut self, src: NodeId, rel_name: &str, dst: NodeId) -> Result<&Edge> {
        self.create_edge_with(src, rel_name, dst, Truth::CERTAIN, PropMap::new())
    }

    /// Connect two registered nodes
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Internal`] if either node is not registered
    pub fn create_edge_with(
        &mut self,
        src: NodeId,
        rel_name: &str,
        dst: NodeId,
        truth: Truth,
        prop_map: PropMap,
    ) -> Result<&Edge> {
        if self.registry.get(dst).is_none() {
            return Err(GraphError::Internal(format!("edge target {dst} is not registered")));
        }

        let rel = self.relations.intern(rel_name);
        let node = self.node_mut_or_fault(src)?;
        node.add_edge(Edge {
            rel,
            node_id: dst,
            truth,
            prop_map,
        });

        node.edge_map
            .get(rel)
            .and_then(<[Edge]>::last)
            .ok_or_else(|| GraphError::Internal(format!("edge on node {src} vanished")))
    }

    /// Apply a decoded node-row: create the node, or resolve an existing one
    ///
    /// An existing node keeps its fields (first write wins), except that a
    /// placeholder is filled in under [`PlaceholderPolicy::Fill`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyName`] if the row's name is empty
    pub fn populate_node(&mut self, row: NodeRow) -> Result<NodeId> {
        if let Some(node_id) = self.registry.lookup(&row.name).map(|n| n.node_id) {
            if self.policy == PlaceholderPolicy::Fill && self.placeholders.remove(&node_id) {
                let node = self.node_mut_or_fault(node_id)?;
                node.truth = row.truth;
                node.shadow = row.shadow;
                node.is_rdf = row.is_rdf;
                node.label_set = row.label_set;
                node.prop_map = row.prop_map;
                debug!(node = %row.name, %node_id, "filled placeholder node");
            } else {
                debug!(node = %row.name, %node_id, "node already defined, row fields dropped");
            }

            return Ok(node_id);
        }

        let node_id = self.registry.find_or_create_name(&row.name)?;
        self.registry.register(Node {
            truth: row.truth,
            shadow: row.shadow,
            is_rdf: row.is_rdf,
            label_set: row.label_set,
            prop_map: row.prop_map,
            ..Node::new(node_id, row.name)
        })?;

        debug!(%node_id, "populated node");

        Ok(node_id)
    }

    /// Apply a decoded edge-row to the node `src`
    ///
    /// An unseen destination name auto-creates a placeholder node carrying the
    /// row's `truth` and `is_rdf`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyName`] for an empty destination, or
    /// [`GraphError::Internal`] if `src` is not registered
    pub fn populate_edge(&mut self, row: EdgeRow, src: NodeId) -> Result<()> {
        let dst = match self.registry.lookup(&row.dst_name) {
            Some(node) => node.node_id,
            None => {
                let node_id = self.registry.find_or_create_name(&row.dst_name)?;
                self.registry.register(Node {
                    truth: row.truth,
                    is_rdf: row.is_rdf,
                    ..Node::new(node_id, row.dst_name.as_str())
                })?;
                self.placeholders.insert(node_id);
                node_id
            }
        };

        let rel = self.relations.intern(&row.rel_name);
        self.node_mut_or_fault(src)?.add_edge(Edge {
            rel,
            node_id: dst,
            truth: row.truth,
            prop_map: row.prop_map,
        });

        debug!(%src, %rel, %dst, "populated edge");

        Ok(())
    }

    /// Build the partition from an ordered `(row_number, row)` stream
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::AtRow`] wrapping the first schema, range,
    /// empty-name or sequencing failure
    pub fn parse_rows<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = (u64, RawRow)>,
    {
        self.try_parse_rows(rows.into_iter().map(Ok::<_, std::convert::Infallible>))
    }

    /// Like [`parse_rows`](Self::parse_rows), for row sources that can fail
    ///
    /// # Errors
    ///
    /// Returns the first source error, or the first row failure wrapped in
    /// [`GraphError::AtRow`]
    pub fn try_parse_rows<I, E>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<(u64, RawRow), E>>,
        E: Into<GraphError>,
    {
        let mut active: Option<(NodeId, String)> = None;
        let mut num_rows = 0_u64;

        for item in rows {
            let (row_num, raw) = item.map_err(Into::into)?;

            self.parse_row(&raw, &mut active)
                .map_err(|e| e.at_row(row_num, &raw))?;

            num_rows += 1;
        }

        info!(
            part_id = self.part_id,
            rows = num_rows,
            nodes = self.num_nodes(),
            edges = self.num_edges(),
            relations = self.relations.len(),
            "parsed rows"
        );

        Ok(())
    }

    fn parse_row(&mut self, raw: &RawRow, active: &mut Option<(NodeId, String)>) -> Result<()> {
        match Row::decode(raw)? {
            Row::Node(node_row) => {
                let name = node_row.name.clone();
                let node_id = self.populate_node(node_row)?;
                *active = Some((node_id, name));
            }
            Row::Edge(edge_row) => {
                let src = match active {
                    Some((node_id, name)) if *name == edge_row.src_name => *node_id,
                    _ => {
                        return Err(GraphError::Sequencing {
                            found: edge_row.src_name,
                            active: active.as_ref().map(|(_, name)| name.clone()),
                        })
                    }
                };

                self.populate_edge(edge_row, src)?;
            }
        }

        Ok(())
    }

    /// Generate the row stream describing this partition
    ///
    /// Every node yields one node-row followed by its edge-rows, with
    /// `edge_id` counting 0, 1, 2, … across the whole node. When `sort` is
    /// set, output is deterministic regardless of ingestion order:
    /// - nodes in ascending name order
    /// - relation groups in ascending label order (not relation id order,
    ///   which depends on first use and so on the input format)
    /// - edges within a relation by ascending destination name (stable)
    ///
    /// Otherwise nodes follow registration order, relation groups their
    /// first use on the node, and edges their insertion order.
    ///
    /// A dangling edge target or an unregistered id is yielded as
    /// [`GraphError::Internal`].
    pub fn iter_gen_rows(&self, sort: bool) -> impl Iterator<Item = Result<Row>> + '_ {
        let order: Vec<NodeId> = if sort {
            self.registry.ids_by_name()
        } else {
            self.registry.ids().collect()
        };

        order
            .into_iter()
            .flat_map(move |node_id| match self.gen_node_rows(node_id, sort) {
                Ok(rows) => rows.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })
    }

    /// [`iter_gen_rows`](Self::iter_gen_rows), encoded to the flat wire shape
    pub fn iter_gen_raw_rows(&self, sort: bool) -> impl Iterator<Item = Result<RawRow>> + '_ {
        self.iter_gen_rows(sort).map(|row| row.map(|row| row.encode()))
    }

    fn gen_node_rows(&self, node_id: NodeId, sort: bool) -> Result<Vec<Row>> {
        let node = self.registry.get(node_id).ok_or_else(|| {
            GraphError::Internal(format!("node id {node_id} reserved but never registered"))
        })?;

        let mut rows = Vec::with_capacity(1 + node.num_edges());
        rows.push(Row::Node(NodeRow {
            name: node.name.clone(),
            truth: node.truth,
            shadow: node.shadow,
            is_rdf: node.is_rdf,
            label_set: node.label_set.clone(),
            prop_map: node.prop_map.clone(),
        }));

        let mut groups = node
            .edge_map
            .iter()
            .map(|(rel, edges)| Ok((self.rel_label(rel)?, edges)))
            .collect::<Result<Vec<_>>>()?;

        if sort {
            groups.sort_by(|a, b| a.0.cmp(b.0));
        }

        let mut edge_id = 0_u64;

        for (rel_name, edges) in groups {
            let mut targets = edges
                .iter()
                .map(|edge| Ok((self.node_name(edge.node_id)?, edge)))
                .collect::<Result<Vec<_>>>()?;

            if sort {
                targets.sort_by(|a, b| a.0.cmp(b.0));
            }

            for (dst_name, edge) in targets {
                rows.push(Row::Edge(EdgeRow {
                    src_name: node.name.clone(),
                    edge_id,
                    rel_name: rel_name.to_string(),
                    dst_name: dst_name.to_string(),
                    truth: edge.truth,
                    is_rdf: node.is_rdf,
                    prop_map: edge.prop_map.clone(),
                }));

                edge_id += 1;
            }
        }

        Ok(rows)
    }

    fn rel_label(&self, rel: RelId) -> Result<&str> {
        self.relations
            .label(rel)
            .ok_or_else(|| GraphError::Internal(format!("relation id {rel} has no label")))
    }

    fn node_name(&self, node_id: NodeId) -> Result<&str> {
        self.registry
            .get(node_id)
            .map(|node| node.name.as_str())
            .ok_or_else(|| GraphError::Internal(format!("dangling edge target {node_id}")))
    }

    fn node_mut_or_fault(&mut self, node_id: NodeId) -> Result<&mut Node> {
        self.registry
            .get_mut(node_id)
            .ok_or_else(|| GraphError::Internal(format!("node id {node_id} is not registered")))
    }

    /// Write a human-readable listing of every node and its edges
    ///
    /// # Errors
    ///
    /// Returns any error from the writer
    pub fn dump_data<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "partition {}: {} nodes, {} edges, {} relations",
            self.part_id,
            self.num_nodes(),
            self.num_edges(),
            self.relations.len()
        )?;

        for node in self.registry.iter() {
            writeln!(
                out,
                "node {} |{}| truth={} shadow={} is_rdf={} labels={:?} props={:?}",
                node.node_id,
                node.name,
                node.truth.value(),
                node.shadow,
                node.is_rdf,
                node.label_set,
                node.prop_map
            )?;

            for (rel, edges) in node.edge_map.iter() {
                let rel_name = self.relations.label(rel).unwrap_or_default();

                for edge in edges {
                    let dst_name = self
                        .registry
                        .get(edge.node_id)
                        .map_or("?", |dst| dst.name.as_str());

                    writeln!(
                        out,
                        "  -[{rel} |{rel_name}|]-> {} |{dst_name}| truth={} props={:?}",
                        edge.node_id,
                        edge.truth.value(),
                        edge.prop_map
                    )?;
                }
            }
        }

        Ok(())
    }
}

impl Default for Partition {
    fn default() -> Self {
        Self::new(NOT_FOUND)
    }
}
