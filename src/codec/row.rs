//! Flat rows and their decoded node/edge forms

use super::props::{load_labels, load_props, save_labels, save_props};
use crate::consts::{BASED_LOCAL, NOT_FOUND};
use crate::error::{GraphError, Result};
use crate::model::{PropMap, Truth};
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One row of the canonical 9-column schema
///
/// Field order matches [`crate::consts::COLUMNS`]; readers resolve columns by
/// name, so physical column order in a file does not matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Node this row is about
    pub src_name: String,
    /// `< 0`: node-row; `>= 0`: edge-row of the most recent node
    pub edge_id: i64,
    /// Relation label (edge-rows only)
    pub rel_name: Option<String>,
    /// Target node name (edge-rows only)
    pub dst_name: Option<String>,
    /// Confidence in `[0.0, 1.0]`
    pub truth: f64,
    /// Foreign/local id marker
    pub shadow: i64,
    /// RDF-eligibility flag
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_rdf: bool,
    /// Comma-joined label set (node-rows only)
    pub labels: Option<String>,
    /// Compact JSON property map, or the empty sentinel
    pub props: String,
}

impl RawRow {
    /// True if this row defines a node rather than an edge
    #[must_use]
    pub const fn is_node_row(&self) -> bool {
        self.edge_id < 0
    }
}

impl fmt::Display for RawRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Accept `true`/`false` as well as the `True`/`False` spelling found in
/// CSV files written by earlier tooling.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = String::deserialize(deserializer)?;

    match flag.as_str() {
        "true" | "True" | "TRUE" | "1" => Ok(true),
        "false" | "False" | "FALSE" | "0" => Ok(false),
        other => Err(D::Error::custom(format!("invalid is_rdf flag |{other}|"))),
    }
}

/// Decoded node-row
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    /// Node name
    pub name: String,
    /// Confidence
    pub truth: Truth,
    /// Foreign/local id marker
    pub shadow: i64,
    /// RDF-eligibility flag
    pub is_rdf: bool,
    /// Labels
    pub label_set: BTreeSet<String>,
    /// Properties
    pub prop_map: PropMap,
}

/// Decoded edge-row
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    /// Name of the source node (must match the active node on ingestion)
    pub src_name: String,
    /// Position of this edge within its source node's emitted edges
    pub edge_id: u64,
    /// Relation label; empty for the blank relation
    pub rel_name: String,
    /// Target node name
    pub dst_name: String,
    /// Confidence
    pub truth: Truth,
    /// Source node's RDF-eligibility flag
    pub is_rdf: bool,
    /// Properties
    pub prop_map: PropMap,
}

/// A decoded row: either a node definition or one edge of the active node
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// `edge_id < 0`
    Node(NodeRow),
    /// `edge_id >= 0`
    Edge(EdgeRow),
}

impl Row {
    /// Decode a flat row
    ///
    /// # Errors
    ///
    /// - [`GraphError::EmptyName`] for an empty `src_name`, or an edge-row
    ///   with an absent/empty `dst_name`
    /// - [`GraphError::Range`] for `truth` outside `[0.0, 1.0]`
    /// - [`GraphError::Schema`] for a malformed `props` field
    pub fn decode(raw: &RawRow) -> Result<Self> {
        if raw.src_name.is_empty() {
            return Err(GraphError::EmptyName("node"));
        }

        let truth = Truth::new(raw.truth)?;
        let prop_map = load_props(&raw.props)?;

        match u64::try_from(raw.edge_id) {
            Err(_) => Ok(Self::Node(NodeRow {
                name: raw.src_name.clone(),
                truth,
                shadow: raw.shadow,
                is_rdf: raw.is_rdf,
                label_set: load_labels(raw.labels.as_deref()),
                prop_map,
            })),
            Ok(edge_id) => {
                let dst_name = match raw.dst_name.as_deref() {
                    Some(dst_name) if !dst_name.is_empty() => dst_name.to_string(),
                    _ => return Err(GraphError::EmptyName("destination")),
                };

                Ok(Self::Edge(EdgeRow {
                    src_name: raw.src_name.clone(),
                    edge_id,
                    rel_name: raw.rel_name.clone().unwrap_or_default(),
                    dst_name,
                    truth,
                    is_rdf: raw.is_rdf,
                    prop_map,
                }))
            }
        }
    }

    /// Encode into the flat wire shape
    #[must_use]
    pub fn encode(&self) -> RawRow {
        match self {
            Self::Node(node) => RawRow {
                src_name: node.name.clone(),
                edge_id: NOT_FOUND,
                rel_name: None,
                dst_name: None,
                truth: node.truth.value(),
                shadow: node.shadow,
                is_rdf: node.is_rdf,
                labels: Some(save_labels(&node.label_set)),
                props: save_props(&node.prop_map),
            },
            Self::Edge(edge) => RawRow {
                src_name: edge.src_name.clone(),
                #[allow(clippy::cast_possible_wrap)] // edge counts stay far below i64::MAX
                edge_id: edge.edge_id as i64,
                rel_name: Some(edge.rel_name.clone()),
                dst_name: Some(edge.dst_name.clone()),
                truth: edge.truth.value(),
                shadow: BASED_LOCAL,
                is_rdf: edge.is_rdf,
                labels: None,
                props: save_props(&edge.prop_map),
            },
        }
    }

    /// Name of the node this row is about
    #[must_use]
    pub fn src_name(&self) -> &str {
        match self {
            Self::Node(node) => &node.name,
            Self::Edge(edge) => &edge.src_name,
        }
    }

    /// RDF-eligibility flag carried by the row
    #[must_use]
    pub const fn is_rdf(&self) -> bool {
        match self {
            Self::Node(node) => node.is_rdf,
            Self::Edge(edge) => edge.is_rdf,
        }
    }
}

impl TryFrom<&RawRow> for Row {
    type Error = GraphError;

    fn try_from(raw: &RawRow) -> Result<Self> {
        Self::decode(raw)
    }
}

impl From<&Row> for RawRow {
    fn from(row: &Row) -> Self {
        row.encode()
    }
}
