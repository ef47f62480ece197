//! Wire-level sentinels shared by the row codec and every format adapter
//!
//! These constants and the 9-column schema in [`COLUMNS`] are the durable
//! compatibility surface: Parquet, CSV and RDF adapters all translate into
//! and out of exactly this shape.

use crate::model::RelId;

/// Absent-id / lookup-miss sentinel; also the `edge_id` of every node-row
pub const NOT_FOUND: i64 = -1;

/// Reserved relation index for the blank (empty-label) relation
pub const BLANK_RELATION: RelId = RelId(0);

/// Default `shadow` value: the node is not a reference into a foreign namespace
pub const BASED_LOCAL: i64 = -1;

/// Encoded form of an empty property map (distinct from `"{}"`)
pub const PROPS_NONE: &str = "";

/// Legacy spelling of [`PROPS_NONE`], accepted on decode only
pub const PROPS_NULL: &str = "null";

/// Separator used to join a node's label set into one field
pub const LABEL_SEPARATOR: char = ',';

/// Default confidence for nodes and edges created without an explicit value
pub const DEFAULT_TRUTH: f64 = 1.0;

/// Column names of the canonical row schema, in emission order
pub const COLUMNS: [&str; 9] = [
    "src_name", "edge_id", "rel_name", "dst_name", "truth", "shadow", "is_rdf", "labels", "props",
];
