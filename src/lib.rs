//! nock: row-oriented property-graph codec
//!
//! # Overview
//!
//! nock converts between a flat 9-column row representation, an in-memory
//! property graph ([`Partition`]), and RDF triples, with byte-identical round
//! trips when emitting in sorted order.
//!
//! # Quick Start
//!
//! ```no_run
//! use nock::Partition;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Load a partition from Parquet
//! let mut part = Partition::new(0);
//! part.load_parquet("recipes.parquet").await?;
//!
//! // Emit deterministically as CSV
//! let csv = part.to_csv_string(true)?;
//! print!("{csv}");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Model**: [`Node`], [`Edge`], [`Truth`] and dense integer ids
//! - **Registry**: name and relation interning ([`NodeRegistry`], [`RelationTable`])
//! - **Codec**: flat [`RawRow`] ⇄ typed [`Row`] (node-row or edge-row)
//! - **Partition**: sequenced ingestion and deterministic emission
//! - **RDF**: triple ⇄ row translation layered outside the partition
//! - **Storage**: CSV, Parquet and RDF file adapters over the row stream

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod consts;
pub mod error;
pub mod model;
pub mod partition;
pub mod registry;
pub mod storage;

// RDF triple adapter (optional)
#[cfg(feature = "rdf")]
pub mod rdf;

// Re-export core types
pub use codec::{EdgeRow, NodeRow, RawRow, Row};
pub use error::{GraphError, Result};
pub use model::{Edge, EdgeMap, Node, NodeId, PropMap, RelId, Truth};
pub use partition::{Partition, PlaceholderPolicy};
pub use registry::{NodeRegistry, RelationTable};
