//! File adapters over the canonical row stream
//!
//! Provides CSV (always available), Parquet persistence (`storage` feature)
//! and RDF file import/export (`rdf` feature). Each adapter only translates
//! between its physical format and `(row_number, RawRow)`; all graph
//! semantics stay in [`crate::Partition`].

pub mod csv;

#[cfg(feature = "storage")]
pub mod parquet;

#[cfg(feature = "rdf")]
pub mod rdf;

pub use self::csv::{iter_load_csv, write_csv};

#[cfg(feature = "storage")]
pub use self::parquet::{dump_parquet, read_rows_parquet, write_rows_parquet};

#[cfg(feature = "rdf")]
pub use self::rdf::{rdf_format_from_name, rdf_format_from_path, read_triples, write_triples};
