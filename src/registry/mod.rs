//! String interning tables: node names and relation labels
//!
//! Both tables hand out dense integer ids in order of first use and never
//! reassign or free them for the lifetime of their partition.

pub mod names;
pub mod relations;

pub use names::NodeRegistry;
pub use relations::RelationTable;
