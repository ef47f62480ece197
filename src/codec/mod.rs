//! Row codec: one flat row ⇄ one node or edge fragment
//!
//! [`RawRow`] is the 9-field wire shape every format adapter produces and
//! consumes. [`Row`] is its decoded form, a tagged union discriminated by the
//! sign of `edge_id`, so decode and encode sites handle node-rows and
//! edge-rows exhaustively.

pub mod props;
pub mod row;

pub use props::{load_labels, load_props, save_labels, save_props};
pub use row::{EdgeRow, NodeRow, RawRow, Row};
