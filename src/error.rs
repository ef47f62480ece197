//! Error types for row ingestion and emission.

use std::convert::Infallible;
use std::fmt::Display;
use thiserror::Error;

/// Errors raised by the row codec and the partition.
///
/// Every ingestion failure reaches the caller wrapped in [`GraphError::AtRow`],
/// which carries the offending row number and a rendering of the row content.
/// The first error aborts the load: a partition that reported an error must
/// be discarded.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Required field missing or mistyped on decode
    #[error("schema error: {0}")]
    Schema(String),

    /// `truth` outside `[0.0, 1.0]`
    #[error("truth value {0} outside [0.0, 1.0]")]
    Range(f64),

    /// Node or destination name empty/absent where required
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),

    /// Edge-row whose `src_name` does not match the active node, or an
    /// edge-row before any node-row
    #[error("|{found}| out of sequence (active node: {})", active.as_deref().unwrap_or("none"))]
    Sequencing {
        /// `src_name` of the rejected edge-row
        found: String,
        /// Name of the node defined by the most recent node-row
        active: Option<String>,
    },

    /// Any of the above, attached to the row that caused it; the failure
    /// itself is the error's `source()`
    #[error("error at input row {row_num}: {row}")]
    AtRow {
        /// Zero-based row number reported by the row source
        row_num: u64,
        /// Rendered row content
        row: String,
        /// Underlying failure
        #[source]
        source: Box<GraphError>,
    },

    /// Broken partition invariant detected while emitting rows
    #[error("internal consistency fault: {0}")]
    Internal(String),

    /// Delimited-text reader/writer failure
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl GraphError {
    /// Attach row context, unless the error already carries some.
    #[must_use]
    pub fn at_row(self, row_num: u64, row: impl Display) -> Self {
        match self {
            Self::AtRow { .. } => self,
            other => Self::AtRow {
                row_num,
                row: row.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The failure itself, with any row context peeled off.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::AtRow { source, .. } => source.root(),
            other => other,
        }
    }

    /// Row number of the offending input row, if known.
    #[must_use]
    pub const fn row_num(&self) -> Option<u64> {
        match self {
            Self::AtRow { row_num, .. } => Some(*row_num),
            _ => None,
        }
    }
}

impl From<Infallible> for GraphError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Result type for codec and partition operations.
pub type Result<T> = std::result::Result<T, GraphError>;
