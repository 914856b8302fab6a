//! Error types for tablegrid.

use crate::RowId;

/// Result type alias for tablegrid operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by the dataset and configuration entry points.
///
/// Background computation failures are never reported here: a cancelled or superseded
/// computation is a silent no-op for its version.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The dataset would not fit into the shared index buffer.
    #[error("dataset of {requested} rows exceeds view buffer capacity of {capacity}")]
    CapacityExceeded {
        /// Row count the mutation would have produced.
        requested: usize,
        /// Fixed capacity of the shared index buffer.
        capacity: usize,
    },

    /// Two rows share an id.
    #[error("duplicate row id {id}")]
    DuplicateRowId {
        /// The offending id.
        id: RowId,
    },

    /// A column index outside the column model.
    #[error("column {index} out of range for {count} columns")]
    ColumnOutOfRange {
        /// The requested column.
        index: usize,
        /// Current column count.
        count: usize,
    },

    /// Invalid options.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },
}
