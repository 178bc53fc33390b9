//! Error types for workspace operations

use crate::series::SeriesId;
use sage_advisor::AdvisorError;
use thiserror::Error;

/// Result type alias for workspace operations
pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Workspace specific errors.
///
/// None of these are fatal: every failure is reported at the boundary
/// where it occurs and the workspace stays usable afterwards.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Upload parsed to zero usable rows
    #[error("No usable rows in {name}")]
    EmptyCsv { name: String },

    /// Operation referenced a series that is not in the workspace
    #[error("Series not found: {0}")]
    SeriesNotFound(SeriesId),

    /// Advisory service call failed
    #[error("Advisory error: {0}")]
    Advisor(#[from] AdvisorError),

    /// Shared state lock was poisoned
    #[error("Lock error: {0}")]
    Lock(String),
}
