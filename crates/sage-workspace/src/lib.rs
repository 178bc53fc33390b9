//! Multi-series coordination for stocksage
//!
//! Owns the in-memory session state: every loaded series, which of them
//! are selected and primary, and the shared date range. The
//! [`Workspace`] state container exposes pure transition functions and
//! is decoupled from any rendering layer; the [`Coordinator`] wraps it
//! for the async advisory pipeline, merging each series' AI results
//! back by id.
//!
//! Summary, prediction, and recommendation are computed at most once
//! per series lifetime and are not refreshed when the date range
//! changes afterwards; this is a known staleness gap (see DESIGN.md).

pub mod coordinator;
pub mod error;
pub mod series;
pub mod workspace;

// Re-export main types for convenience
pub use coordinator::Coordinator;
pub use error::{Result, WorkspaceError};
pub use series::{DateRange, Series, SeriesId, PALETTE};
pub use workspace::Workspace;
