//! Allocation error taxonomy.

use slotwise_core::LocationId;
use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type used by the allocation engine.
pub type EngineResult<T> = Result<T, AllocationError>;

/// Failure modes of one allocation pass.
///
/// Degraded allocations (fewer locations than the unit asked for, default
/// policy) are not errors; they succeed with an annotation on the result
/// rows. Everything here blocks the putaway line with a specific reason.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Request-level misconfiguration, rejected before selection begins.
    #[error("invalid allocation config: {0}")]
    InvalidConfig(String),

    /// Zero eligible locations; nothing was persisted.
    #[error("no eligible storage location: {0}")]
    NoCapacity(String),

    /// Strict-mode only: fewer eligible locations than the handling unit
    /// requested.
    #[error("only {found} of {requested} requested storage locations eligible")]
    PartialCapacity { found: u32, requested: u32 },

    /// Lost the occupancy race on a location twice in a row; every delta
    /// already applied in this pass has been rolled back.
    #[error("concurrent over-commit on location {location}")]
    ConcurrentOverCommit { location: LocationId },

    /// Storage/read failures propagate unmodified.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
