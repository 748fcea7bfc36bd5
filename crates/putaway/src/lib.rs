//! Putaway allocation domain module.
//!
//! This crate decides *which storage locations receive how much* of an
//! arriving handling unit during one putaway pass. The pipeline is:
//! selector (rank + filter candidates) → splitter (exact shares) →
//! recorder (CAS occupancy writes + result rows). All of it is synchronous
//! deterministic domain logic; persistence sits behind the
//! [`LocationRepository`] and [`OccupancyStore`] seams.

pub mod engine;
pub mod error;
pub mod location;
pub mod recorder;
pub mod repository;
pub mod request;
pub mod selector;
pub mod splitter;
pub mod unit;
pub mod validator;

pub use engine::{AllocationEngine, AllocationOutcome, EngineConfig};
pub use error::{AllocationError, EngineResult};
pub use location::{CapacityLimit, CapacityLimits, Occupancy, OccupancyDelta, StorageLocation};
pub use recorder::{
    AllocationRecorder, CasError, DegradedMode, InMemoryOccupancyStore, OccupancyStore,
    VersionedOccupancy,
};
pub use repository::{InMemoryLocationRepository, LocationRepository, RepositoryError};
pub use request::{AllocationRequest, AllocationResult};
pub use selector::{Candidate, RejectReason};
pub use splitter::Share;
pub use unit::HandlingUnit;
pub use validator::{CapacityCheck, CapacityValidator, ReservationLedger, Shortfall};
