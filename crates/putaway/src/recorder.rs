//! Allocation recording: occupancy writes + result rows.
//!
//! Writes go through a per-location compare-and-swap so two concurrent jobs
//! cannot both take the last unit of headroom. A lost CAS is retried once
//! against a fresh snapshot; if the location genuinely has no room left the
//! pass fails and every delta already applied is compensated, leaving no
//! half-committed allocation behind.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, warn};

use slotwise_core::LocationId;

use crate::error::{AllocationError, EngineResult};
use crate::location::{Occupancy, OccupancyDelta};
use crate::repository::RepositoryError;
use crate::request::{AllocationRequest, AllocationResult};
use crate::selector::Candidate;
use crate::splitter::Share;
use crate::validator;

/// What to do when fewer locations qualified than the unit asked for.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DegradedMode {
    /// Proceed with the reduced set, annotating every result row.
    #[default]
    Proceed,
    /// Fail the request instead of allocating across fewer locations.
    Strict,
}

/// Occupancy counter snapshot plus its CAS version.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct VersionedOccupancy {
    pub occupancy: Occupancy,
    pub version: u64,
}

/// Failure of one compare-and-apply attempt.
#[derive(Debug, Error)]
pub enum CasError {
    /// The counter moved since the snapshot was taken.
    #[error("occupancy version conflict (current version {})", current.version)]
    VersionConflict { current: VersionedOccupancy },

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Mutable occupancy seam. One counter per location, versioned.
///
/// `compare_and_apply` must be atomic per location; different locations may
/// be updated independently and in parallel.
pub trait OccupancyStore {
    /// Current counter; locations without a counter yet read as empty at
    /// version 0.
    fn snapshot(&self, id: LocationId) -> Result<VersionedOccupancy, RepositoryError>;

    /// Apply `delta` iff the counter is still at `expected_version`.
    fn compare_and_apply(
        &self,
        id: LocationId,
        expected_version: u64,
        delta: &OccupancyDelta,
    ) -> Result<VersionedOccupancy, CasError>;
}

/// In-memory occupancy counters.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryOccupancyStore {
    counters: RwLock<HashMap<LocationId, VersionedOccupancy>>,
}

impl InMemoryOccupancyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a committed occupancy value (tests/dev).
    pub fn seed(&self, id: LocationId, occupancy: Occupancy) -> Result<(), RepositoryError> {
        let mut map = self
            .counters
            .write()
            .map_err(|_| anyhow::anyhow!("occupancy map lock poisoned"))?;
        let entry = map.entry(id).or_default();
        entry.occupancy = occupancy;
        entry.version += 1;
        Ok(())
    }
}

impl OccupancyStore for InMemoryOccupancyStore {
    fn snapshot(&self, id: LocationId) -> Result<VersionedOccupancy, RepositoryError> {
        let map = self
            .counters
            .read()
            .map_err(|_| anyhow::anyhow!("occupancy map lock poisoned"))?;
        Ok(map.get(&id).copied().unwrap_or_default())
    }

    fn compare_and_apply(
        &self,
        id: LocationId,
        expected_version: u64,
        delta: &OccupancyDelta,
    ) -> Result<VersionedOccupancy, CasError> {
        let mut map = self
            .counters
            .write()
            .map_err(|_| RepositoryError::from(anyhow::anyhow!("occupancy map lock poisoned")))?;
        let entry = map.entry(id).or_default();
        if entry.version != expected_version {
            return Err(CasError::VersionConflict { current: *entry });
        }
        entry.occupancy = entry.occupancy.apply(delta);
        entry.version += 1;
        Ok(*entry)
    }
}

/// Materializes allocation results and updates occupancy.
#[derive(Debug)]
pub struct AllocationRecorder<'a, S: OccupancyStore> {
    store: &'a S,
}

impl<'a, S: OccupancyStore> AllocationRecorder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Persist one result per (location, share) pair, updating each
    /// location's counter by the allocated delta.
    ///
    /// `requested` is the location count the handling unit asked for; a
    /// smaller candidate set triggers the degraded-mode policy.
    pub fn record(
        &self,
        request: &AllocationRequest,
        candidates: &[Candidate],
        shares: &[Share],
        requested: u32,
        policy: DegradedMode,
    ) -> EngineResult<Vec<AllocationResult>> {
        debug_assert_eq!(candidates.len(), shares.len());

        let found = candidates.len() as u32;
        let note = if found < requested {
            match policy {
                DegradedMode::Strict => {
                    return Err(AllocationError::PartialCapacity { found, requested });
                }
                DegradedMode::Proceed => {
                    warn!(
                        job = %request.job_id,
                        found,
                        requested,
                        "degraded allocation: proceeding with reduced location set"
                    );
                    Some(format!(
                        "split across {found} of {requested} requested locations"
                    ))
                }
            }
        } else {
            None
        };

        let allocated_at = Utc::now();
        let mut applied: Vec<(LocationId, OccupancyDelta)> = Vec::with_capacity(shares.len());
        let mut results = Vec::with_capacity(shares.len());

        for (candidate, share) in candidates.iter().zip(shares) {
            let delta = OccupancyDelta::new(share.quantity, share.volume, share.weight);
            if let Err(e) = self.apply_with_retry(candidate, &delta) {
                self.compensate(&applied);
                return Err(e);
            }
            applied.push((candidate.location.id, delta));
            results.push(AllocationResult {
                location_id: candidate.location.id,
                location_code: candidate.location.code.clone(),
                handling_unit_id: request.handling_unit_id,
                quantity: share.quantity,
                volume: share.volume,
                weight: share.weight,
                dimensions: share.dimensions,
                split_index: share.split_index,
                split_total: share.split_total,
                note: note.clone(),
                allocated_at,
            });
        }

        Ok(results)
    }

    /// Final exact-share capacity check + CAS write, with one internal retry
    /// on contention.
    fn apply_with_retry(&self, candidate: &Candidate, delta: &OccupancyDelta) -> EngineResult<()> {
        // The selector pre-filtered with the even share; the exact share may
        // be larger (it carries the remainder), so re-check before writing.
        let check = validator::check_committed(&candidate.location, &candidate.occupancy, delta);
        if !check.fits {
            return Err(AllocationError::NoCapacity(format!(
                "location {}: {}",
                candidate.location.code, check.shortfall
            )));
        }

        match self
            .store
            .compare_and_apply(candidate.location.id, candidate.version, delta)
        {
            Ok(_) => Ok(()),
            Err(CasError::Storage(e)) => Err(AllocationError::Repository(e)),
            Err(CasError::VersionConflict { .. }) => {
                // One retry against fresh state, then give up.
                let fresh = self.store.snapshot(candidate.location.id)?;
                let check =
                    validator::check_committed(&candidate.location, &fresh.occupancy, delta);
                if !check.fits {
                    return Err(AllocationError::ConcurrentOverCommit {
                        location: candidate.location.id,
                    });
                }
                match self
                    .store
                    .compare_and_apply(candidate.location.id, fresh.version, delta)
                {
                    Ok(_) => Ok(()),
                    Err(CasError::Storage(e)) => Err(AllocationError::Repository(e)),
                    Err(CasError::VersionConflict { .. }) => {
                        Err(AllocationError::ConcurrentOverCommit {
                            location: candidate.location.id,
                        })
                    }
                }
            }
        }
    }

    /// Undo every delta applied in this pass, newest first.
    ///
    /// Compensations are removals and always fit; only version races can
    /// delay them, so loop until each one lands.
    fn compensate(&self, applied: &[(LocationId, OccupancyDelta)]) {
        for (id, delta) in applied.iter().rev() {
            let negated = delta.negated();
            loop {
                let snapshot = match self.store.snapshot(*id) {
                    Ok(s) => s,
                    Err(e) => {
                        error!(location = %id, error = %e, "compensation read failed");
                        break;
                    }
                };
                match self.store.compare_and_apply(*id, snapshot.version, &negated) {
                    Ok(_) => break,
                    Err(CasError::VersionConflict { .. }) => continue,
                    Err(CasError::Storage(e)) => {
                        error!(location = %id, error = %e, "compensation write failed");
                        break;
                    }
                }
            }
        }
    }
}
