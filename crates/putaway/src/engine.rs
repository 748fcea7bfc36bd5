//! Allocation engine: one synchronous pass per putaway line.

use tracing::{info, warn};

use crate::error::{AllocationError, EngineResult};
use crate::recorder::{AllocationRecorder, DegradedMode, OccupancyStore};
use crate::repository::LocationRepository;
use crate::request::{AllocationRequest, AllocationResult};
use crate::selector::{self, Candidate};
use crate::splitter;
use crate::unit::HandlingUnit;
use crate::validator::CapacityValidator;

/// Engine configuration, passed in explicitly by the job-builder.
///
/// Nothing here is read from ambient process-wide state; the company-scoped
/// overflow switch arrives as a plain field.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Allow spreading one handling unit across several locations. Off
    /// replicates single-location behavior regardless of the unit's
    /// `max_locations`.
    pub overflow_enabled: bool,
    /// Policy when fewer locations qualify than the unit asked for.
    pub degraded_mode: DegradedMode,
    /// Permit re-use of locations already taken by earlier lines of the
    /// same job (shared occupancy). Capacity checks still apply.
    pub shared_occupancy: bool,
}

/// Terminal state of one allocation pass.
///
/// A request starts unresolved and ends in exactly one of these; the engine
/// never retries. Relaxing constraints (e.g. a wider level limit) and
/// re-submitting is the job-builder's call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// Single location took the whole unit.
    Resolved,
    /// Unit was split across `locations` locations.
    ResolvedOverflow { locations: u32 },
    /// No eligible location; nothing persisted.
    Failed,
}

/// The putaway allocation engine.
///
/// Runs inside the transaction that creates job-line records: reads during
/// selection, writes during recording, nothing else. Borrows its seams so
/// concurrent jobs can share one repository/store behind `Arc`s.
#[derive(Debug)]
pub struct AllocationEngine<'a, R, S> {
    repository: &'a R,
    occupancy: &'a S,
    config: EngineConfig,
}

impl<'a, R: LocationRepository, S: OccupancyStore> AllocationEngine<'a, R, S> {
    pub fn new(repository: &'a R, occupancy: &'a S, config: EngineConfig) -> Self {
        Self {
            repository,
            occupancy,
            config,
        }
    }

    /// Allocate storage for one putaway line.
    ///
    /// Returns one result row per receiving location. With overflow disabled
    /// or `max_locations == 1` the row count is exactly one.
    pub fn allocate(
        &self,
        request: &AllocationRequest,
        unit: &HandlingUnit,
    ) -> EngineResult<Vec<AllocationResult>> {
        if unit.max_locations == 0 {
            return Err(AllocationError::InvalidConfig(format!(
                "handling unit {} has max_locations 0",
                unit.id
            )));
        }
        let count_needed = if self.config.overflow_enabled {
            unit.max_locations
        } else {
            1
        };

        let rows = self
            .repository
            .candidates(request.company_id, request.branch_id)?;
        let mut candidates = Vec::with_capacity(rows.len());
        for location in rows {
            let snapshot = self.occupancy.snapshot(location.id)?;
            candidates.push(Candidate {
                location,
                occupancy: snapshot.occupancy,
                version: snapshot.version,
            });
        }

        let mut validator = CapacityValidator::new();
        let selected = selector::select(
            request,
            count_needed,
            candidates,
            &mut validator,
            self.config.shared_occupancy,
        );
        if selected.is_empty() {
            warn!(
                job = %request.job_id,
                unit = %unit.id,
                outcome = ?AllocationOutcome::Failed,
                "no eligible storage location"
            );
            return Err(AllocationError::NoCapacity(format!(
                "no eligible location for handling unit {}",
                unit.id
            )));
        }

        let shares = splitter::split(
            request.quantity,
            request.volume,
            request.weight,
            unit.dimensions,
            selected.len(),
        );

        let recorder = AllocationRecorder::new(self.occupancy);
        let results = recorder.record(
            request,
            &selected,
            &shares,
            count_needed,
            self.config.degraded_mode,
        )?;

        let outcome = if results.len() == 1 {
            AllocationOutcome::Resolved
        } else {
            AllocationOutcome::ResolvedOverflow {
                locations: results.len() as u32,
            }
        };
        info!(
            job = %request.job_id,
            unit = %unit.id,
            ?outcome,
            "allocation recorded"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{CapacityLimits, StorageLocation};
    use crate::recorder::InMemoryOccupancyStore;
    use crate::repository::InMemoryLocationRepository;
    use slotwise_core::{
        BranchId, CompanyId, Dimensions, HandlingUnitId, ItemId, JobId, LocationId, Quantity,
        Volume, Weight,
    };
    use std::collections::HashSet;

    fn test_request(company_id: CompanyId, branch_id: BranchId) -> AllocationRequest {
        AllocationRequest {
            job_id: JobId::new(),
            company_id,
            branch_id,
            item_id: ItemId::new(),
            handling_unit_id: HandlingUnitId::new(),
            quantity: Quantity::new(100),
            volume: Volume::new(30),
            weight: Weight::new(500),
            staging_from: None,
            required_zone: None,
            level_limit: None,
            used_locations: HashSet::new(),
            excluded_locations: HashSet::new(),
        }
    }

    fn test_unit(max_locations: u32) -> HandlingUnit {
        HandlingUnit {
            id: HandlingUnitId::new(),
            kind: "PALLET".to_string(),
            quantity: Quantity::new(100),
            volume: Volume::new(30),
            weight: Weight::new(500),
            dimensions: Dimensions::new(1200, 800, 1000),
            max_locations,
        }
    }

    fn add_location(
        repo: &InMemoryLocationRepository,
        company_id: CompanyId,
        branch_id: BranchId,
        code: &str,
        limits: CapacityLimits,
    ) -> LocationId {
        let id = LocationId::new();
        repo.insert(StorageLocation {
            id,
            company_id,
            branch_id,
            code: code.to_string(),
            path: vec!["HALL-A".to_string()],
            zone: "BULK".to_string(),
            priority: 0,
            limits,
            active: true,
            blocked: false,
            staging: false,
        })
        .unwrap();
        id
    }

    #[test]
    fn zero_max_locations_is_rejected_before_selection() {
        let repo = InMemoryLocationRepository::new();
        let store = InMemoryOccupancyStore::new();
        let engine = AllocationEngine::new(&repo, &store, EngineConfig::default());
        let company_id = CompanyId::new();
        let branch_id = BranchId::new();

        let err = engine
            .allocate(&test_request(company_id, branch_id), &test_unit(0))
            .unwrap_err();
        assert!(matches!(err, AllocationError::InvalidConfig(_)));
    }

    #[test]
    fn overflow_disabled_always_yields_one_result() {
        let repo = InMemoryLocationRepository::new();
        let store = InMemoryOccupancyStore::new();
        let company_id = CompanyId::new();
        let branch_id = BranchId::new();
        for code in ["A-01", "A-02", "A-03"] {
            add_location(&repo, company_id, branch_id, code, CapacityLimits::UNBOUNDED);
        }

        let engine = AllocationEngine::new(&repo, &store, EngineConfig::default());
        let results = engine
            .allocate(&test_request(company_id, branch_id), &test_unit(3))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].quantity, Quantity::new(100));
        assert_eq!((results[0].split_index, results[0].split_total), (1, 1));
        assert!(results[0].note.is_none());
    }

    #[test]
    fn single_location_unit_behaves_like_legacy_even_with_overflow_on() {
        let repo = InMemoryLocationRepository::new();
        let store = InMemoryOccupancyStore::new();
        let company_id = CompanyId::new();
        let branch_id = BranchId::new();
        add_location(&repo, company_id, branch_id, "A-01", CapacityLimits::UNBOUNDED);
        add_location(&repo, company_id, branch_id, "A-02", CapacityLimits::UNBOUNDED);

        let config = EngineConfig {
            overflow_enabled: true,
            ..EngineConfig::default()
        };
        let engine = AllocationEngine::new(&repo, &store, config);
        let results = engine
            .allocate(&test_request(company_id, branch_id), &test_unit(1))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].location_code, "A-01");
        assert_eq!(results[0].weight, Weight::new(500));
    }

    #[test]
    fn empty_branch_fails_with_no_capacity() {
        let repo = InMemoryLocationRepository::new();
        let store = InMemoryOccupancyStore::new();
        let config = EngineConfig {
            overflow_enabled: true,
            ..EngineConfig::default()
        };
        let engine = AllocationEngine::new(&repo, &store, config);

        let err = engine
            .allocate(
                &test_request(CompanyId::new(), BranchId::new()),
                &test_unit(2),
            )
            .unwrap_err();
        assert!(matches!(err, AllocationError::NoCapacity(_)));
    }

    #[test]
    fn used_locations_are_not_reused_within_a_job() {
        let repo = InMemoryLocationRepository::new();
        let store = InMemoryOccupancyStore::new();
        let company_id = CompanyId::new();
        let branch_id = BranchId::new();
        let first = add_location(&repo, company_id, branch_id, "A-01", CapacityLimits::UNBOUNDED);
        add_location(&repo, company_id, branch_id, "A-02", CapacityLimits::UNBOUNDED);

        let engine = AllocationEngine::new(&repo, &store, EngineConfig::default());
        let mut request = test_request(company_id, branch_id);
        request.used_locations.insert(first);

        let results = engine.allocate(&request, &test_unit(1)).unwrap();
        assert_eq!(results[0].location_code, "A-02");
    }
}
