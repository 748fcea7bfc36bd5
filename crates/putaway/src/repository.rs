//! Read access to the storage-location hierarchy.
//!
//! The engine never talks to a database directly; the job-builder hands it
//! an implementation of [`LocationRepository`]. The in-memory implementation
//! below backs tests and development setups.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use slotwise_core::{BranchId, CompanyId, LocationId};

use crate::location::StorageLocation;

/// Repository failure, split so callers can handle "not found" (expected)
/// without swallowing genuine storage faults.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The row does not exist. Expected and handled by callers.
    #[error("not found")]
    NotFound,

    /// Anything else (I/O, poisoned lock, driver error). Propagated
    /// unmodified to the job-builder.
    #[error("storage failure: {0}")]
    Unexpected(#[from] anyhow::Error),
}

/// Read seam over storage-location master data.
pub trait LocationRepository {
    /// Look up a single location by id.
    fn location(&self, id: LocationId) -> Result<StorageLocation, RepositoryError>;

    /// All locations of one company/branch, in stable id-insertion-free
    /// order (implementations must return a deterministic order).
    fn candidates(
        &self,
        company_id: CompanyId,
        branch_id: BranchId,
    ) -> Result<Vec<StorageLocation>, RepositoryError>;
}

/// In-memory location master.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryLocationRepository {
    locations: RwLock<HashMap<LocationId, StorageLocation>>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: StorageLocation) -> Result<(), RepositoryError> {
        let mut map = self
            .locations
            .write()
            .map_err(|_| anyhow::anyhow!("location map lock poisoned"))?;
        map.insert(location.id, location);
        Ok(())
    }
}

impl LocationRepository for InMemoryLocationRepository {
    fn location(&self, id: LocationId) -> Result<StorageLocation, RepositoryError> {
        let map = self
            .locations
            .read()
            .map_err(|_| anyhow::anyhow!("location map lock poisoned"))?;
        map.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    fn candidates(
        &self,
        company_id: CompanyId,
        branch_id: BranchId,
    ) -> Result<Vec<StorageLocation>, RepositoryError> {
        let map = self
            .locations
            .read()
            .map_err(|_| anyhow::anyhow!("location map lock poisoned"))?;
        let mut rows: Vec<StorageLocation> = map
            .values()
            .filter(|l| l.company_id == company_id && l.branch_id == branch_id)
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; pin it down by code.
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::CapacityLimits;

    fn test_location(company_id: CompanyId, branch_id: BranchId, code: &str) -> StorageLocation {
        StorageLocation {
            id: LocationId::new(),
            company_id,
            branch_id,
            code: code.to_string(),
            path: vec!["HALL-A".to_string()],
            zone: "BULK".to_string(),
            priority: 10,
            limits: CapacityLimits::UNBOUNDED,
            active: true,
            blocked: false,
            staging: false,
        }
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let repo = InMemoryLocationRepository::new();
        assert!(matches!(
            repo.location(LocationId::new()),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn candidates_are_branch_scoped_and_code_ordered() {
        let repo = InMemoryLocationRepository::new();
        let company_id = CompanyId::new();
        let branch_id = BranchId::new();
        repo.insert(test_location(company_id, branch_id, "B-02")).unwrap();
        repo.insert(test_location(company_id, branch_id, "A-01")).unwrap();
        repo.insert(test_location(company_id, BranchId::new(), "C-03"))
            .unwrap();

        let rows = repo.candidates(company_id, branch_id).unwrap();
        let codes: Vec<&str> = rows.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["A-01", "B-02"]);
    }
}
