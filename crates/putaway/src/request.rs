//! Allocation request/result records (one per putaway job line).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slotwise_core::{
    BranchId, CompanyId, Dimensions, HandlingUnitId, ItemId, JobId, LocationId, Quantity, Volume,
    Weight,
};

/// One putaway line asking the engine where its handling unit should go.
///
/// Optional data is modeled as `Option`/empty sets, never as implicit
/// defaults: a missing level limit is visibly "no limit", not a zero that
/// happens to mean something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub job_id: JobId,
    pub company_id: CompanyId,
    pub branch_id: BranchId,
    pub item_id: ItemId,
    pub handling_unit_id: HandlingUnitId,
    /// Requested totals; signed, negative = removal line.
    pub quantity: Quantity,
    pub volume: Volume,
    pub weight: Weight,
    /// Staging area the unit arrives from, if any.
    pub staging_from: Option<LocationId>,
    /// Required zone/type tag; `None` accepts any zone.
    pub required_zone: Option<String>,
    /// Maximum hierarchy depth to search; `None` searches all levels.
    pub level_limit: Option<usize>,
    /// Locations already taken by earlier lines of the same job.
    pub used_locations: HashSet<LocationId>,
    /// Locations the planner ruled out explicitly.
    pub excluded_locations: HashSet<LocationId>,
}

/// One allocated share, persisted as part of the job line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub location_id: LocationId,
    pub location_code: String,
    pub handling_unit_id: HandlingUnitId,
    pub quantity: Quantity,
    pub volume: Volume,
    pub weight: Weight,
    /// Scaled by `1/split_total` for audit display only; not a geometric
    /// subdivision of the unit.
    pub dimensions: Dimensions,
    /// 1-based position within the split ("2 of 3").
    pub split_index: u32,
    pub split_total: u32,
    /// Present on degraded allocations ("split across M of N requested
    /// locations"); absent otherwise.
    pub note: Option<String>,
    pub allocated_at: DateTime<Utc>,
}
