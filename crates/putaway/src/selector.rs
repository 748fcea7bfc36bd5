//! Candidate location selection: ordered filter stages + deterministic ranking.
//!
//! Filtering is a pipeline of independently testable stages; ranking is a
//! total order (priority, then utilization, then code), so identical
//! location/occupancy snapshots and an identical request always produce the
//! identical ordered result.

use std::cmp::Ordering;

use tracing::debug;

use slotwise_core::{Quantity, Volume, Weight};

use crate::location::{Occupancy, OccupancyDelta, StorageLocation};
use crate::request::AllocationRequest;
use crate::validator::{CapacityValidator, Shortfall};

/// A storage location paired with the occupancy snapshot it was judged on.
///
/// The version pins the snapshot for the recorder's compare-and-swap: if the
/// counter moved between selection and recording, the write is refused and
/// re-checked against fresh state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub location: StorageLocation,
    pub occupancy: Occupancy,
    pub version: u64,
}

/// Why a candidate fell out of the pipeline. Logged, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Inactive,
    Blocked,
    Staging,
    ZoneMismatch,
    TooDeep,
    Excluded,
    AlreadyUsed,
    Capacity(Shortfall),
}

/// Non-capacity filter stages, applied in order.
pub fn eligibility(
    request: &AllocationRequest,
    candidate: &Candidate,
    shared_occupancy: bool,
) -> Result<(), RejectReason> {
    let location = &candidate.location;
    if !location.active {
        return Err(RejectReason::Inactive);
    }
    if location.blocked {
        return Err(RejectReason::Blocked);
    }
    if location.staging {
        return Err(RejectReason::Staging);
    }
    if let Some(zone) = &request.required_zone {
        if &location.zone != zone {
            return Err(RejectReason::ZoneMismatch);
        }
    }
    if let Some(limit) = request.level_limit {
        if location.depth() > limit {
            return Err(RejectReason::TooDeep);
        }
    }
    if request.excluded_locations.contains(&location.id) {
        return Err(RejectReason::Excluded);
    }
    if !shared_occupancy && request.used_locations.contains(&location.id) {
        return Err(RejectReason::AlreadyUsed);
    }
    Ok(())
}

/// Total ranking order: ascending priority rank, then lowest utilization
/// ratio (i128 cross-multiplication, no floats), then lexical code.
pub fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    a.location
        .priority
        .cmp(&b.location.priority)
        .then_with(|| cmp_utilization(a, b))
        .then_with(|| a.location.code.cmp(&b.location.code))
}

fn cmp_utilization(a: &Candidate, b: &Candidate) -> Ordering {
    let (a_used, a_max) = a.location.limits.utilization(&a.occupancy);
    let (b_used, b_max) = b.location.limits.utilization(&b.occupancy);
    // a_used/a_max <=> b_used/b_max, denominators are positive.
    ((a_used as i128) * (b_max as i128)).cmp(&((b_used as i128) * (a_max as i128)))
}

/// Conservative per-location share of `total` when splitting across `n`:
/// rounded up for additions so a location that barely fits the floor share
/// is not accepted and later handed the remainder it cannot take. Removals
/// pass capacity anyway, so plain truncation suffices.
fn conservative_share(total: i64, n: i64) -> i64 {
    // Signed `div_ceil` is unstable; this is the same rounding-up division
    // for the non-negative branch.
    if total >= 0 {
        total / n + if total % n != 0 { 1 } else { 0 }
    } else {
        total / n
    }
}

/// Rank and filter `candidates`, returning up to `count_needed` locations.
///
/// Accepting a candidate reserves its even share in the validator's ledger,
/// so later lines of the same pass see the reduced headroom. Returns fewer
/// than `count_needed` (possibly zero) when fewer qualify; signaling
/// degraded mode is the caller's decision.
pub fn select(
    request: &AllocationRequest,
    count_needed: u32,
    candidates: Vec<Candidate>,
    validator: &mut CapacityValidator,
    shared_occupancy: bool,
) -> Vec<Candidate> {
    debug_assert!(count_needed >= 1);

    let mut eligible: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match eligibility(request, &candidate, shared_occupancy) {
            Ok(()) => eligible.push(candidate),
            Err(reason) => {
                debug!(
                    location = %candidate.location.code,
                    ?reason,
                    "candidate rejected"
                );
            }
        }
    }

    eligible.sort_by(rank);

    let n = count_needed as i64;
    let share = OccupancyDelta::new(
        Quantity::new(conservative_share(request.quantity.units(), n)),
        Volume::new(conservative_share(request.volume.units(), n)),
        Weight::new(conservative_share(request.weight.units(), n)),
    );

    let mut selected = Vec::with_capacity(count_needed as usize);
    for candidate in eligible {
        if selected.len() == count_needed as usize {
            break;
        }
        let check = validator.check(&candidate.location, &candidate.occupancy, &share);
        if check.fits {
            validator.reserve(candidate.location.id, share);
            selected.push(candidate);
        } else {
            debug!(
                location = %candidate.location.code,
                reason = ?RejectReason::Capacity(check.shortfall),
                "candidate rejected"
            );
        }
    }

    selected
}
