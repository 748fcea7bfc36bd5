//! Capacity validation with in-flight reservations.
//!
//! Two lines of the same job must not both succeed against the same residual
//! headroom, so the validator checks proposed additions against committed
//! occupancy *plus* whatever earlier lines of the current pass have already
//! reserved.

use std::collections::HashMap;

use slotwise_core::LocationId;

use crate::location::{Occupancy, OccupancyDelta, StorageLocation};

/// Per-dimension overrun amounts for a rejected addition, in smallest units.
///
/// `None` means the dimension fits (or is unbounded); `Some(n)` means the
/// proposal exceeds the bound by `n`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Shortfall {
    pub quantity: Option<i64>,
    pub volume: Option<i64>,
    pub weight: Option<i64>,
}

impl Shortfall {
    pub const NONE: Self = Self {
        quantity: None,
        volume: None,
        weight: None,
    };

    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.volume.is_none() && self.weight.is_none()
    }
}

impl core::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut sep = "";
        for (name, over) in [
            ("quantity", self.quantity),
            ("volume", self.volume),
            ("weight", self.weight),
        ] {
            if let Some(over) = over {
                write!(f, "{sep}{name} over by {over}")?;
                sep = ", ";
            }
        }
        if sep.is_empty() {
            write!(f, "fits")?;
        }
        Ok(())
    }
}

/// Outcome of one capacity check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CapacityCheck {
    pub fits: bool,
    pub shortfall: Shortfall,
}

/// Capacity provisionally claimed by earlier lines of the current pass.
///
/// The ledger lives for one allocation pass and is dropped afterwards; it
/// never outlives the enclosing job transaction.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    reserved: HashMap<LocationId, OccupancyDelta>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserved_at(&self, id: LocationId) -> OccupancyDelta {
        self.reserved.get(&id).copied().unwrap_or(OccupancyDelta::ZERO)
    }

    pub fn reserve(&mut self, id: LocationId, delta: OccupancyDelta) {
        self.reserved
            .entry(id)
            .and_modify(|d| *d = d.combined(&delta))
            .or_insert(delta);
    }
}

/// Decides whether a proposed addition fits a location's residual capacity.
#[derive(Debug, Default)]
pub struct CapacityValidator {
    ledger: ReservationLedger,
}

impl CapacityValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `delta` against `committed` occupancy plus in-flight
    /// reservations. Unbounded dimensions and non-positive deltas always fit.
    pub fn check(
        &self,
        location: &StorageLocation,
        committed: &Occupancy,
        delta: &OccupancyDelta,
    ) -> CapacityCheck {
        let effective = committed.apply(&self.reserved_at(location.id));
        check_committed(location, &effective, delta)
    }

    /// Claim headroom on `location` for the rest of this pass.
    pub fn reserve(&mut self, location: LocationId, delta: OccupancyDelta) {
        self.ledger.reserve(location, delta);
    }

    fn reserved_at(&self, id: LocationId) -> OccupancyDelta {
        self.ledger.reserved_at(id)
    }
}

/// Capacity check against committed occupancy only (no reservations).
///
/// Used by the recorder for the final re-check right before the CAS write,
/// where the freshly read counter already includes everything committed.
pub fn check_committed(
    location: &StorageLocation,
    committed: &Occupancy,
    delta: &OccupancyDelta,
) -> CapacityCheck {
    let shortfall = Shortfall {
        quantity: location
            .limits
            .quantity
            .overrun(committed.quantity.units(), delta.quantity.units()),
        volume: location
            .limits
            .volume
            .overrun(committed.volume.units(), delta.volume.units()),
        weight: location
            .limits
            .weight
            .overrun(committed.weight.units(), delta.weight.units()),
    };
    CapacityCheck {
        fits: shortfall.is_empty(),
        shortfall,
    }
}
