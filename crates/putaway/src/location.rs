//! Storage location model: capacity limits and occupancy.

use serde::{Deserialize, Serialize};

use slotwise_core::{BranchId, CompanyId, Entity, LocationId, Quantity, Volume, Weight};

/// Capacity bound for one dimension.
///
/// Absence of a bound is an explicit state, not a magic sentinel value in
/// the counter itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityLimit {
    /// No bound; any addition fits.
    Unbounded,
    /// Hard ceiling in smallest units.
    Max(i64),
}

impl CapacityLimit {
    /// Overrun in smallest units if `used + delta` exceeds the bound.
    ///
    /// Non-positive deltas never overrun: capacity only gates additions.
    pub fn overrun(self, used: i64, delta: i64) -> Option<i64> {
        if delta <= 0 {
            return None;
        }
        match self {
            CapacityLimit::Unbounded => None,
            CapacityLimit::Max(max) => {
                let after = used as i128 + delta as i128;
                if after > max as i128 {
                    Some((after - max as i128) as i64)
                } else {
                    None
                }
            }
        }
    }
}

/// Per-dimension capacity bounds of a location.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityLimits {
    pub quantity: CapacityLimit,
    pub volume: CapacityLimit,
    pub weight: CapacityLimit,
}

impl CapacityLimits {
    pub const UNBOUNDED: Self = Self {
        quantity: CapacityLimit::Unbounded,
        volume: CapacityLimit::Unbounded,
        weight: CapacityLimit::Unbounded,
    };

    /// Utilization as a rational `(used, max)` pair, the maximum across all
    /// bounded dimensions. Unbounded-only locations report `(0, 1)`.
    ///
    /// Kept rational so callers can compare by i128 cross-multiplication
    /// instead of floating point; ordering stays bit-exact.
    pub fn utilization(&self, occupancy: &Occupancy) -> (i64, i64) {
        let mut best: (i64, i64) = (0, 1);
        let dims = [
            (self.quantity, occupancy.quantity.units()),
            (self.volume, occupancy.volume.units()),
            (self.weight, occupancy.weight.units()),
        ];
        for (limit, used) in dims {
            if let CapacityLimit::Max(max) = limit {
                if max > 0 {
                    let used = used.max(0);
                    // ratio used/max > best.0/best.1 ?
                    if (used as i128) * (best.1 as i128) > (best.0 as i128) * (max as i128) {
                        best = (used, max);
                    }
                }
            }
        }
        best
    }
}

/// Committed occupancy of a location, one counter per dimension.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub quantity: Quantity,
    pub volume: Volume,
    pub weight: Weight,
}

impl Occupancy {
    pub const ZERO: Self = Self {
        quantity: Quantity::ZERO,
        volume: Volume::ZERO,
        weight: Weight::ZERO,
    };

    pub fn apply(&self, delta: &OccupancyDelta) -> Self {
        Self {
            quantity: self.quantity + delta.quantity,
            volume: self.volume + delta.volume,
            weight: self.weight + delta.weight,
        }
    }
}

/// Signed change to a location's occupancy (negative = removal).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyDelta {
    pub quantity: Quantity,
    pub volume: Volume,
    pub weight: Weight,
}

impl OccupancyDelta {
    pub const ZERO: Self = Self {
        quantity: Quantity::ZERO,
        volume: Volume::ZERO,
        weight: Weight::ZERO,
    };

    pub fn new(quantity: Quantity, volume: Volume, weight: Weight) -> Self {
        Self {
            quantity,
            volume,
            weight,
        }
    }

    pub fn negated(&self) -> Self {
        Self {
            quantity: Quantity::ZERO - self.quantity,
            volume: Volume::ZERO - self.volume,
            weight: Weight::ZERO - self.weight,
        }
    }

    pub fn combined(&self, other: &Self) -> Self {
        Self {
            quantity: self.quantity + other.quantity,
            volume: self.volume + other.volume,
            weight: self.weight + other.weight,
        }
    }
}

/// An addressable bin/slot in the warehouse.
///
/// Occupancy counters are deliberately *not* part of this record; they live
/// behind the occupancy store and are read as versioned snapshots, so a
/// stale location row can never smuggle a stale counter past the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: LocationId,
    pub company_id: CompanyId,
    pub branch_id: BranchId,
    /// Human-addressable code, e.g. "A-01-03". Final ranking tie-break.
    pub code: String,
    /// Hierarchy path from the warehouse root, e.g. ["HALL-A", "AISLE-01"].
    pub path: Vec<String>,
    /// Zone/type tag matched against the request, e.g. "BULK", "COLD".
    pub zone: String,
    /// Ascending preference rank; lower = picked first.
    pub priority: u16,
    pub limits: CapacityLimits,
    pub active: bool,
    pub blocked: bool,
    /// Staging areas hold units *before* putaway; never a putaway target.
    pub staging: bool,
}

impl StorageLocation {
    /// Hierarchy depth of this location (number of path segments).
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

impl Entity for StorageLocation {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_limit_never_overruns() {
        assert_eq!(CapacityLimit::Unbounded.overrun(i64::MAX, i64::MAX), None);
    }

    #[test]
    fn negative_delta_never_overruns() {
        assert_eq!(CapacityLimit::Max(10).overrun(10, -5), None);
    }

    #[test]
    fn overrun_reports_exact_excess() {
        assert_eq!(CapacityLimit::Max(100).overrun(95, 10), Some(5));
        assert_eq!(CapacityLimit::Max(100).overrun(95, 5), None);
    }

    #[test]
    fn utilization_picks_fullest_bounded_dimension() {
        let limits = CapacityLimits {
            quantity: CapacityLimit::Max(100),
            volume: CapacityLimit::Max(10),
            weight: CapacityLimit::Unbounded,
        };
        let occ = Occupancy {
            quantity: Quantity::new(10),
            volume: Volume::new(9),
            weight: Weight::new(1_000_000),
        };
        // volume is at 90%, quantity at 10%; weight unbounded is ignored.
        assert_eq!(limits.utilization(&occ), (9, 10));
    }

    #[test]
    fn delta_roundtrip_is_exact() {
        let occ = Occupancy {
            quantity: Quantity::new(7),
            volume: Volume::new(3),
            weight: Weight::new(11),
        };
        let delta = OccupancyDelta::new(Quantity::new(5), Volume::new(2), Weight::new(9));
        assert_eq!(occ.apply(&delta).apply(&delta.negated()), occ);
    }
}
