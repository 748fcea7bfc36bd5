//! Handling unit model.

use serde::{Deserialize, Serialize};

use slotwise_core::{Dimensions, HandlingUnitId, Quantity, Volume, Weight};

/// A physical container (pallet, carton, ...) tracked as one storage unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlingUnit {
    pub id: HandlingUnitId,
    /// Free-form unit type, e.g. "PALLET", "CARTON".
    pub kind: String,
    pub quantity: Quantity,
    pub volume: Volume,
    pub weight: Weight,
    pub dimensions: Dimensions,
    /// How many storage locations this unit may be spread across when
    /// overflow is enabled. `1` keeps single-location behavior; `0` is
    /// rejected by the engine before selection begins.
    pub max_locations: u32,
}
