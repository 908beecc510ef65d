//! Provisional per-volume records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One package of a shipment, with an even share of the gross weight and
/// placeholder dimensions until it is measured in the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticVolume {
    /// Position in the shipment, starting at 1.
    pub index: u32,
    pub weight_kg: Decimal,
    pub height_cm: Decimal,
    pub width_cm: Decimal,
    pub length_cm: Decimal,
    pub volume_m3: Decimal,
}
