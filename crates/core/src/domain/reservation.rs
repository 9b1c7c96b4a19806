use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// One stock movement applied by a committed reservation, cancellation, or
/// restock. The inverse delta re-applied via cancel restores the old value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub product_id: ProductId,
    pub old_stock: u32,
    pub new_stock: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationResult {
    pub success: bool,
    pub deltas: Vec<StockDelta>,
    pub message: String,
}

impl ReservationResult {
    pub fn committed(deltas: Vec<StockDelta>, message: impl Into<String>) -> Self {
        Self { success: true, deltas, message: message.into() }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self { success: false, deltas: Vec::new(), message: message.into() }
    }
}

/// Signed out-of-band stock adjustment, positive for restock and negative
/// for a manual correction. Results are clamped at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub product_id: ProductId,
    pub change: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub product_id: ProductId,
    pub product_name: String,
    pub current_stock: u32,
    pub threshold: u32,
}
