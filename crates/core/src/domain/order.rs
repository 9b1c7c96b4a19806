use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

/// Aggregate outcome of evaluating all mentions in one request against
/// current stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Available,
    Partial,
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Priced, status-tagged result of one availability evaluation. Created
/// fresh per request and never mutated afterward; reservation consumes it
/// read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable_items: Vec<String>,
}

/// Per-mention availability check, one per resolved item mention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockCheck {
    pub product: Product,
    pub requested_quantity: u32,
    pub current_stock: u32,
    pub available: bool,
}
