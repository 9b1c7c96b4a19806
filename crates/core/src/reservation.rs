//! Stock reservation with all-or-nothing commit semantics.
//!
//! Every mutating operation goes through [`CatalogStore::update`] and
//! therefore through the store's single critical section: the full batch is
//! verified against freshly loaded state before any decrement is applied,
//! and a persist failure leaves the stored catalog untouched.

use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::{CatalogError, CatalogStore, MutationError};
use crate::domain::order::{OrderStatus, OrderSummary};
use crate::domain::product::ProductId;
use crate::domain::reservation::{
    LowStockAlert, ReservationResult, StockAdjustment, StockDelta,
};

pub struct ReservationEngine<S> {
    store: Arc<S>,
}

impl<S> ReservationEngine<S>
where
    S: CatalogStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Atomically decrement stock for every order line. Rejects without
    /// touching storage when the order status is `unavailable`; aborts the
    /// whole batch when any line is missing or short at commit time.
    pub async fn reserve(&self, order: &OrderSummary) -> ReservationResult {
        if order.status == OrderStatus::Unavailable {
            return ReservationResult::rejected("cannot reserve items: order is not available");
        }

        let lines = order.lines.clone();
        let outcome = self
            .store
            .update(Box::new(move |state| {
                for line in &lines {
                    let product = state
                        .get(&line.product_id)
                        .ok_or_else(|| MutationError::ProductNotFound(line.product_id.clone()))?;
                    if product.stock < line.quantity {
                        return Err(MutationError::InsufficientStock {
                            name: product.name.clone(),
                            available: product.stock,
                            requested: line.quantity,
                        });
                    }
                }

                let mut deltas = Vec::with_capacity(lines.len());
                for line in &lines {
                    if let Some(product) = state.get_mut(&line.product_id) {
                        let old_stock = product.stock;
                        product.stock = old_stock - line.quantity;
                        deltas.push(StockDelta {
                            product_id: product.id.clone(),
                            old_stock,
                            new_stock: product.stock,
                        });
                    }
                }
                Ok(deltas)
            }))
            .await;

        match outcome {
            Ok(deltas) => {
                info!(
                    event_name = "reservation.committed",
                    line_count = deltas.len(),
                    "stock reserved"
                );
                let count = deltas.len();
                ReservationResult::committed(deltas, format!("reserved {count} items"))
            }
            Err(error) => {
                warn!(event_name = "reservation.rejected", error = %error, "reserve aborted");
                ReservationResult::rejected(error.to_string())
            }
        }
    }

    /// Compensating cancel: re-apply the inverse delta for every order line.
    /// Best-effort — missing products are skipped and no maximum is
    /// re-validated.
    pub async fn cancel(&self, order: &OrderSummary) -> ReservationResult {
        let lines = order.lines.clone();
        let outcome = self
            .store
            .update(Box::new(move |state| {
                let mut deltas = Vec::new();
                for line in &lines {
                    if let Some(product) = state.get_mut(&line.product_id) {
                        let old_stock = product.stock;
                        product.stock = old_stock.saturating_add(line.quantity);
                        deltas.push(StockDelta {
                            product_id: product.id.clone(),
                            old_stock,
                            new_stock: product.stock,
                        });
                    }
                }
                Ok(deltas)
            }))
            .await;

        match outcome {
            Ok(deltas) => {
                let count = deltas.len();
                ReservationResult::committed(deltas, format!("cancelled reservation for {count} items"))
            }
            Err(error) => {
                warn!(event_name = "reservation.cancel_failed", error = %error, "cancel aborted");
                ReservationResult::rejected(error.to_string())
            }
        }
    }

    /// Increase one product's stock by `quantity`.
    pub async fn restock(&self, product_id: &ProductId, quantity: u32) -> ReservationResult {
        let target = product_id.clone();
        let outcome = self
            .store
            .update(Box::new(move |state| {
                let product = state
                    .get_mut(&target)
                    .ok_or_else(|| MutationError::ProductNotFound(target.clone()))?;
                let old_stock = product.stock;
                product.stock = old_stock.saturating_add(quantity);
                Ok(vec![StockDelta {
                    product_id: product.id.clone(),
                    old_stock,
                    new_stock: product.stock,
                }])
            }))
            .await;

        match outcome {
            Ok(deltas) => ReservationResult::committed(
                deltas,
                format!("restocked {product_id} with {quantity} units"),
            ),
            Err(error) => ReservationResult::rejected(error.to_string()),
        }
    }

    /// Out-of-band batch adjustment. Applies independently per product: a
    /// missing product does not abort the rest, and results clamp at zero.
    pub async fn apply_deltas(&self, adjustments: &[StockAdjustment]) -> ReservationResult {
        let adjustments = adjustments.to_vec();
        let outcome = self
            .store
            .update(Box::new(move |state| {
                let mut deltas = Vec::new();
                for adjustment in &adjustments {
                    if let Some(product) = state.get_mut(&adjustment.product_id) {
                        let old_stock = product.stock;
                        let next = (i64::from(old_stock) + adjustment.change).max(0);
                        product.stock = u32::try_from(next).unwrap_or(u32::MAX);
                        deltas.push(StockDelta {
                            product_id: product.id.clone(),
                            old_stock,
                            new_stock: product.stock,
                        });
                    }
                }
                Ok(deltas)
            }))
            .await;

        match outcome {
            Ok(deltas) => {
                let count = deltas.len();
                ReservationResult::committed(deltas, format!("adjusted {count} products"))
            }
            Err(error) => ReservationResult::rejected(error.to_string()),
        }
    }

    /// Products at or below `threshold` units of stock.
    pub async fn low_stock(&self, threshold: u32) -> Result<Vec<LowStockAlert>, CatalogError> {
        let state = self.store.load().await?;
        Ok(state
            .products
            .iter()
            .filter(|product| product.stock <= threshold)
            .map(|product| LowStockAlert {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                current_stock: product.stock,
                threshold,
            })
            .collect())
    }
}
