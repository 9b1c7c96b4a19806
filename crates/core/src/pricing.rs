//! Availability and pricing evaluation.
//!
//! Evaluation is purely advisory: it reads a catalog snapshot and never
//! mutates stock, so it can be called any number of times. Stock may still
//! change between an evaluation and a later reservation attempt; the
//! reservation engine re-validates at commit time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogState;
use crate::domain::mention::ItemMention;
use crate::domain::order::{OrderLine, OrderStatus, OrderSummary, StockCheck};
use crate::matching::{extract_quantity, match_product};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderEvaluation {
    pub summary: OrderSummary,
    pub stock_checks: Vec<StockCheck>,
}

/// Check one mention against current stock. `None` means the query resolved
/// to no product, which the caller records as "product not found" rather
/// than an error.
pub fn check_single_item(
    catalog: &CatalogState,
    query: &str,
    requested_quantity: Option<u32>,
) -> Option<StockCheck> {
    let product = match_product(catalog, query)?;
    let quantity = match requested_quantity {
        Some(quantity) if quantity > 0 => quantity,
        _ => extract_quantity(query),
    };

    Some(StockCheck {
        available: product.stock >= quantity,
        current_stock: product.stock,
        requested_quantity: quantity,
        product: product.clone(),
    })
}

/// Evaluate a list of item mentions into a priced, status-tagged order
/// summary.
pub fn evaluate_order(catalog: &CatalogState, mentions: &[ItemMention]) -> OrderEvaluation {
    let mut stock_checks = Vec::new();
    let mut lines = Vec::new();
    let mut unavailable_items = Vec::new();

    for mention in mentions {
        let Some(check) = check_single_item(catalog, &mention.query, mention.quantity) else {
            unavailable_items.push(format!("Product not found: \"{}\"", mention.query));
            continue;
        };

        if check.available {
            lines.push(OrderLine {
                product_id: check.product.id.clone(),
                product_name: check.product.name.clone(),
                quantity: check.requested_quantity,
                unit_price: check.product.price,
                subtotal: check.product.price * Decimal::from(check.requested_quantity),
            });
        } else {
            unavailable_items.push(format!(
                "{}: {} available, {} requested",
                check.product.name, check.current_stock, check.requested_quantity
            ));
        }
        stock_checks.push(check);
    }

    let subtotal: Decimal = lines.iter().map(|line| line.subtotal).sum();
    let tax = subtotal * catalog.policy.tax_rate;
    let shipping = if subtotal >= catalog.policy.free_shipping_threshold {
        Decimal::ZERO
    } else {
        catalog.policy.shipping_cost
    };
    let total = subtotal + tax + shipping;

    let status = if lines.is_empty() {
        OrderStatus::Unavailable
    } else if unavailable_items.is_empty() {
        OrderStatus::Available
    } else {
        OrderStatus::Partial
    };

    OrderEvaluation {
        summary: OrderSummary { lines, subtotal, tax, shipping, total, status, unavailable_items },
        stock_checks,
    }
}
