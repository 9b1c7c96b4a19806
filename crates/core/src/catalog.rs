//! Catalog state and the persistence seam.
//!
//! The store contract is deliberately coarse: implementations load the full
//! catalog, hand a mutable copy to the caller's mutation, and persist the
//! full state back. A single mutual-exclusion section must guard the whole
//! load-modify-persist sequence so no two persisted writes interleave.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::product::{Product, ProductId};
use crate::domain::reservation::StockDelta;

/// Store-wide policy constants. Immutable for the lifetime of a process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorePolicy {
    pub name: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub currency: String,
    pub tax_rate: Decimal,
    pub shipping_cost: Decimal,
    pub free_shipping_threshold: Decimal,
}

/// Full persisted catalog: product records in stable declaration order plus
/// the store policy. Declaration order is load-bearing — the matcher breaks
/// ties in favour of the earliest-declared product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogState {
    pub products: Vec<Product>,
    pub policy: StorePolicy,
}

impl CatalogState {
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    pub fn get_mut(&mut self, id: &ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|product| &product.id == id)
    }

    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| product.category.eq_ignore_ascii_case(category))
            .collect()
    }
}

/// Reason a catalog mutation was refused before any write happened.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("insufficient stock for {name}: {available} available, {requested} requested")]
    InsufficientStock { name: String, available: u32, requested: u32 },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog could not be loaded: {0}")]
    Load(String),
    #[error("catalog could not be persisted: {0}")]
    Persist(String),
    #[error(transparent)]
    Rejected(#[from] MutationError),
}

/// A mutation applied under the store's critical section. Returning `Err`
/// aborts the update with nothing written; the deltas returned on success
/// describe every stock movement the mutation applied.
pub type CatalogMutation =
    Box<dyn FnOnce(&mut CatalogState) -> Result<Vec<StockDelta>, MutationError> + Send>;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Read the current persisted catalog. Never serves a state a failed
    /// update left behind.
    async fn load(&self) -> Result<CatalogState, CatalogError>;

    /// Load the full state, apply `mutation`, persist the full state.
    /// Implementations hold one global lock across the entire sequence and
    /// discard the in-memory state on any failure.
    async fn update(&self, mutation: CatalogMutation) -> Result<Vec<StockDelta>, CatalogError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::domain::product::{Product, ProductId};

    use super::{CatalogState, StorePolicy};

    fn state() -> CatalogState {
        CatalogState {
            products: vec![
                Product {
                    id: ProductId("p1".to_owned()),
                    name: "LEGO Creator Townhouse".to_owned(),
                    price: dec!(59.99),
                    stock: 12,
                    category: "building".to_owned(),
                    age_range: "8-14".to_owned(),
                    description: String::new(),
                },
                Product {
                    id: ProductId("p2".to_owned()),
                    name: "Monopoly Classic".to_owned(),
                    price: dec!(24.99),
                    stock: 20,
                    category: "board-games".to_owned(),
                    age_range: "8+".to_owned(),
                    description: String::new(),
                },
            ],
            policy: StorePolicy {
                name: "Toy Corner".to_owned(),
                location: "Amsterdam".to_owned(),
                phone: String::new(),
                email: String::new(),
                currency: "EUR".to_owned(),
                tax_rate: dec!(0.21),
                shipping_cost: dec!(4.95),
                free_shipping_threshold: dec!(50),
            },
        }
    }

    #[test]
    fn get_finds_products_by_id() {
        let state = state();
        assert_eq!(state.get(&ProductId("p2".to_owned())).map(|p| p.name.as_str()), Some("Monopoly Classic"));
        assert!(state.get(&ProductId("missing".to_owned())).is_none());
    }

    #[test]
    fn get_mut_allows_in_place_stock_changes() {
        let mut state = state();
        if let Some(product) = state.get_mut(&ProductId("p1".to_owned())) {
            product.stock = 3;
        }
        assert_eq!(state.get(&ProductId("p1".to_owned())).map(|p| p.stock), Some(3));
    }

    #[test]
    fn by_category_matches_case_insensitively() {
        let state = state();
        let games = state.by_category("Board-Games");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id.0, "p2");
        assert!(state.by_category("plush").is_empty());
    }
}
