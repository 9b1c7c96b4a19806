//! Canonical seed catalog used by the CLI `seed` command and by tests.

use rust_decimal_macros::dec;

use stocky_core::catalog::{CatalogState, StorePolicy};
use stocky_core::domain::product::{Product, ProductId};

fn product(
    id: &str,
    name: &str,
    price: rust_decimal::Decimal,
    stock: u32,
    category: &str,
    age_range: &str,
    description: &str,
) -> Product {
    Product {
        id: ProductId(id.to_owned()),
        name: name.to_owned(),
        price,
        stock,
        category: category.to_owned(),
        age_range: age_range.to_owned(),
        description: description.to_owned(),
    }
}

pub fn seed_policy() -> StorePolicy {
    StorePolicy {
        name: "Toy Corner".to_owned(),
        location: "Amsterdam".to_owned(),
        phone: "+31 20 555 0199".to_owned(),
        email: "orders@toycorner.example".to_owned(),
        currency: "EUR".to_owned(),
        tax_rate: dec!(0.21),
        shipping_cost: dec!(4.95),
        free_shipping_threshold: dec!(50),
    }
}

pub fn seed_catalog() -> CatalogState {
    CatalogState {
        products: vec![
            product(
                "lego-creator-townhouse",
                "LEGO Creator Townhouse",
                dec!(59.99),
                12,
                "building",
                "8-14",
                "Three-storey modular townhouse with rebuildable facade",
            ),
            product(
                "lego-technic-jeep",
                "LEGO Technic 4x4 Jeep",
                dec!(44.99),
                7,
                "building",
                "10-16",
                "Off-road jeep with working suspension and steering",
            ),
            product(
                "playmobil-knights-castle",
                "Playmobil Knights Castle",
                dec!(79.99),
                4,
                "playsets",
                "5-10",
                "Medieval castle with drawbridge, catapult and four knights",
            ),
            product(
                "monopoly-classic",
                "Monopoly Classic",
                dec!(24.99),
                20,
                "board-games",
                "8+",
                "The classic property trading game, Dutch edition",
            ),
            product(
                "barbie-dreamhouse",
                "Barbie Dreamhouse",
                dec!(199.99),
                2,
                "dolls",
                "4-10",
                "Three-storey dollhouse with elevator, pool and slide",
            ),
            product(
                "hot-wheels-track-builder",
                "Hot Wheels Track Builder Set",
                dec!(34.99),
                15,
                "vehicles",
                "6-12",
                "Modular stunt track with loop, launcher and two cars",
            ),
            product(
                "wooden-train-starter",
                "Wooden Train Starter Set",
                dec!(29.99),
                10,
                "wooden-toys",
                "3-7",
                "Beechwood track figure-eight with magnetic locomotive",
            ),
            product(
                "plush-bear-classic",
                "Classic Plush Bear",
                dec!(14.99),
                25,
                "plush",
                "0+",
                "Soft 30 cm teddy bear, machine washable",
            ),
        ],
        policy: seed_policy(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::seed_catalog;

    #[test]
    fn seed_product_ids_are_unique() {
        let catalog = seed_catalog();
        let ids: HashSet<_> = catalog.products.iter().map(|p| p.id.0.as_str()).collect();
        assert_eq!(ids.len(), catalog.products.len());
    }

    #[test]
    fn seed_covers_the_brand_vocabulary() {
        let catalog = seed_catalog();
        for brand in ["lego", "playmobil", "monopoly", "barbie", "hot wheels"] {
            assert!(
                catalog.products.iter().any(|p| p.name.to_lowercase().contains(brand)),
                "seed catalog is missing a {brand} product",
            );
        }
    }

    #[test]
    fn seed_policy_matches_store_terms() {
        let catalog = seed_catalog();
        assert_eq!(catalog.policy.currency, "EUR");
        assert!(catalog.policy.tax_rate > rust_decimal::Decimal::ZERO);
        assert!(catalog.policy.free_shipping_threshold > catalog.policy.shipping_cost);
    }
}
