//! Free-text product resolution and quantity extraction.
//!
//! Matching is a tiered heuristic, not a guaranteed-correct resolver: tiers
//! are tried in order, the first hit wins, and within a tier the
//! earliest-declared catalog product wins.

use crate::catalog::CatalogState;
use crate::domain::product::Product;

struct BrandRule {
    brand: &'static str,
    /// Line names that must appear in both the query and the product name
    /// before a brand hit is accepted. Empty means the brand token alone is
    /// enough.
    qualifiers: &'static [&'static str],
}

const BRAND_RULES: &[BrandRule] = &[
    BrandRule { brand: "lego", qualifiers: &["creator", "technic", "friends", "city", "star wars"] },
    BrandRule { brand: "playmobil", qualifiers: &["castle", "pirate", "farm"] },
    BrandRule { brand: "monopoly", qualifiers: &[] },
    BrandRule { brand: "barbie", qualifiers: &[] },
    BrandRule { brand: "hot wheels", qualifiers: &[] },
];

/// Resolve a query string to at most one catalog product.
pub fn match_product<'a>(catalog: &'a CatalogState, query: &str) -> Option<&'a Product> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    // Tier 1: exact product identifier.
    if let Some(product) =
        catalog.products.iter().find(|product| product.id.0.to_lowercase() == query)
    {
        return Some(product);
    }

    // Tier 2: exact display name.
    if let Some(product) =
        catalog.products.iter().find(|product| product.name.to_lowercase() == query)
    {
        return Some(product);
    }

    // Tier 3: brand token in both sides, gated on a shared qualifier where
    // the brand carries one.
    if let Some(product) = catalog
        .products
        .iter()
        .find(|product| brand_match(&query, &product.name.to_lowercase()))
    {
        return Some(product);
    }

    // Tier 4: substring fallback in either direction.
    catalog.products.iter().find(|product| {
        let name = product.name.to_lowercase();
        name.contains(&query) || first_word(&name).is_some_and(|word| query.contains(word))
    })
}

fn brand_match(query: &str, product_name: &str) -> bool {
    BRAND_RULES.iter().any(|rule| {
        if !query.contains(rule.brand) || !product_name.contains(rule.brand) {
            return false;
        }
        if rule.qualifiers.is_empty() {
            return true;
        }
        rule.qualifiers
            .iter()
            .any(|qualifier| query.contains(qualifier) && product_name.contains(qualifier))
    })
}

fn first_word(name: &str) -> Option<&str> {
    name.split_whitespace().next()
}

/// Derive a requested quantity from a text fragment: the first digit run,
/// optionally followed by an `x` multiplier token. Malformed or absent
/// numeric text defaults to 1; the result is never zero.
pub fn extract_quantity(query: &str) -> u32 {
    let mut digits = String::new();
    for character in query.chars() {
        if character.is_ascii_digit() {
            digits.push(character);
        } else if !digits.is_empty() {
            break;
        }
    }

    match digits.parse::<u32>() {
        Ok(quantity) if quantity > 0 => quantity,
        _ => 1,
    }
}
