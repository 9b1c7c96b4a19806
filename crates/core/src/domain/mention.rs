use serde::{Deserialize, Serialize};

/// A text fragment from a customer prompt interpreted as referring to one
/// product, with an optional explicit quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMention {
    pub query: String,
    pub quantity: Option<u32>,
}

impl ItemMention {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), quantity: None }
    }

    pub fn with_quantity(query: impl Into<String>, quantity: u32) -> Self {
        Self { query: query.into(), quantity: Some(quantity) }
    }
}
