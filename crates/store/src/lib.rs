pub mod fixtures;
pub mod json;
pub mod memory;

pub use json::JsonFileCatalogStore;
pub use memory::InMemoryCatalogStore;
