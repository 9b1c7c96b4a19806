//! In-memory catalog store for tests and ephemeral runs.

use tokio::sync::Mutex;

use stocky_core::catalog::{CatalogError, CatalogMutation, CatalogState, CatalogStore};
use stocky_core::domain::reservation::StockDelta;

pub struct InMemoryCatalogStore {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalogStore {
    pub fn new(state: CatalogState) -> Self {
        Self { state: Mutex::new(state) }
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn load(&self) -> Result<CatalogState, CatalogError> {
        Ok(self.state.lock().await.clone())
    }

    async fn update(&self, mutation: CatalogMutation) -> Result<Vec<StockDelta>, CatalogError> {
        let mut state = self.state.lock().await;
        // Mutate a copy so a rejected mutation leaves no trace, matching
        // the file store's all-or-nothing persistence.
        let mut draft = state.clone();
        let deltas = mutation(&mut draft)?;
        *state = draft;
        Ok(deltas)
    }
}
