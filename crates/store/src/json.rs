//! File-backed catalog store. The whole catalog is small enough to read
//! and rewrite on every operation, so there is no partial-update path:
//! each `update` reloads the file, applies the mutation in memory, and
//! persists the full state or nothing at all.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use stocky_core::catalog::{CatalogError, CatalogMutation, CatalogState, CatalogStore};
use stocky_core::domain::reservation::StockDelta;

pub struct JsonFileCatalogStore {
    path: PathBuf,
    // Serializes the load-mutate-persist cycle so concurrent updates
    // cannot interleave and commit against stale stock counts.
    write_lock: Mutex<()>,
}

impl JsonFileCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an initial catalog to disk, creating parent directories as
    /// needed. Used by seeding, not by the normal update path.
    pub async fn initialize(&self, state: &CatalogState) -> Result<(), CatalogError> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| CatalogError::Persist(source.to_string()))?;
        }
        write_state(&self.path, state).await
    }

    async fn read_state(&self) -> Result<CatalogState, CatalogError> {
        let contents = fs::read_to_string(&self.path).await.map_err(|source| {
            CatalogError::Load(format!("could not read `{}`: {source}", self.path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|source| {
            CatalogError::Load(format!("could not parse `{}`: {source}", self.path.display()))
        })
    }
}

async fn write_state(path: &Path, state: &CatalogState) -> Result<(), CatalogError> {
    let serialized = serde_json::to_string_pretty(state)
        .map_err(|source| CatalogError::Persist(source.to_string()))?;
    fs::write(path, serialized)
        .await
        .map_err(|source| CatalogError::Persist(source.to_string()))
}

#[async_trait::async_trait]
impl CatalogStore for JsonFileCatalogStore {
    async fn load(&self) -> Result<CatalogState, CatalogError> {
        self.read_state().await
    }

    async fn update(&self, mutation: CatalogMutation) -> Result<Vec<StockDelta>, CatalogError> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.read_state().await?;
        let deltas = match mutation(&mut state) {
            Ok(deltas) => deltas,
            Err(rejection) => {
                warn!(event_name = "catalog_update_rejected", error = %rejection);
                return Err(CatalogError::Rejected(rejection));
            }
        };

        write_state(&self.path, &state).await?;
        debug!(
            event_name = "catalog_persisted",
            path = %self.path.display(),
            delta_count = deltas.len(),
        );
        Ok(deltas)
    }
}
