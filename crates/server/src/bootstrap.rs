use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use stocky_comm::{EmailRenderer, RenderError};
use stocky_core::catalog::CatalogStore;
use stocky_core::config::{AppConfig, ConfigError, LoadOptions};
use stocky_core::workflow::OrderWorkflow;
use stocky_store::JsonFileCatalogStore;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<JsonFileCatalogStore>,
    pub workflow: Arc<OrderWorkflow<JsonFileCatalogStore>>,
    pub emails: Arc<EmailRenderer>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("catalog file is not usable: {0}")]
    Catalog(#[from] stocky_core::catalog::CatalogError),
    #[error(transparent)]
    Templates(#[from] RenderError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(event_name = "bootstrap_start", "starting application bootstrap");
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let store = Arc::new(JsonFileCatalogStore::new(config.store.catalog_path.clone()));

    // Fail fast on an unreadable or corrupt catalog rather than serving
    // errors on every request.
    let catalog = store.load().await?;
    info!(
        event_name = "bootstrap_catalog_loaded",
        path = %config.store.catalog_path.display(),
        product_count = catalog.products.len(),
        "catalog loaded"
    );

    let workflow = Arc::new(OrderWorkflow::new(Arc::clone(&store)));
    let emails = Arc::new(EmailRenderer::new()?);

    Ok(Application { config, store, workflow, emails })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use stocky_core::config::{ConfigOverrides, LoadOptions};
    use stocky_store::fixtures::seed_catalog;
    use stocky_store::JsonFileCatalogStore;

    use super::{bootstrap, BootstrapError};

    fn options_for(path: PathBuf) -> LoadOptions {
        LoadOptions {
            config_path: Some(PathBuf::from("does-not-exist.toml")),
            overrides: ConfigOverrides {
                catalog_path: Some(path),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_succeeds_over_a_seeded_catalog() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        let seeder = JsonFileCatalogStore::new(path.clone());
        seeder.initialize(&seed_catalog()).await.expect("seed");

        let app = bootstrap(options_for(path)).await.expect("bootstrap");
        assert_eq!(app.config.server.max_prompt_chars, 1000);
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_a_missing_catalog() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let result = bootstrap(options_for(dir.path().join("missing.json"))).await;

        assert!(matches!(result, Err(BootstrapError::Catalog(_))));
    }
}
