use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::{build_runtime, load_config, CommandResult};
use stocky_core::domain::product::ProductId;
use stocky_core::reservation::ReservationEngine;
use stocky_store::JsonFileCatalogStore;

pub fn run(product_id: &str, quantity: u32, catalog: Option<PathBuf>) -> CommandResult {
    let config = match load_config(catalog) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "restock",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "restock",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let outcome = runtime.block_on(async {
        let store = Arc::new(JsonFileCatalogStore::new(config.store.catalog_path));
        let engine = ReservationEngine::new(store);
        engine.restock(&ProductId(product_id.to_owned()), quantity).await
    });

    if outcome.success {
        CommandResult::success("restock", outcome.message)
    } else {
        CommandResult::failure("restock", "restock_rejected", outcome.message, 4)
    }
}

#[cfg(test)]
mod tests {
    use stocky_store::fixtures::seed_catalog;
    use stocky_store::JsonFileCatalogStore;

    use super::run;

    fn seeded_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("catalog.json");
        let runtime =
            tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime");
        runtime
            .block_on(JsonFileCatalogStore::new(path.clone()).initialize(&seed_catalog()))
            .expect("seed");
        path
    }

    #[test]
    fn restock_increments_a_known_product() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = seeded_path(&dir);

        let result = run("barbie-dreamhouse", 5, Some(path));
        assert_eq!(result.exit_code, 0, "{}", result.output);
    }

    #[test]
    fn restock_rejects_an_unknown_product() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = seeded_path(&dir);

        let result = run("no-such-product", 5, Some(path));
        assert_ne!(result.exit_code, 0);
        assert!(result.output.contains("restock_rejected"));
    }
}
