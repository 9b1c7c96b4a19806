use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::{build_runtime, load_config, CommandResult};
use stocky_core::reservation::ReservationEngine;
use stocky_store::JsonFileCatalogStore;

pub fn run(threshold: Option<u32>, catalog: Option<PathBuf>) -> CommandResult {
    let config = match load_config(catalog) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "low-stock",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    let threshold = threshold.unwrap_or(config.store.low_stock_threshold);

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "low-stock",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let alerts = runtime.block_on(async {
        let store = Arc::new(JsonFileCatalogStore::new(config.store.catalog_path));
        let engine = ReservationEngine::new(store);
        engine.low_stock(threshold).await
    });

    match alerts {
        Ok(alerts) if alerts.is_empty() => CommandResult::success(
            "low-stock",
            format!("no products at or below a stock level of {threshold}"),
        ),
        Ok(alerts) => {
            let listing: Vec<String> = alerts
                .iter()
                .map(|alert| {
                    format!("  - {} ({}): {} left", alert.product_name, alert.product_id, alert.current_stock)
                })
                .collect();
            CommandResult::success(
                "low-stock",
                format!("{} product(s) need restocking:\n{}", alerts.len(), listing.join("\n")),
            )
        }
        Err(error) => CommandResult::failure("low-stock", "catalog_load", error.to_string(), 4),
    }
}
