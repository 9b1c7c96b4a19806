use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::{build_runtime, load_config, CommandResult};
use stocky_core::workflow::OrderWorkflow;
use stocky_store::JsonFileCatalogStore;

pub fn run(prompt: &str, catalog: Option<PathBuf>) -> CommandResult {
    if prompt.trim().is_empty() {
        return CommandResult::failure("ask", "empty_prompt", "prompt must not be empty", 2);
    }

    let config = match load_config(catalog) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "ask",
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
                "ask",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let outcome = runtime.block_on(async {
        let store = Arc::new(JsonFileCatalogStore::new(config.store.catalog_path));
        let workflow = OrderWorkflow::new(store);
        workflow.process(prompt).await
    });

    match serde_json::to_string_pretty(&outcome) {
        Ok(rendered) => CommandResult { exit_code: if outcome.success { 0 } else { 1 }, output: rendered },
        Err(error) => CommandResult::failure("ask", "serialization", error.to_string(), 3),
    }
}
