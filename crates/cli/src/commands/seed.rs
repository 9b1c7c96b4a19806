use std::path::PathBuf;

use crate::commands::{build_runtime, load_config, CommandResult};
use stocky_store::fixtures::seed_catalog;
use stocky_store::JsonFileCatalogStore;

pub fn run(catalog: Option<PathBuf>, force: bool) -> CommandResult {
    let config = match load_config(catalog) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let path = config.store.catalog_path;
    if path.exists() && !force {
        return CommandResult::failure(
            "seed",
            "catalog_exists",
            format!("catalog already exists at `{}`; pass --force to overwrite", path.display()),
            4,
        );
    }

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let catalog = seed_catalog();
    let result = runtime.block_on(async {
        let store = JsonFileCatalogStore::new(path.clone());
        store.initialize(&catalog).await
    });

    match result {
        Ok(()) => CommandResult::success(
            "seed",
            format!("seeded {} products into `{}`", catalog.products.len(), path.display()),
        ),
        Err(error) => {
            CommandResult::failure("seed", "seed_execution", error.to_string(), 5)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn seed_writes_a_loadable_catalog() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");

        let result = run(Some(path.clone()), false);

        assert_eq!(result.exit_code, 0, "{}", result.output);
        let contents = std::fs::read_to_string(&path).expect("read");
        assert!(contents.contains("Monopoly Classic"));
    }

    #[test]
    fn seed_refuses_to_overwrite_without_force() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{}").expect("write");

        let result = run(Some(path.clone()), false);
        assert_ne!(result.exit_code, 0);
        assert!(result.output.contains("catalog_exists"));

        let overwritten = run(Some(path), true);
        assert_eq!(overwritten.exit_code, 0, "{}", overwritten.output);
    }
}
