use std::env;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use stocky_cli::commands::{ask, low_stock, restock, seed};

#[test]
fn seed_then_ask_round_trips_through_the_catalog_file() {
    with_env(&[], || {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");

        let seeded = seed::run(Some(path.clone()), false);
        assert_eq!(seeded.exit_code, 0, "expected seed success: {}", seeded.output);
        let payload = parse_payload(&seeded.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let asked = ask::run("do you have monopoly in stock?", Some(path));
        assert_eq!(asked.exit_code, 0, "expected ask success: {}", asked.output);
        assert!(asked.output.contains("Monopoly Classic"));
    });
}

#[test]
fn seed_respects_the_catalog_path_environment_override() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("env-catalog.json");
    let path_value = path.to_string_lossy().to_string();

    with_env(&[("STOCKY_CATALOG_PATH", path_value.as_str())], || {
        let result = seed::run(None, false);
        assert_eq!(result.exit_code, 0, "expected seed success: {}", result.output);
        assert!(path.exists(), "seed should write to the env-configured path");
    });
}

#[test]
fn ask_fails_with_a_config_error_class_on_invalid_environment() {
    with_env(&[("STOCKY_LOG_FORMAT", "not-a-format")], || {
        let result = ask::run("hello", None);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn restock_then_low_stock_reflects_the_new_count() {
    with_env(&[], || {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        assert_eq!(seed::run(Some(path.clone()), false).exit_code, 0);

        // barbie-dreamhouse seeds with 2 units, below the threshold of 5.
        let before = low_stock::run(Some(5), Some(path.clone()));
        assert!(before.output.contains("Barbie Dreamhouse"), "{}", before.output);

        let restocked = restock::run("barbie-dreamhouse", 10, Some(path.clone()));
        assert_eq!(restocked.exit_code, 0, "{}", restocked.output);

        let after = low_stock::run(Some(5), Some(path));
        assert!(!after.output.contains("Barbie Dreamhouse"), "{}", after.output);
    });
}

#[test]
fn ask_surfaces_a_catalog_load_failure_as_an_unsuccessful_outcome() {
    with_env(&[], || {
        let result = ask::run("order 2 monopoly games", Some(PathBuf::from("missing.json")));
        assert_eq!(result.exit_code, 1, "{}", result.output);
        assert!(result.output.contains("error_handling"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STOCKY_CATALOG_PATH",
        "STOCKY_LOW_STOCK_THRESHOLD",
        "STOCKY_BIND_ADDRESS",
        "STOCKY_PORT",
        "STOCKY_MAX_PROMPT_CHARS",
        "STOCKY_LOG_LEVEL",
        "STOCKY_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
