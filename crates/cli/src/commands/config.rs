use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use stocky_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let catalog_path = config.store.catalog_path.display().to_string();
    let fields: [(&str, String, Option<&str>); 7] = [
        ("store.catalog_path", catalog_path, Some("STOCKY_CATALOG_PATH")),
        (
            "store.low_stock_threshold",
            config.store.low_stock_threshold.to_string(),
            Some("STOCKY_LOW_STOCK_THRESHOLD"),
        ),
        ("server.bind_address", config.server.bind_address.clone(), Some("STOCKY_BIND_ADDRESS")),
        ("server.port", config.server.port.to_string(), Some("STOCKY_PORT")),
        (
            "server.max_prompt_chars",
            config.server.max_prompt_chars.to_string(),
            Some("STOCKY_MAX_PROMPT_CHARS"),
        ),
        ("logging.level", config.logging.level.clone(), Some("STOCKY_LOG_LEVEL")),
        ("logging.format", format!("{:?}", config.logging.format).to_lowercase(), Some("STOCKY_LOG_FORMAT")),
    ];

    for (field, value, env_var) in fields {
        lines.push(render_line(
            field,
            &value,
            field_source(field, env_var, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn render_line(field: &str, value: &str, source: String) -> String {
    format!("  {field} = {value} ({source})")
}

fn detect_config_path() -> Option<PathBuf> {
    let candidate = PathBuf::from("stocky.toml");
    candidate.exists().then_some(candidate)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let contents = fs::read_to_string(path?).ok()?;
    contents.parse::<Value>().ok()
}

fn field_source(
    field: &str,
    env_var: Option<&str>,
    doc: Option<&Value>,
    path: Option<&Path>,
) -> String {
    if let Some(var) = env_var {
        if env::var(var).is_ok() {
            return format!("env: {var}");
        }
    }
    if let (Some(doc), Some(path)) = (doc, path) {
        let mut cursor = Some(doc);
        for segment in field.split('.') {
            cursor = cursor.and_then(|value| value.get(segment));
        }
        if cursor.is_some() {
            return format!("file: {}", path.display());
        }
    }
    "default".to_string()
}
