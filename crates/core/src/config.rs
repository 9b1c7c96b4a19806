//! Process configuration: defaults, optional TOML file, environment
//! overrides, then programmatic overrides, in that order.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    pub catalog_path: PathBuf,
    pub low_stock_threshold: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub max_prompt_chars: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub low_stock_threshold: Option<u32>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                catalog_path: PathBuf::from("data/catalog.json"),
                low_stock_threshold: 5,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_owned(),
                port: 3000,
                max_prompt_chars: 1000,
            },
            logging: LoggingConfig { level: "info".to_owned(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    catalog_path: Option<PathBuf>,
    low_stock_threshold: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    max_prompt_chars: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

const DEFAULT_CONFIG_FILE: &str = "stocky.toml";

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let patch: ConfigPatch = toml::from_str(&contents)
                    .map_err(|source| ConfigError::ParseFile { path: path.clone(), source })?;
                config.apply_patch(patch);
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                if options.require_file {
                    return Err(ConfigError::MissingConfigFile(path));
                }
            }
            Err(source) => return Err(ConfigError::ReadFile { path, source }),
        }

        config.apply_env()?;
        config.apply_overrides(options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(catalog_path) = store.catalog_path {
                self.store.catalog_path = catalog_path;
            }
            if let Some(threshold) = store.low_stock_threshold {
                self.store.low_stock_threshold = threshold;
            }
        }
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(max_prompt_chars) = server.max_prompt_chars {
                self.server.max_prompt_chars = max_prompt_chars;
            }
        }
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var("STOCKY_CATALOG_PATH") {
            self.store.catalog_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var("STOCKY_LOW_STOCK_THRESHOLD") {
            self.store.low_stock_threshold = parse_env("STOCKY_LOW_STOCK_THRESHOLD", &value)?;
        }
        if let Ok(value) = env::var("STOCKY_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Ok(value) = env::var("STOCKY_PORT") {
            self.server.port = parse_env("STOCKY_PORT", &value)?;
        }
        if let Ok(value) = env::var("STOCKY_MAX_PROMPT_CHARS") {
            self.server.max_prompt_chars = parse_env("STOCKY_MAX_PROMPT_CHARS", &value)?;
        }
        if let Ok(value) = env::var("STOCKY_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Ok(value) = env::var("STOCKY_LOG_FORMAT") {
            self.logging.format = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "STOCKY_LOG_FORMAT".to_owned(),
                value,
            })?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.store.catalog_path = catalog_path;
        }
        if let Some(threshold) = overrides.low_stock_threshold {
            self.store.low_stock_threshold = threshold;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.catalog_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("store.catalog_path must not be empty".to_owned()));
        }
        if self.server.bind_address.is_empty() {
            return Err(ConfigError::Validation("server.bind_address must not be empty".to_owned()));
        }
        if self.server.max_prompt_chars == 0 {
            return Err(ConfigError::Validation(
                "server.max_prompt_chars must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}
