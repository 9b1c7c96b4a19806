pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod intent;
pub mod matching;
pub mod pricing;
pub mod reservation;
pub mod workflow;

pub use catalog::{CatalogError, CatalogMutation, CatalogState, CatalogStore, MutationError, StorePolicy};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::mention::ItemMention;
pub use domain::order::{OrderLine, OrderStatus, OrderSummary, StockCheck};
pub use domain::product::{Product, ProductId};
pub use domain::reservation::{LowStockAlert, ReservationResult, StockAdjustment, StockDelta};
pub use errors::{ApplicationError, InterfaceError};
pub use intent::{classify_prompt, Intent, PromptAnalysis};
pub use matching::{extract_quantity, match_product};
pub use pricing::{check_single_item, evaluate_order, OrderEvaluation};
pub use reservation::ReservationEngine;
pub use workflow::{OrderWorkflow, WorkflowMetadata, WorkflowOutcome, WorkflowStage};
