//! JSON API routes.
//!
//! - `POST /api/agent`  — natural-language order processing
//! - `GET  /api/status` — store and inventory status

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use stocky_comm::{EmailMessage, EmailRenderer};
use stocky_core::catalog::{CatalogStore, StorePolicy};
use stocky_core::domain::order::{OrderSummary, StockCheck};
use stocky_core::domain::product::Product;
use stocky_core::domain::reservation::LowStockAlert;
use stocky_core::errors::{ApplicationError, InterfaceError};
use stocky_core::intent::Intent;
use stocky_core::workflow::{OrderWorkflow, WorkflowMetadata};
use stocky_store::JsonFileCatalogStore;

use crate::bootstrap::Application;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<JsonFileCatalogStore>,
    pub workflow: Arc<OrderWorkflow<JsonFileCatalogStore>>,
    pub emails: Arc<EmailRenderer>,
    pub max_prompt_chars: usize,
    pub low_stock_threshold: u32,
}

impl ApiState {
    pub fn from_application(app: &Application) -> Self {
        Self {
            store: Arc::clone(&app.store),
            workflow: Arc::clone(&app.workflow),
            emails: Arc::clone(&app.emails),
            max_prompt_chars: app.config.server.max_prompt_chars,
            low_stock_threshold: app.config.store.low_stock_threshold,
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/agent", post(handle_agent))
        .route("/api/status", get(handle_status))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub result: String,
    pub success: bool,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_summary: Option<OrderSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stock_checks: Vec<StockCheck>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catalog_preview: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_preview: Option<EmailMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,
    pub metadata: WorkflowMetadata,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub error: &'static str,
    pub details: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub store_info: StorePolicy,
    pub low_stock_alerts: Vec<LowStockAlert>,
    pub total_products: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct StatusErrorBody {
    pub status: &'static str,
    pub error: String,
    pub correlation_id: String,
}

fn validate_prompt(prompt: &str, max_chars: usize) -> Vec<String> {
    let mut details = Vec::new();
    if prompt.trim().is_empty() {
        details.push("prompt: Prompt is required".to_owned());
    }
    if prompt.chars().count() > max_chars {
        details.push("prompt: Prompt is too long".to_owned());
    }
    details
}

pub async fn handle_agent(
    State(state): State<ApiState>,
    Json(request): Json<AgentRequest>,
) -> Result<Json<AgentResponse>, (StatusCode, Json<ValidationErrorBody>)> {
    let details = validate_prompt(&request.prompt, state.max_prompt_chars);
    if !details.is_empty() {
        warn!(event_name = "agent_request_invalid", detail_count = details.len());
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ValidationErrorBody { error: "Validation failed", details }),
        ));
    }

    let correlation_id = Uuid::new_v4().to_string();
    info!(event_name = "agent_request_received", correlation_id = %correlation_id);

    let outcome = state.workflow.process(&request.prompt).await;
    let email_preview = email_preview_for(&state, &outcome).await;

    let result = match outcome.intent {
        Intent::GeneralQuestion => match state.store.load().await {
            Ok(catalog) => state.emails.quick_response(&request.prompt, &catalog.policy),
            Err(_) => outcome.summary.clone(),
        },
        _ => outcome.summary.clone(),
    };

    info!(
        event_name = "agent_request_completed",
        correlation_id = %correlation_id,
        intent = ?outcome.intent,
        success = outcome.success,
        execution_time_ms = outcome.metadata.execution_time_ms,
    );

    Ok(Json(AgentResponse {
        result,
        success: outcome.success,
        intent: outcome.intent,
        order_summary: outcome.order_summary,
        stock_checks: outcome.stock_checks,
        catalog_preview: outcome.catalog_preview,
        order_reference: outcome.order_reference,
        email_preview,
        suggested_actions: outcome.next_actions,
        metadata: outcome.metadata,
    }))
}

/// Renders the customer email matching an order outcome. Failure to render
/// drops the preview rather than failing the whole request.
async fn email_preview_for(
    state: &ApiState,
    outcome: &stocky_core::workflow::WorkflowOutcome,
) -> Option<EmailMessage> {
    let order = outcome.order_summary.as_ref()?;
    if order.lines.is_empty() && order.unavailable_items.is_empty() {
        return None;
    }

    let catalog = match state.store.load().await {
        Ok(catalog) => catalog,
        Err(error) => {
            warn!(event_name = "email_preview_skipped", error = %error);
            return None;
        }
    };

    let fallback_reference = format!("ORD-{}", Uuid::new_v4());
    let reference = outcome.order_reference.as_deref().unwrap_or(&fallback_reference);

    match state.emails.order_email(order, &catalog.policy, None, reference) {
        Ok(email) => Some(email),
        Err(error) => {
            warn!(event_name = "email_preview_skipped", error = %error);
            None
        }
    }
}

pub async fn handle_status(
    State(state): State<ApiState>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<StatusErrorBody>)> {
    let correlation_id = Uuid::new_v4().to_string();
    let catalog = state.store.load().await.map_err(|error| {
        warn!(event_name = "status_unavailable", correlation_id = %correlation_id, error = %error);
        let interface = ApplicationError::from(error).into_interface(correlation_id.clone());
        let status_code = match interface {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status_code,
            Json(StatusErrorBody {
                status: "error",
                error: interface.user_message().to_owned(),
                correlation_id: correlation_id.clone(),
            }),
        )
    })?;

    let low_stock_alerts = catalog
        .products
        .iter()
        .filter(|product| product.stock <= state.low_stock_threshold)
        .map(|product| LowStockAlert {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            current_stock: product.stock,
            threshold: state.low_stock_threshold,
        })
        .collect();

    Ok(Json(StatusResponse {
        status: "operational",
        store_info: catalog.policy.clone(),
        low_stock_alerts,
        total_products: catalog.products.len(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}
