use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use stocky_core::catalog::CatalogStore;
use stocky_store::JsonFileCatalogStore;

#[derive(Clone)]
pub struct HealthState {
    store: Arc<JsonFileCatalogStore>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(store: Arc<JsonFileCatalogStore>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { store })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state.store).await;
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "stocky-server runtime initialized".to_string(),
        },
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn catalog_check(store: &JsonFileCatalogStore) -> HealthCheck {
    match store.load().await {
        Ok(catalog) => HealthCheck {
            status: "ready",
            detail: format!("catalog loaded with {} products", catalog.products.len()),
        },
        Err(error) => {
            error!(event_name = "health_catalog_check_failed", error = %error);
            HealthCheck { status: "degraded", detail: format!("catalog load failed: {error}") }
        }
    }
}
