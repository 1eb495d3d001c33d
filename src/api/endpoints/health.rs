//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::catalog::CatalogStore;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_size: Option<u64>,
    pub version: &'static str,
}

/// `GET /api/health`: liveness plus catalog reachability.
/// Always 200; an unreachable catalog reports `degraded`.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let store = ctx.store.clone();
    let catalog_size = ctx
        .run_blocking(move || store.count_medicines().map_err(Into::into))
        .await
        .ok();

    Json(HealthResponse {
        status: if catalog_size.is_some() { "ok" } else { "degraded" },
        catalog_size,
        version: crate::config::APP_VERSION,
    })
}
