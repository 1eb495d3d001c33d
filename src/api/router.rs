//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`:
//!
//! - `GET  /api/health`
//! - `POST /api/analyze`
//! - `GET  /api/medicines`
//! - `POST /api/medicines`
//! - `GET  /api/medicines/:id`
//!
//! Layers (outermost → innermost): Trace → CORS → Handler

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::catalog::CatalogStore;
use crate::config::AppConfig;

/// Build the API router over a catalog store.
pub fn api_router(store: Arc<dyn CatalogStore>, config: &AppConfig) -> Router {
    build_router(ApiContext::new(store, config))
}

/// Build router from a pre-constructed `ApiContext`.
pub fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/analyze", post(endpoints::analyze::analyze))
        .route(
            "/medicines",
            get(endpoints::medicines::list).post(endpoints::medicines::create),
        )
        .route("/medicines/:id", get(endpoints::medicines::fetch))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::NotFound("No such route".into())
}
