//! Prescription analysis endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{AnalysisRequest, AnalysisResponse};

/// `POST /api/analyze`: match prescriptions, suggest generics, flag allergies.
///
/// Shape errors (bad JSON, non-string entries, limits) are rejected with 400
/// before the analyzer runs. Catalog failure or timeout is a 503 with no
/// partial results.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(request) = payload?;
    ctx.limits.check(&request)?;

    let analyzer = ctx.analyzer.clone();
    let response = ctx
        .run_blocking(move || analyzer.analyze(&request).map_err(ApiError::from))
        .await?;

    Ok(Json(response))
}
