//! API error types with structured JSON responses.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analyzer::AnalysisError;
use crate::catalog::CatalogError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::CatalogUnavailable(detail) => {
                tracing::warn!(detail, "Catalog unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CATALOG_UNAVAILABLE",
                    "The medicine catalog is temporarily unavailable".to_string(),
                )
            }
            ApiError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidRequest(detail) => ApiError::BadRequest(detail),
            AnalysisError::CatalogUnavailable(detail) => ApiError::CatalogUnavailable(detail),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unavailable(detail) => ApiError::CatalogUnavailable(detail),
            CatalogError::InvalidRecord(e) => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    use crate::models::MedicineValidationError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("prescriptions must be a list".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "prescriptions must be a list");
    }

    #[tokio::test]
    async fn catalog_unavailable_returns_503_without_detail() {
        let response = ApiError::CatalogUnavailable("disk I/O error".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "CATALOG_UNAVAILABLE");
        assert!(!json["error"]["message"].as_str().unwrap().contains("disk"));
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("No route".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_returns_500() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        // Internal errors hide details from client
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn analysis_errors_map_to_distinct_variants() {
        let invalid: ApiError = AnalysisError::InvalidRequest("x".into()).into();
        assert!(matches!(invalid, ApiError::BadRequest(_)));
        let down: ApiError = AnalysisError::CatalogUnavailable("y".into()).into();
        assert!(matches!(down, ApiError::CatalogUnavailable(_)));
    }

    #[test]
    fn invalid_record_maps_to_bad_request() {
        let err: ApiError = CatalogError::InvalidRecord(MedicineValidationError::EmptyName).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
