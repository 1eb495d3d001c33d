//! Shared types for the HTTP layer.

use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::{AnalysisError, PrescriptionAnalyzer};
use crate::api::error::ApiError;
use crate::catalog::CatalogStore;
use crate::config::{self, AppConfig};
use crate::models::AnalysisRequest;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes. Cheap to clone.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn CatalogStore>,
    pub analyzer: Arc<PrescriptionAnalyzer<dyn CatalogStore>>,
    pub limits: RequestLimits,
    pub catalog_timeout: Duration,
}

impl ApiContext {
    pub fn new(store: Arc<dyn CatalogStore>, config: &AppConfig) -> Self {
        let analyzer = PrescriptionAnalyzer::new(store.clone(), config.disclaimer.clone());
        Self {
            store,
            analyzer: Arc::new(analyzer),
            limits: RequestLimits::default(),
            catalog_timeout: config.catalog_timeout,
        }
    }

    /// Run catalog work on the blocking pool under the catalog timeout.
    /// A timeout is reported as catalog unavailability.
    pub async fn run_blocking<T, F>(&self, task: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::time::timeout(self.catalog_timeout, tokio::task::spawn_blocking(task)).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(ApiError::Internal(format!("catalog task failed: {join_err}"))),
            Err(_) => Err(ApiError::CatalogUnavailable(format!(
                "catalog did not respond within {}ms",
                self.catalog_timeout.as_millis()
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Request limits: boundary shape checks
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_prescriptions: usize,
    pub max_allergies: usize,
    /// Maximum characters per prescription name or allergy term.
    pub max_term_len: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_prescriptions: config::MAX_PRESCRIPTIONS,
            max_allergies: config::MAX_ALLERGIES,
            max_term_len: config::MAX_TERM_LEN,
        }
    }
}

impl RequestLimits {
    pub fn check(&self, request: &AnalysisRequest) -> Result<(), AnalysisError> {
        if request.prescriptions.len() > self.max_prescriptions {
            return Err(AnalysisError::InvalidRequest(format!(
                "At most {} prescriptions per request",
                self.max_prescriptions
            )));
        }
        if request.allergies.len() > self.max_allergies {
            return Err(AnalysisError::InvalidRequest(format!(
                "At most {} allergies per request",
                self.max_allergies
            )));
        }
        let too_long = request
            .prescriptions
            .iter()
            .chain(request.allergies.iter())
            .any(|entry| entry.chars().count() > self.max_term_len);
        if too_long {
            return Err(AnalysisError::InvalidRequest(format!(
                "Entries must be at most {} characters",
                self.max_term_len
            )));
        }
        Ok(())
    }
}
