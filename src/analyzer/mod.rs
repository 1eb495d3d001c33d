//! Prescription analysis.
//!
//! For every prescribed name, independently and in request order:
//! 1. look the name up in the catalog (blank names never match)
//! 2. collect the matched record's active ingredients
//! 3. fetch generics sharing an ingredient, cheapest first
//! 4. compute savings against the cheapest generic (branded matches only)
//! 5. scan ingredients against the declared allergies
//!
//! A name with no catalog match is a normal `found = false` result. Any
//! catalog failure aborts the whole request; no partial response is built.

pub mod allergy;
pub mod messages;

use std::sync::Arc;

use crate::catalog::{order_generics, Catalog, CatalogError};
use crate::models::{AnalysisRequest, AnalysisResponse, AnalysisResult, MedicineKind, MedicineRecord};

use allergy::{parse_allergy_terms, scan_allergies, AllergyTerm};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

impl From<CatalogError> for AnalysisError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unavailable(reason) => AnalysisError::CatalogUnavailable(reason),
            CatalogError::InvalidRecord(e) => AnalysisError::CatalogUnavailable(e.to_string()),
        }
    }
}

/// Stateless analyzer over a shared catalog. Safe to call concurrently.
pub struct PrescriptionAnalyzer<C: Catalog + ?Sized> {
    catalog: Arc<C>,
    disclaimer: String,
}

impl<C: Catalog + ?Sized> PrescriptionAnalyzer<C> {
    pub fn new(catalog: Arc<C>, disclaimer: impl Into<String>) -> Self {
        Self {
            catalog,
            disclaimer: disclaimer.into(),
        }
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        let allergies = parse_allergy_terms(&request.allergies);

        let mut results = Vec::with_capacity(request.prescriptions.len());
        for original in &request.prescriptions {
            results.push(self.analyze_one(original, &allergies)?);
        }

        let response = AnalysisResponse {
            results,
            disclaimer: self.disclaimer.clone(),
        };
        tracing::info!(
            prescriptions = response.results.len(),
            found = response.results.iter().filter(|r| r.found).count(),
            warnings = response.total_warnings(),
            savings_minor_units = response.total_savings_minor_units(),
            "Prescription analysis complete"
        );
        Ok(response)
    }

    fn analyze_one(
        &self,
        original: &str,
        allergies: &[AllergyTerm],
    ) -> Result<AnalysisResult, AnalysisError> {
        let name = original.trim();
        if name.is_empty() {
            return Ok(AnalysisResult::not_found(original));
        }

        let Some(matched) = self.catalog.find_by_approximate_name(name)? else {
            tracing::debug!(prescription = name, "No catalog match");
            return Ok(AnalysisResult::not_found(original));
        };

        let mut generics = self
            .catalog
            .find_generics_by_ingredients(&matched.active_ingredients, &matched.id)?;
        generics.retain(|g| g.id != matched.id);
        order_generics(&mut generics);

        let savings_minor_units = compute_savings(&matched, &generics);
        let warnings = scan_allergies(&matched.active_ingredients, allergies);

        tracing::debug!(
            prescription = name,
            matched = %matched.name,
            generics = generics.len(),
            savings_minor_units,
            warnings = warnings.len(),
            "Prescription matched"
        );

        Ok(AnalysisResult {
            original: original.to_string(),
            found: true,
            ingredients: matched.active_ingredients,
            generics,
            savings_minor_units,
            warnings,
        })
    }
}

/// Branded price minus the cheapest generic, floored at zero.
/// Generic matches and empty generic lists save nothing.
pub fn compute_savings(matched: &MedicineRecord, generics: &[MedicineRecord]) -> u64 {
    if matched.kind != MedicineKind::Branded {
        return 0;
    }
    generics
        .iter()
        .map(|g| g.price_minor_units)
        .min()
        .map(|cheapest| matched.price_minor_units.saturating_sub(cheapest))
        .unwrap_or(0)
}
