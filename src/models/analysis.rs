use serde::{Deserialize, Serialize};

use super::medicine::MedicineRecord;

/// One analysis invocation: prescribed names plus declared allergies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub prescriptions: Vec<String>,
    pub allergies: Vec<String>,
}

/// Outcome for one prescribed name. `found == false` is a normal result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub original: String,
    pub found: bool,
    pub ingredients: Vec<String>,
    pub generics: Vec<MedicineRecord>,
    pub savings_minor_units: u64,
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    pub fn not_found(original: &str) -> Self {
        Self {
            original: original.to_string(),
            found: false,
            ingredients: Vec::new(),
            generics: Vec::new(),
            savings_minor_units: 0,
            warnings: Vec::new(),
        }
    }
}

/// Results mirror the request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub results: Vec<AnalysisResult>,
    pub disclaimer: String,
}

impl AnalysisResponse {
    pub fn total_savings_minor_units(&self) -> u64 {
        self.results
            .iter()
            .map(|r| r.savings_minor_units)
            .fold(0u64, u64::saturating_add)
    }

    pub fn total_warnings(&self) -> usize {
        self.results.iter().map(|r| r.warnings.len()).sum()
    }
}
