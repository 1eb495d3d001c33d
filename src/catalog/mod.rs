//! Medicine catalog: the read surface the analyzer depends on, plus the
//! maintenance operations used by the HTTP layer and seeding.
//!
//! Two backends implement the same traits:
//! - [`InMemoryCatalog`]: a `Vec` behind a `RwLock`, insertion ordered
//! - [`SqliteCatalog`]: `medicines` + `medicine_ingredients` tables
//!
//! Both share the matching and ordering rules defined here so the
//! analyzer sees identical behavior regardless of storage.

pub mod memory;
pub mod seed;
pub mod sqlite;

pub use memory::InMemoryCatalog;
pub use sqlite::SqliteCatalog;

use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{MedicineRecord, MedicineValidationError, NewMedicine};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid medicine: {0}")]
    InvalidRecord(#[from] MedicineValidationError),
}

impl From<DatabaseError> for CatalogError {
    fn from(err: DatabaseError) -> Self {
        CatalogError::Unavailable(err.to_string())
    }
}

/// Read-only lookups consumed by the prescription analyzer.
///
/// Each call is all-or-nothing: a row that cannot be decoded fails the
/// whole call with [`CatalogError::Unavailable`].
pub trait Catalog: Send + Sync {
    /// Case-insensitive name lookup. An exact name match wins; otherwise the
    /// first row (catalog order) whose name contains `text` or is contained
    /// in it. Blank input never matches.
    fn find_by_approximate_name(&self, text: &str) -> Result<Option<MedicineRecord>, CatalogError>;

    /// Generic rows sharing at least one ingredient with `ingredients`,
    /// excluding `exclude_id`, cheapest first with ties broken by name.
    fn find_generics_by_ingredients(
        &self,
        ingredients: &[String],
        exclude_id: &Uuid,
    ) -> Result<Vec<MedicineRecord>, CatalogError>;
}

/// Catalog maintenance. Create-only: rows are never updated or deleted.
pub trait CatalogStore: Catalog {
    /// Case-insensitive "name contains" search in catalog order.
    /// A blank query lists the whole catalog.
    fn search_medicines(&self, query: &str) -> Result<Vec<MedicineRecord>, CatalogError>;

    fn get_medicine(&self, id: &Uuid) -> Result<Option<MedicineRecord>, CatalogError>;

    /// Validate, assign an id and persist.
    fn create_medicine(&self, medicine: NewMedicine) -> Result<MedicineRecord, CatalogError>;

    /// Validate every entry, then persist them all or none.
    fn create_medicines(&self, medicines: Vec<NewMedicine>) -> Result<Vec<MedicineRecord>, CatalogError>;

    fn count_medicines(&self) -> Result<u64, CatalogError>;
}

/// Validate and assign fresh ids. Fails on the first invalid entry.
pub fn prepare_records(medicines: Vec<NewMedicine>) -> Result<Vec<MedicineRecord>, CatalogError> {
    medicines
        .into_iter()
        .map(|m| Ok(m.validate()?.into_record(Uuid::new_v4())))
        .collect()
}

/// True when either lowercased name contains the other.
pub fn names_overlap(catalog_name: &str, query_lower: &str) -> bool {
    let name = catalog_name.to_lowercase();
    name.contains(query_lower) || query_lower.contains(name.as_str())
}

/// Pick the lookup winner from candidates in catalog order.
pub fn select_name_match<I>(candidates: I, text: &str) -> Option<MedicineRecord>
where
    I: IntoIterator<Item = MedicineRecord>,
{
    let query = text.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let mut first_overlap = None;
    for candidate in candidates {
        if candidate.name.trim().to_lowercase() == query {
            return Some(candidate);
        }
        if first_overlap.is_none() && names_overlap(&candidate.name, &query) {
            first_overlap = Some(candidate);
        }
    }
    first_overlap
}

/// Keep generic rows that share an ingredient and are not `exclude_id`,
/// then order them cheapest first, ties by name.
pub fn select_generics<I>(candidates: I, ingredients: &[String], exclude_id: &Uuid) -> Vec<MedicineRecord>
where
    I: IntoIterator<Item = MedicineRecord>,
{
    let mut generics: Vec<MedicineRecord> = candidates
        .into_iter()
        .filter(|m| m.is_generic() && m.id != *exclude_id && m.shares_ingredient_with(ingredients))
        .collect();
    order_generics(&mut generics);
    generics
}

pub fn order_generics(generics: &mut [MedicineRecord]) {
    generics.sort_by(|a, b| {
        a.price_minor_units
            .cmp(&b.price_minor_units)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicineKind;

    fn record(name: &str, kind: MedicineKind, price: u64, ingredients: &[&str]) -> MedicineRecord {
        MedicineRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            price_minor_units: price,
            active_ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            manufacturer: "Acme".into(),
            description: None,
        }
    }

    #[test]
    fn overlap_works_both_ways() {
        assert!(names_overlap("Lipitor", "lipi"));
        assert!(names_overlap("Lipitor", "lipitor 20 mg"));
        assert!(!names_overlap("Lipitor", "crestor"));
    }

    #[test]
    fn exact_match_beats_earlier_substring_match() {
        let candidates = vec![
            record("Lipitor Forte", MedicineKind::Branded, 7000, &["Atorvastatin"]),
            record("Lipitor", MedicineKind::Branded, 5000, &["Atorvastatin"]),
        ];
        let picked = select_name_match(candidates, "  LIPITOR ").unwrap();
        assert_eq!(picked.name, "Lipitor");
    }

    #[test]
    fn first_substring_match_wins_without_exact() {
        let candidates = vec![
            record("Crestor", MedicineKind::Branded, 6000, &["Rosuvastatin"]),
            record("Lipitor Forte", MedicineKind::Branded, 7000, &["Atorvastatin"]),
            record("Lipitor Mini", MedicineKind::Branded, 3000, &["Atorvastatin"]),
        ];
        let picked = select_name_match(candidates, "lipitor").unwrap();
        assert_eq!(picked.name, "Lipitor Forte");
    }

    #[test]
    fn blank_query_never_matches() {
        let candidates = vec![record("Lipitor", MedicineKind::Branded, 5000, &["Atorvastatin"])];
        assert!(select_name_match(candidates.clone(), "").is_none());
        assert!(select_name_match(candidates, "   ").is_none());
    }

    #[test]
    fn generics_exclude_self_and_branded() {
        let own = record("Atorva", MedicineKind::Generic, 1500, &["Atorvastatin"]);
        let candidates = vec![
            own.clone(),
            record("Lipitor", MedicineKind::Branded, 5000, &["Atorvastatin"]),
            record("Atorvastatin-Gen", MedicineKind::Generic, 2000, &["atorvastatin"]),
            record("Rosuva-Gen", MedicineKind::Generic, 100, &["Rosuvastatin"]),
        ];
        let generics = select_generics(candidates, &own.active_ingredients, &own.id);
        let names: Vec<&str> = generics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Atorvastatin-Gen"]);
    }

    #[test]
    fn generics_sorted_by_price_then_name() {
        let candidates = vec![
            record("Zeta", MedicineKind::Generic, 200, &["A"]),
            record("Alpha", MedicineKind::Generic, 300, &["A"]),
            record("Beta", MedicineKind::Generic, 200, &["A", "B"]),
        ];
        let generics = select_generics(candidates, &["A".to_string()], &Uuid::nil());
        let names: Vec<&str> = generics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Zeta", "Alpha"]);
    }

    #[test]
    fn database_errors_become_unavailable() {
        let err: CatalogError = DatabaseError::ConstraintViolation("bad row".into()).into();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
