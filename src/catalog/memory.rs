use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use super::{prepare_records, select_generics, select_name_match, Catalog, CatalogError, CatalogStore};
use crate::models::{MedicineRecord, NewMedicine};

/// Insertion-ordered catalog held in memory. Used for tests and for
/// running the service without a database file.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: RwLock<Vec<MedicineRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from existing records, kept in the given order.
    pub fn with_records(records: Vec<MedicineRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<MedicineRecord>>, CatalogError> {
        self.records
            .write()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".into()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<MedicineRecord>>, CatalogError> {
        self.records
            .read()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".into()))
    }
}

impl Catalog for InMemoryCatalog {
    fn find_by_approximate_name(&self, text: &str) -> Result<Option<MedicineRecord>, CatalogError> {
        let records = self.read()?;
        Ok(select_name_match(records.iter().cloned(), text))
    }

    fn find_generics_by_ingredients(
        &self,
        ingredients: &[String],
        exclude_id: &Uuid,
    ) -> Result<Vec<MedicineRecord>, CatalogError> {
        let records = self.read()?;
        Ok(select_generics(records.iter().cloned(), ingredients, exclude_id))
    }
}

impl CatalogStore for InMemoryCatalog {
    fn search_medicines(&self, query: &str) -> Result<Vec<MedicineRecord>, CatalogError> {
        let query = query.trim().to_lowercase();
        let records = self.read()?;
        Ok(records
            .iter()
            .filter(|m| query.is_empty() || m.name.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    fn get_medicine(&self, id: &Uuid) -> Result<Option<MedicineRecord>, CatalogError> {
        Ok(self.read()?.iter().find(|m| m.id == *id).cloned())
    }

    fn create_medicine(&self, medicine: NewMedicine) -> Result<MedicineRecord, CatalogError> {
        let record = medicine.validate()?.into_record(Uuid::new_v4());
        self.write()?.push(record.clone());
        tracing::debug!(id = %record.id, medicine = %record.name, "Medicine added to in-memory catalog");
        Ok(record)
    }

    fn create_medicines(&self, medicines: Vec<NewMedicine>) -> Result<Vec<MedicineRecord>, CatalogError> {
        let created = prepare_records(medicines)?;
        self.write()?.extend(created.iter().cloned());
        tracing::debug!(count = created.len(), "Medicines added to in-memory catalog");
        Ok(created)
    }

    fn count_medicines(&self) -> Result<u64, CatalogError> {
        Ok(self.read()?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicineKind;

    fn new_medicine(name: &str, kind: MedicineKind, price: u64, ingredients: &[&str]) -> NewMedicine {
        NewMedicine {
            name: name.into(),
            kind,
            price_minor_units: price,
            active_ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            manufacturer: "Acme".into(),
            description: None,
        }
    }

    fn lipitor_catalog() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        catalog
            .create_medicine(new_medicine("Lipitor", MedicineKind::Branded, 5000, &["Atorvastatin"]))
            .unwrap();
        catalog
            .create_medicine(new_medicine("Atorvastatin-Gen", MedicineKind::Generic, 2000, &["Atorvastatin"]))
            .unwrap();
        catalog
    }

    #[test]
    fn create_assigns_unique_ids() {
        let catalog = lipitor_catalog();
        let all = catalog.search_medicines("").unwrap();
        assert_eq!(all.len(), 2);
        assert_ne!(all[0].id, all[1].id);
        assert_eq!(catalog.count_medicines().unwrap(), 2);
    }

    #[test]
    fn create_rejects_invalid_medicine() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .create_medicine(new_medicine("", MedicineKind::Generic, 10, &["A"]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord(_)));
        assert_eq!(catalog.count_medicines().unwrap(), 0);
    }

    #[test]
    fn approximate_lookup_is_case_insensitive() {
        let catalog = lipitor_catalog();
        let found = catalog.find_by_approximate_name("lipitor").unwrap().unwrap();
        assert_eq!(found.name, "Lipitor");
        assert!(catalog.find_by_approximate_name("Ibuprofen9999").unwrap().is_none());
    }

    #[test]
    fn generics_lookup_excludes_given_id() {
        let catalog = lipitor_catalog();
        let generic = catalog.find_by_approximate_name("Atorvastatin-Gen").unwrap().unwrap();
        let generics = catalog
            .find_generics_by_ingredients(&generic.active_ingredients, &generic.id)
            .unwrap();
        assert!(generics.is_empty());
    }

    #[test]
    fn batch_with_invalid_entry_adds_nothing() {
        let catalog = lipitor_catalog();
        let err = catalog
            .create_medicines(vec![
                new_medicine("Crestor", MedicineKind::Branded, 6500, &["Rosuvastatin"]),
                new_medicine("Broken", MedicineKind::Generic, 10, &[]),
            ])
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord(_)));
        assert_eq!(catalog.count_medicines().unwrap(), 2);
    }

    #[test]
    fn get_by_id() {
        let catalog = lipitor_catalog();
        let lipitor = catalog.find_by_approximate_name("Lipitor").unwrap().unwrap();
        assert_eq!(catalog.get_medicine(&lipitor.id).unwrap(), Some(lipitor));
        assert!(catalog.get_medicine(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn search_filters_by_substring() {
        let catalog = lipitor_catalog();
        let hits = catalog.search_medicines("GEN").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Atorvastatin-Gen");
    }
}
