//! Bundled demo catalog, loaded into an empty store on first start.

use super::{CatalogError, CatalogStore};
use crate::models::NewMedicine;

const SEED_CATALOG_JSON: &str = include_str!("../../resources/seed_catalog.json");

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Seed catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Parse the bundled seed entries.
pub fn seed_entries() -> Result<Vec<NewMedicine>, SeedError> {
    Ok(serde_json::from_str(SEED_CATALOG_JSON)?)
}

/// Insert the bundled entries when the store holds no medicines.
/// Returns how many rows were inserted (0 when the store was not empty).
pub fn seed_if_empty(store: &dyn CatalogStore) -> Result<usize, SeedError> {
    seed_with(store, seed_entries()?)
}

/// One batch: a failed seed leaves the store empty so the next start retries.
fn seed_with(store: &dyn CatalogStore, entries: Vec<NewMedicine>) -> Result<usize, SeedError> {
    if store.count_medicines()? > 0 {
        tracing::debug!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    let created = store.create_medicines(entries)?;
    tracing::info!(count = created.len(), "Seeded catalog with bundled medicines");
    Ok(created.len())
}
