use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use uuid::Uuid;

use super::{prepare_records, select_generics, select_name_match, Catalog, CatalogError, CatalogStore};
use crate::db::{self, DatabaseError};
use crate::models::{MedicineRecord, NewMedicine};

/// Catalog backed by the `medicines` / `medicine_ingredients` tables.
///
/// One connection guarded by a `Mutex`; callers on the async side run
/// lookups through `spawn_blocking`.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open (or create) the database file and run migrations.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Catalog database opened");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, CatalogError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    /// Wrap an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Unavailable("catalog connection lock poisoned".into()))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, CatalogError> {
        let conn = self.lock()?;
        f(&conn).map_err(|e| {
            tracing::warn!(error = %e, "Catalog query failed");
            CatalogError::from(e)
        })
    }
}

impl Catalog for SqliteCatalog {
    fn find_by_approximate_name(&self, text: &str) -> Result<Option<MedicineRecord>, CatalogError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let candidates = self.with_conn(|conn| db::get_medicines_overlapping_name(conn, text))?;
        tracing::debug!(query = text, candidates = candidates.len(), "Catalog name lookup");
        Ok(select_name_match(candidates, text))
    }

    fn find_generics_by_ingredients(
        &self,
        ingredients: &[String],
        exclude_id: &Uuid,
    ) -> Result<Vec<MedicineRecord>, CatalogError> {
        let generics = self.with_conn(|conn| db::get_generics_sharing_ingredients(conn, ingredients))?;
        Ok(select_generics(generics, ingredients, exclude_id))
    }
}

impl CatalogStore for SqliteCatalog {
    fn search_medicines(&self, query: &str) -> Result<Vec<MedicineRecord>, CatalogError> {
        self.with_conn(|conn| db::search_medicines(conn, query))
    }

    fn get_medicine(&self, id: &Uuid) -> Result<Option<MedicineRecord>, CatalogError> {
        let conn = self.lock()?;
        match db::get_medicine(&conn, id) {
            Ok(record) => Ok(Some(record)),
            Err(DatabaseError::NotFound { .. }) => Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "Catalog query failed");
                Err(e.into())
            }
        }
    }

    fn create_medicine(&self, medicine: NewMedicine) -> Result<MedicineRecord, CatalogError> {
        let record = medicine.validate()?.into_record(Uuid::new_v4());
        self.with_conn(|conn| db::insert_medicine(conn, &record))?;
        tracing::info!(id = %record.id, medicine = %record.name, kind = %record.kind, "Medicine created");
        Ok(record)
    }

    fn create_medicines(&self, medicines: Vec<NewMedicine>) -> Result<Vec<MedicineRecord>, CatalogError> {
        let records = prepare_records(medicines)?;
        self.with_conn(|conn| db::insert_medicines(conn, &records))?;
        tracing::info!(count = records.len(), "Medicines created");
        Ok(records)
    }

    fn count_medicines(&self) -> Result<u64, CatalogError> {
        self.with_conn(db::count_medicines)
    }
}
