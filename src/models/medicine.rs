use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MedicineKind;

/// A catalog entry. Prices are in minor currency units (cents, paise).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicineRecord {
    pub id: Uuid,
    pub name: String,
    pub kind: MedicineKind,
    pub price_minor_units: u64,
    pub active_ingredients: Vec<String>,
    pub manufacturer: String,
    pub description: Option<String>,
}

impl MedicineRecord {
    /// True when at least one active ingredient matches one of `ingredients`,
    /// compared case-insensitively.
    pub fn shares_ingredient_with(&self, ingredients: &[String]) -> bool {
        self.active_ingredients.iter().any(|own| {
            ingredients
                .iter()
                .any(|other| own.to_lowercase() == other.trim().to_lowercase())
        })
    }

    pub fn is_generic(&self) -> bool {
        self.kind == MedicineKind::Generic
    }
}

/// Creation input for a catalog entry. The id is assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    pub kind: MedicineKind,
    pub price_minor_units: u64,
    pub active_ingredients: Vec<String>,
    pub manufacturer: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MedicineValidationError {
    #[error("Medicine name must not be empty")]
    EmptyName,
    #[error("Manufacturer must not be empty")]
    EmptyManufacturer,
    #[error("At least one active ingredient is required")]
    NoIngredients,
}

impl NewMedicine {
    /// Trim all text fields, collapse duplicate ingredients and check the
    /// catalog invariants.
    pub fn validate(self) -> Result<Self, MedicineValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(MedicineValidationError::EmptyName);
        }

        let manufacturer = self.manufacturer.trim().to_string();
        if manufacturer.is_empty() {
            return Err(MedicineValidationError::EmptyManufacturer);
        }

        let active_ingredients = normalize_ingredients(&self.active_ingredients);
        if active_ingredients.is_empty() {
            return Err(MedicineValidationError::NoIngredients);
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            name,
            kind: self.kind,
            price_minor_units: self.price_minor_units,
            active_ingredients,
            manufacturer,
            description,
        })
    }

    /// Attach an id. Callers are expected to have run [`NewMedicine::validate`].
    pub fn into_record(self, id: Uuid) -> MedicineRecord {
        MedicineRecord {
            id,
            name: self.name,
            kind: self.kind,
            price_minor_units: self.price_minor_units,
            active_ingredients: self.active_ingredients,
            manufacturer: self.manufacturer,
            description: self.description,
        }
    }
}

/// Trim ingredient names, drop blanks and collapse case-insensitive
/// duplicates. First spelling wins and order is kept.
pub fn normalize_ingredients(raw: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());
    for ingredient in raw {
        let trimmed = ingredient.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(trimmed.to_string());
    }
    out
}
