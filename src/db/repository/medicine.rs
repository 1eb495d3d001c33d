use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const MEDICINE_COLUMNS: &str =
    "id, name, kind, price_minor_units, manufacturer, description";

/// Insert a medicine and its ingredient list atomically.
pub fn insert_medicine(conn: &Connection, med: &MedicineRecord) -> Result<(), DatabaseError> {
    insert_medicines(conn, std::slice::from_ref(med))
}

/// Insert several medicines in one transaction. Either every row lands or none does.
pub fn insert_medicines(conn: &Connection, meds: &[MedicineRecord]) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    for med in meds {
        insert_medicine_rows(&tx, med)?;
    }
    tx.commit()?;
    Ok(())
}

fn insert_medicine_rows(conn: &Connection, med: &MedicineRecord) -> Result<(), DatabaseError> {
    let price = i64::try_from(med.price_minor_units)
        .map_err(|_| DatabaseError::ConstraintViolation("price out of range".into()))?;

    conn.execute(
        "INSERT INTO medicines (id, name, kind, price_minor_units, manufacturer, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            med.id.to_string(),
            med.name,
            med.kind.as_str(),
            price,
            med.manufacturer,
            med.description,
        ],
    )?;
    for (position, ingredient) in med.active_ingredients.iter().enumerate() {
        conn.execute(
            "INSERT INTO medicine_ingredients (medicine_id, position, ingredient_name)
             VALUES (?1, ?2, ?3)",
            params![med.id.to_string(), position as i64, ingredient],
        )?;
    }
    Ok(())
}

pub fn get_medicine(conn: &Connection, id: &Uuid) -> Result<MedicineRecord, DatabaseError> {
    let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1");
    let mut meds = query_medicines(conn, &sql, params![id.to_string()])?;
    meds.pop().ok_or_else(|| DatabaseError::NotFound {
        entity_type: "medicine".into(),
        id: id.to_string(),
    })
}

/// Whole catalog in insertion order.
pub fn get_all_medicines(conn: &Connection) -> Result<Vec<MedicineRecord>, DatabaseError> {
    let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines ORDER BY rowid");
    query_medicines(conn, &sql, params![])
}

// SQLite LOWER() and NOCASE only fold ASCII, so name and ingredient filters
// run in Rust over the bare rows; ingredients load only for survivors.

/// Case-insensitive "name contains query". An empty query lists everything.
pub fn search_medicines(conn: &Connection, query: &str) -> Result<Vec<MedicineRecord>, DatabaseError> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return get_all_medicines(conn);
    }
    let rows = all_rows_in_insertion_order(conn)?
        .into_iter()
        .filter(|row| row.name.to_lowercase().contains(&query))
        .collect();
    hydrate_rows(conn, rows)
}

/// Rows whose name contains `text` or is contained in it, case-insensitively,
/// in insertion order.
pub fn get_medicines_overlapping_name(
    conn: &Connection,
    text: &str,
) -> Result<Vec<MedicineRecord>, DatabaseError> {
    let text = text.to_lowercase();
    let rows = all_rows_in_insertion_order(conn)?
        .into_iter()
        .filter(|row| {
            let name = row.name.to_lowercase();
            name.contains(&text) || text.contains(name.as_str())
        })
        .collect();
    hydrate_rows(conn, rows)
}

/// Generic rows sharing at least one ingredient with `ingredients`
/// (case-insensitive), cheapest first, ties by name.
///
/// Two queries regardless of catalog size: the generic rows, then every
/// generic ingredient in one pass.
pub fn get_generics_sharing_ingredients(
    conn: &Connection,
    ingredients: &[String],
) -> Result<Vec<MedicineRecord>, DatabaseError> {
    let wanted: HashSet<String> = ingredients.iter().map(|i| i.trim().to_lowercase()).collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE kind = 'generic'
         ORDER BY price_minor_units ASC, name ASC"
    );
    let rows = query_rows(conn, &sql, params![])?;

    let mut stmt = conn.prepare(
        "SELECT mi.medicine_id, mi.ingredient_name
         FROM medicine_ingredients mi
         JOIN medicines m ON m.id = mi.medicine_id
         WHERE m.kind = 'generic'
         ORDER BY mi.medicine_id, mi.position",
    )?;
    let pairs = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    let mut by_medicine: HashMap<String, Vec<String>> = HashMap::new();
    for pair in pairs {
        let (medicine_id, ingredient) = pair?;
        by_medicine.entry(medicine_id).or_default().push(ingredient);
    }

    let mut generics = Vec::new();
    for row in rows {
        let active_ingredients = by_medicine.remove(&row.id).unwrap_or_default();
        if active_ingredients
            .iter()
            .any(|i| wanted.contains(&i.trim().to_lowercase()))
        {
            generics.push(record_from_row(row, active_ingredients)?);
        }
    }
    Ok(generics)
}

pub fn count_medicines(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM medicines", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

pub fn get_ingredients(conn: &Connection, medicine_id: &str) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT ingredient_name FROM medicine_ingredients
         WHERE medicine_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![medicine_id], |row| row.get::<_, String>(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn all_rows_in_insertion_order(conn: &Connection) -> Result<Vec<MedicineRow>, DatabaseError> {
    let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines ORDER BY rowid");
    query_rows(conn, &sql, params![])
}

fn query_medicines<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<MedicineRecord>, DatabaseError> {
    let rows = query_rows(conn, sql, params)?;
    hydrate_rows(conn, rows)
}

fn query_rows<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<MedicineRow>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, medicine_row_from_rusqlite)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn hydrate_rows(conn: &Connection, rows: Vec<MedicineRow>) -> Result<Vec<MedicineRecord>, DatabaseError> {
    rows.into_iter()
        .map(|row| {
            let active_ingredients = get_ingredients(conn, &row.id)?;
            record_from_row(row, active_ingredients)
        })
        .collect()
}

// Internal row type for MedicineRecord mapping
struct MedicineRow {
    id: String,
    name: String,
    kind: String,
    price_minor_units: i64,
    manufacturer: String,
    description: Option<String>,
}

fn medicine_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicineRow, rusqlite::Error> {
    Ok(MedicineRow {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        price_minor_units: row.get(3)?,
        manufacturer: row.get(4)?,
        description: row.get(5)?,
    })
}

fn record_from_row(
    row: MedicineRow,
    active_ingredients: Vec<String>,
) -> Result<MedicineRecord, DatabaseError> {
    if active_ingredients.is_empty() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "medicine {} has no active ingredients",
            row.id
        )));
    }

    Ok(MedicineRecord {
        id: Uuid::parse_str(&row.id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name: row.name,
        kind: MedicineKind::from_str(&row.kind)?,
        price_minor_units: u64::try_from(row.price_minor_units)
            .map_err(|_| DatabaseError::ConstraintViolation("negative price".into()))?,
        active_ingredients,
        manufacturer: row.manufacturer,
        description: row.description,
    })
}
