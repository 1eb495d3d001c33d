//! Catalog endpoints.
//!
//! - `GET /api/medicines?search=`: list or search the catalog
//! - `POST /api/medicines`: add a catalog entry
//! - `GET /api/medicines/:id`: one entry by id

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::catalog::CatalogStore;
use crate::models::{MedicineRecord, NewMedicine};

#[derive(Deserialize)]
pub struct MedicineListQuery {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct MedicinesResponse {
    pub medicines: Vec<MedicineRecord>,
    pub total: usize,
}

/// `GET /api/medicines`: catalog order, filtered by `search` when given.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<MedicineListQuery>,
) -> Result<Json<MedicinesResponse>, ApiError> {
    let store = ctx.store.clone();
    let search = query.search.unwrap_or_default();
    let medicines = ctx
        .run_blocking(move || store.search_medicines(&search).map_err(ApiError::from))
        .await?;

    Ok(Json(MedicinesResponse {
        total: medicines.len(),
        medicines,
    }))
}

/// `POST /api/medicines`: validate and persist a new entry.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<NewMedicine>, JsonRejection>,
) -> Result<(StatusCode, Json<MedicineRecord>), ApiError> {
    let Json(new_medicine) = payload?;

    let store = ctx.store.clone();
    let record = ctx
        .run_blocking(move || store.create_medicine(new_medicine).map_err(ApiError::from))
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn fetch(
    State(ctx): State<ApiContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MedicineRecord>, ApiError> {
    let Path(id) = id?;

    let store = ctx.store.clone();
    let record = ctx
        .run_blocking(move || store.get_medicine(&id).map_err(ApiError::from))
        .await?;

    record
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No medicine with id {id}")))
}
