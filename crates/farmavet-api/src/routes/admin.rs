//! Admin dashboard and generic content editing.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use farmavet_auth::AuthenticatedAdmin;
use farmavet_core::Record;
use farmavet_storage::{ListFilter, TABLES};
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::state::AppState;

/// Body of `GET /admin`.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    /// Logged-in admin
    pub username: String,
    /// Active rows per content table
    pub counts: BTreeMap<&'static str, i64>,
}

/// `GET /admin`
pub async fn dashboard(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<Json<Dashboard>> {
    let mut counts = BTreeMap::new();
    for table in TABLES {
        counts.insert(table.name, state.db.count_active(table.name).await?);
    }
    Ok(Json(Dashboard {
        username: admin.username,
        counts,
    }))
}

/// Id of a created row.
#[derive(Debug, Serialize)]
pub struct Created {
    /// New row id
    pub id: i64,
}

/// `GET /admin/content/{table}`
pub async fn list(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Vec<Record>>> {
    Ok(Json(state.db.list(&table, &ListFilter::all()).await?))
}

/// `POST /admin/content/{table}`
pub async fn create(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(table): Path<String>,
    Json(body): Json<Map<String, JsonValue>>,
) -> Result<(StatusCode, Json<Created>)> {
    let record = Record::from_json_object(&body);
    let id = state.db.insert(&table, &record).await?;
    tracing::info!(username = %admin.username, table = %table, id, "content created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// `GET /admin/content/{table}/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, i64)>,
) -> Result<Json<Record>> {
    state
        .db
        .get(&table, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found(&table, id))
}

/// `PUT /admin/content/{table}/{id}`
pub async fn update(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path((table, id)): Path<(String, i64)>,
    Json(body): Json<Map<String, JsonValue>>,
) -> Result<Json<Record>> {
    let record = Record::from_json_object(&body);
    if !state.db.update(&table, id, &record).await? {
        return Err(Error::not_found(&table, id));
    }
    tracing::info!(username = %admin.username, table = %table, id, "content updated");
    state
        .db
        .get(&table, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found(&table, id))
}

/// `DELETE /admin/content/{table}/{id}`
pub async fn remove(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path((table, id)): Path<(String, i64)>,
) -> Result<StatusCode> {
    if !state.db.delete(&table, id).await? {
        return Err(Error::not_found(&table, id));
    }
    tracing::info!(username = %admin.username, table = %table, id, "content deleted");
    Ok(StatusCode::NO_CONTENT)
}
