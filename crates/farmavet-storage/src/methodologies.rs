//! Methodology upsert used by the spreadsheet import.
//!
//! A row is identified by `(codigo, analito, matriz)` when it has a code and
//! by `(nombre, analito, matriz)` otherwise.

use farmavet_core::{Record, Value};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::catalogue::table;
use crate::database::Database;
use crate::error::Result;
use crate::repository::{ListFilter, insert_with, update_with};

const TABLE: &str = "metodologias";

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "id", rename_all = "lowercase")]
pub enum UpsertOutcome {
    /// A new row with this id
    Inserted(i64),
    /// An existing row with this id was overwritten
    Updated(i64),
}

impl UpsertOutcome {
    /// Row id affected.
    pub fn id(&self) -> i64 {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Updated(id) => *id,
        }
    }
}

/// Totals of a batch import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows inserted
    pub inserted: usize,
    /// Rows updated
    pub updated: usize,
}

impl ImportSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted(_) => self.inserted += 1,
            UpsertOutcome::Updated(_) => self.updated += 1,
        }
    }
}

fn text_of<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record
        .get_str(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Id of the row `draft` would overwrite, if any.
async fn match_methodology(conn: &mut SqliteConnection, draft: &Record) -> Result<Option<i64>> {
    let (key_column, key_value) = match text_of(draft, "codigo") {
        Some(codigo) => ("codigo", codigo),
        None => ("nombre", text_of(draft, "nombre").unwrap_or_default()),
    };
    let sql = format!(
        "SELECT id FROM {TABLE} WHERE {key_column} = ? AND analito = ? AND matriz = ? \
         ORDER BY id LIMIT 1"
    );
    let mut query = sqlx::query_scalar(&sql).bind(key_value.to_string());
    for column in ["analito", "matriz"] {
        let value = draft.get(column).cloned().unwrap_or(Value::Null);
        query = match value {
            Value::Null => query.bind(None::<String>),
            other => query.bind(other.to_text().into_owned()),
        };
    }
    let id = query.fetch_optional(&mut *conn).await?;
    Ok(id)
}

async fn upsert_with(conn: &mut SqliteConnection, draft: &Record) -> Result<UpsertOutcome> {
    let table = table(TABLE)?;
    match match_methodology(conn, draft).await? {
        Some(id) => {
            update_with(conn, table, id, draft).await?;
            Ok(UpsertOutcome::Updated(id))
        }
        None => {
            let mut row = draft.clone();
            if !row.contains_key("activo") {
                row.insert("activo", Value::Integer(1));
            }
            let id = insert_with(conn, table, &row).await?;
            Ok(UpsertOutcome::Inserted(id))
        }
    }
}

impl Database {
    /// Insert `draft` or overwrite the row it matches.
    pub async fn upsert_methodology(&self, draft: &Record) -> Result<UpsertOutcome> {
        let mut conn = self.pool().acquire().await?;
        upsert_with(&mut conn, draft).await
    }

    /// Upsert every draft in one transaction; nothing is written on error.
    pub async fn import_methodologies(&self, drafts: &[Record]) -> Result<ImportSummary> {
        let mut tx = self.pool().begin().await?;
        let mut summary = ImportSummary::default();
        for draft in drafts {
            summary.record(upsert_with(&mut tx, draft).await?);
        }
        tx.commit().await?;
        log::info!(
            "Imported methodologies: {} inserted, {} updated",
            summary.inserted,
            summary.updated
        );
        Ok(summary)
    }

    /// Every active methodology, in catalogue order.
    pub async fn active_methodologies(&self) -> Result<Vec<Record>> {
        self.list(TABLE, &ListFilter::active()).await
    }
}
