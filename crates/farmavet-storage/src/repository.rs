//! Generic CRUD over the content catalogue.
//!
//! Table and column names are checked against [`crate::catalogue`] before
//! they reach SQL; values are always bound.

use farmavet_core::{Record, Value};
use sqlx::SqliteConnection;

use crate::catalogue::{Table, WriteMode, quote, table};
use crate::database::{Database, bind_value, row_to_record};
use crate::error::{Error, Result};

/// Row selection for [`Database::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Only rows whose activity column is set
    pub active_only: bool,
    /// Column equality conditions, ANDed together
    pub equals: Vec<(String, Value)>,
    /// Maximum number of rows
    pub limit: Option<i64>,
}

impl ListFilter {
    /// Every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Active rows only.
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    /// Add an equality condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((column.into(), value.into()));
        self
    }

    /// Cap the number of rows.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn where_clause(&self, table: &Table) -> Result<String> {
        let mut conditions = Vec::new();
        if self.active_only {
            conditions.push(format!("{} = 1", quote(table.activity_column)));
        }
        for (column, _) in &self.equals {
            if !table.has_column(column) {
                return Err(Error::unknown_column(table.name, column));
            }
            conditions.push(format!("{} = ?", quote(column)));
        }
        if conditions.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!(" WHERE {}", conditions.join(" AND ")))
        }
    }
}

impl Database {
    /// Rows of `table` matching `filter`, in the table's listing order.
    pub async fn list(&self, table_name: &str, filter: &ListFilter) -> Result<Vec<Record>> {
        let table = table(table_name)?;
        let mut sql = format!(
            "SELECT * FROM {}{} ORDER BY {}",
            quote(table.name),
            filter.where_clause(table)?,
            table.order_by
        );
        if filter.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql);
        for (_, value) in &filter.equals {
            query = bind_value(query, value);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        let rows = query.fetch_all(self.pool()).await?;
        rows.iter().map(row_to_record).collect()
    }

    /// One row by id.
    pub async fn get(&self, table_name: &str, id: i64) -> Result<Option<Record>> {
        let table = table(table_name)?;
        let sql = format!("SELECT * FROM {} WHERE id = ?", quote(table.name));
        let row = sqlx::query(&sql).bind(id).fetch_optional(self.pool()).await?;
        row.as_ref().map(row_to_record).transpose()
    }

    /// Insert a row and return its id.
    pub async fn insert(&self, table_name: &str, record: &Record) -> Result<i64> {
        let table = table(table_name)?;
        let mut conn = self.pool().acquire().await?;
        let id = insert_with(&mut conn, table, record).await?;
        log::debug!("Inserted {}#{}", table.name, id);
        Ok(id)
    }

    /// Update the columns present in `record`. Returns false when no row has `id`.
    pub async fn update(&self, table_name: &str, id: i64, record: &Record) -> Result<bool> {
        let table = table(table_name)?;
        let mut conn = self.pool().acquire().await?;
        let updated = update_with(&mut conn, table, id, record).await?;
        if updated {
            log::debug!("Updated {}#{}", table.name, id);
        }
        Ok(updated)
    }

    /// Delete a row. Returns false when no row has `id`.
    pub async fn delete(&self, table_name: &str, id: i64) -> Result<bool> {
        let table = table(table_name)?;
        let sql = format!("DELETE FROM {} WHERE id = ?", quote(table.name));
        let result = sqlx::query(&sql).bind(id).execute(self.pool()).await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            log::info!("Deleted {}#{}", table.name, id);
        }
        Ok(deleted)
    }

    /// Number of active rows in `table`.
    pub async fn count_active(&self, table_name: &str) -> Result<i64> {
        let table = table(table_name)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = 1",
            quote(table.name),
            quote(table.activity_column)
        );
        let count = sqlx::query_scalar(&sql).fetch_one(self.pool()).await?;
        Ok(count)
    }
}

pub(crate) async fn insert_with(
    conn: &mut SqliteConnection,
    table: &Table,
    record: &Record,
) -> Result<i64> {
    let values = table.prepare_write(record, WriteMode::Insert)?;
    let sql = if values.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", quote(table.name))
    } else {
        let columns: Vec<String> = values.iter().map(|(c, _)| quote(c)).collect();
        let placeholders = vec!["?"; values.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table.name),
            columns.join(", "),
            placeholders
        )
    };

    let mut query = sqlx::query(&sql);
    for (_, value) in &values {
        query = bind_value(query, value);
    }
    let result = query.execute(&mut *conn).await?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn update_with(
    conn: &mut SqliteConnection,
    table: &Table,
    id: i64,
    record: &Record,
) -> Result<bool> {
    let values = table.prepare_write(record, WriteMode::Update)?;
    let mut assignments: Vec<String> = values
        .iter()
        .map(|(c, _)| format!("{} = ?", quote(c)))
        .collect();
    assignments.push("updated_at = CURRENT_TIMESTAMP".to_string());
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?",
        quote(table.name),
        assignments.join(", ")
    );

    let mut query = sqlx::query(&sql);
    for (_, value) in &values {
        query = bind_value(query, value);
    }
    let result = query.bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}
