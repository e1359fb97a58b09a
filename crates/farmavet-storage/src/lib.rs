//! SQLite storage for FARMAVET Web.
//!
//! All access goes through [`Database`], a cloneable handle over a `sqlx`
//! pool. Content tables are described once in [`catalogue`]; the generic
//! repository validates every write against it, so the admin API can edit any
//! table without per-table code.
//!
//! # Modules
//!
//! - [`database`]: Connection pool and row conversion
//! - [`migrations`]: Versioned schema
//! - [`catalogue`]: Content tables, columns and write validation
//! - [`repository`]: List / get / insert / update / delete
//! - [`admins`]: Administrator accounts
//! - [`methodologies`]: Methodology upsert for the spreadsheet import
//! - [`pages`]: Joined queries for the team page
//!
//! # Example
//!
//! ```rust,no_run
//! use farmavet_core::Record;
//! use farmavet_storage::{Database, ListFilter};
//!
//! # async fn demo() -> farmavet_storage::Result<()> {
//! let db = Database::connect("instance/database.db").await?;
//! db.migrate().await?;
//! db.insert("convenios", &Record::new().with("nombre", "SAG")).await?;
//! let active = db.list("convenios", &ListFilter::active()).await?;
//! assert_eq!(active.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod admins;
pub mod catalogue;
pub mod database;
pub mod error;
pub mod methodologies;
pub mod migrations;
pub mod pages;
pub mod repository;

pub use admins::Admin;
pub use catalogue::{Column, ColumnKind, TABLES, Table, WriteMode, table};
pub use database::{Database, row_to_record};
pub use error::{Error, Result};
pub use methodologies::{ImportSummary, UpsertOutcome};
pub use migrations::{MIGRATIONS, Migration};
pub use repository::ListFilter;
