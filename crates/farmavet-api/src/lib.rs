//! # farmavet-api
//!
//! HTTP server for FARMAVET Web.
//!
//! This crate provides:
//! - Localised JSON payloads for the public pages
//! - The language switch and methodology feed
//! - Login, sessions and the CSRF-protected admin area
//! - Generic content editing and image uploads
//!
//! ```no_run
//! use farmavet_api::{AppState, Server, bootstrap};
//! use farmavet_core::FarmavetConfig;
//! use farmavet_storage::Database;
//!
//! # async fn run() -> farmavet_api::Result<()> {
//! let config = FarmavetConfig::default();
//! let db = Database::connect(&config.database.path).await?;
//! db.migrate().await?;
//! bootstrap::seed_default_admin(&db).await?;
//! Server::new(AppState::new(db, config)).run().await
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{Error, Result};
pub use routes::build_router;
pub use server::{Server, shutdown_signal};
pub use state::AppState;
