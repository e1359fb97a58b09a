//! FARMAVET Core: shared types, traits, errors and utilities.
//!
//! This crate provides the foundational types used across all FARMAVET Web
//! crates. It has no internal dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`language`]: Site languages
//! - [`record`]: Scalar values, ordered records and the `FieldLookup` interface
//! - [`fields`]: Translation fallback for `X` / `X_en` column pairs
//! - [`traits`]: The `ConfigManager` trait
//! - [`config`]: Application configuration
//! - [`util`]: Upload name helpers

#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod fields;
pub mod language;
pub mod record;
pub mod traits;
pub mod util;

// Re-export key types at crate root for convenience
pub use config::FarmavetConfig;
pub use error::{Error, Result};
pub use fields::{localize, resolve, resolve_or, resolve_text, translated_key};
pub use language::Language;
pub use record::{FieldLookup, Record, Value};
pub use traits::ConfigManager;
