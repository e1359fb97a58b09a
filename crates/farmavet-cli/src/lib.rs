//! # farmavet-cli
//!
//! The `farmavet` binary: server entry point and administration tool.
//!
//! - `serve`: migrate, seed the default admin and run the HTTP server
//! - `migrate`: apply schema migrations
//! - `admin`: create accounts and reset passwords
//! - `methodologies`: import the laboratory summary sheet, show counts
//! - `config`: inspect and edit the TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;
pub mod error;

pub use cli::Cli;
pub use commands::run;
pub use error::{Error, Result};
