//! Small helpers shared by the storage, HTTP and CLI layers.
//!
//! # Modules
//!
//! - [`names`]: Upload file name and folder sanitising

pub mod names;
