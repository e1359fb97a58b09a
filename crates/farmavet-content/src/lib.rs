//! Content logic for FARMAVET Web.
//!
//! Everything here is a pure transformation over rows that implement
//! [`farmavet_core::FieldLookup`]: no I/O besides reading the laboratory's
//! spreadsheet, no shared state.
//!
//! # Modules
//!
//! - [`methodology`]: Methodology grouping, limit ranges, counting and import
//!   - [`methodology::grouping`]: Category / method / key grouping
//!   - [`methodology::limits`]: Numeric LOD/LOQ extraction and ranges
//!   - [`methodology::count`]: Unique methodology counts
//!   - [`methodology::import`]: Laboratory summary sheet parsing
//! - [`org_chart`]: Sections and subsections of the team page
//!
//! # Example
//!
//! ```rust
//! use farmavet_content::{count_unique, group_methodologies};
//! use farmavet_core::{Language, Record};
//!
//! let entries = vec![
//!     Record::new()
//!         .with("nombre", "Quinolonas")
//!         .with("analito", "Enrofloxacino")
//!         .with("matriz", "Leche")
//!         .with("acreditada", true),
//! ];
//!
//! let categories = group_methodologies(&entries, Language::En);
//! assert_eq!(categories[0].category, "otros");
//! assert_eq!(count_unique(&entries).accredited, 1);
//! ```

pub mod error;
pub mod methodology;
pub mod org_chart;

// Re-export commonly used types
pub use error::{Error, Result};
pub use methodology::{
    CategoryGroups, DisplayGroup, GroupKey, LimitRange, MethodologyCount, MethodologyDraft,
    SheetFormat, SheetImport, count_unique, group_methodologies, parse_methodology_sheet,
    parse_methodology_workbook,
};
pub use org_chart::{
    DirectionMember, OrgMember, OrgPosition, OrgSection, OrgSubsection, direction_members,
    organize_org_chart,
};
