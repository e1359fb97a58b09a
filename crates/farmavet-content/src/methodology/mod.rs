//! Laboratory methodologies.
//!
//! A methodology row describes one analyte measured by one method in one
//! matrix. For display, rows that differ only by analyte are merged into a
//! single [`DisplayGroup`] and partitioned by category.
//!
//! # Modules
//!
//! - [`grouping`]: Category / method / key grouping for display
//! - [`limits`]: Numeric extraction from free-text LOD/LOQ
//! - [`count`]: Unique methodology counting
//! - [`import`]: Laboratory summary sheet parsing

pub mod count;
pub mod grouping;
pub mod import;
pub mod limits;

pub use count::{MethodologyCount, count_unique};
pub use grouping::{CategoryGroups, DisplayGroup, GroupKey, flatten, group_methodologies};
pub use import::{
    MethodologyDraft, SheetFormat, SheetImport, parse_methodology_sheet, parse_methodology_workbook,
};
pub use limits::{LimitRange, first_number};

/// Column names of the `metodologias` table.
pub mod fields {
    /// Method name (translatable)
    pub const NOMBRE: &str = "nombre";
    /// Category; blank rows fall into [`super::DEFAULT_CATEGORY`]
    pub const CATEGORIA: &str = "categoria";
    /// Analyte (translatable)
    pub const ANALITO: &str = "analito";
    /// Sample matrix (translatable)
    pub const MATRIZ: &str = "matriz";
    /// Technique / equipment (translatable, optional)
    pub const TECNICA: &str = "tecnica";
    /// Limit of detection, free text
    pub const LIMITE_DETECCION: &str = "limite_deteccion";
    /// Limit of quantification, free text
    pub const LIMITE_CUANTIFICACION: &str = "limite_cuantificacion";
    /// Accreditation flag stored as integer
    pub const ACREDITADA: &str = "acreditada";
    /// Internal method code (ITLF)
    pub const CODIGO: &str = "codigo";
    /// Reference standard
    pub const NORMA_REFERENCIA: &str = "norma_referencia";
    /// Validity period
    pub const VIGENCIA: &str = "vigencia";
    /// Manual ordering
    pub const ORDEN: &str = "orden";
}

/// Category used for rows without one.
pub const DEFAULT_CATEGORY: &str = "otros";
