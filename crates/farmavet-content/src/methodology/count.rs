//! Unique methodology counting.
//!
//! The public counters ("N methodologies, M accredited") treat rows that
//! share name, matrix, technique and category as one methodology, however
//! many analytes it covers. Values are compared raw, without translation.

use std::collections::HashMap;

use farmavet_core::FieldLookup;
use serde::Serialize;

use super::{DEFAULT_CATEGORY, fields};

/// Result of [`count_unique`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodologyCount {
    /// Distinct (name, matrix, technique, category) combinations
    pub unique: usize,
    /// Distinct combinations whose first row is accredited
    pub accredited: usize,
    /// Rows counted
    pub total_rows: usize,
}

impl MethodologyCount {
    /// Unique methodologies that are not accredited.
    pub fn not_accredited(&self) -> usize {
        self.unique - self.accredited
    }
}

/// Count unique methodologies in `entries`.
///
/// Accreditation of a methodology is taken from the first row seen for it.
pub fn count_unique<R: FieldLookup>(entries: &[R]) -> MethodologyCount {
    let mut seen: HashMap<(String, String, String, String), bool> = HashMap::new();
    for entry in entries {
        let text = |field: &str| {
            entry
                .field(field)
                .map(|v| v.to_text().into_owned())
                .unwrap_or_default()
        };
        let mut categoria = text(fields::CATEGORIA);
        if categoria.is_empty() {
            categoria = DEFAULT_CATEGORY.to_string();
        }
        let key = (
            text(fields::NOMBRE),
            text(fields::MATRIZ),
            text(fields::TECNICA),
            categoria,
        );
        let acreditada = entry
            .field(fields::ACREDITADA)
            .is_some_and(|v| v.is_truthy());
        seen.entry(key).or_insert(acreditada);
    }

    MethodologyCount {
        unique: seen.len(),
        accredited: seen.values().filter(|a| **a).count(),
        total_rows: entries.len(),
    }
}
