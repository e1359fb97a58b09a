//! Display grouping of methodology rows.
//!
//! Rows are partitioned three levels deep, each level in first-seen order:
//!
//! 1. by raw `categoria` (blank ⇒ `"otros"`),
//! 2. by resolved `nombre` ("method buckets"),
//! 3. by [`GroupKey`]: resolved name, matrix and technique plus the raw
//!    limits and the accreditation flag.
//!
//! Rows sharing a key become one [`DisplayGroup`] listing every analyte.
//! Limits are compared as stored strings, so `"0.5 ug/kg"` and
//! `"0.50 ug/kg"` stay in separate groups.

use std::collections::HashMap;

use farmavet_core::{FieldLookup, Language, resolve};

use super::fields;
use super::limits::{LimitRange, first_number};
use super::DEFAULT_CATEGORY;

/// Identity of a display group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    /// Resolved method name
    pub nombre: String,
    /// Resolved matrix
    pub matriz: String,
    /// Resolved technique (empty when absent)
    pub tecnica: String,
    /// Raw limit of detection
    pub limite_deteccion: String,
    /// Raw limit of quantification
    pub limite_cuantificacion: String,
    /// Accreditation flag
    pub acreditada: bool,
}

impl GroupKey {
    /// Compute the key of `entry` for `language`.
    pub fn of<R: FieldLookup + ?Sized>(entry: &R, language: Language) -> Self {
        Self {
            nombre: resolved_text(entry, fields::NOMBRE, language),
            matriz: resolved_text(entry, fields::MATRIZ, language),
            tecnica: resolved_text(entry, fields::TECNICA, language),
            limite_deteccion: raw_text(entry, fields::LIMITE_DETECCION),
            limite_cuantificacion: raw_text(entry, fields::LIMITE_CUANTIFICACION),
            acreditada: entry
                .field(fields::ACREDITADA)
                .is_some_and(|v| v.is_truthy()),
        }
    }
}

/// Rows merged under one [`GroupKey`].
#[derive(Debug, Clone)]
pub struct DisplayGroup<'a, R> {
    /// Shared key
    pub key: GroupKey,
    /// Resolved analyte names, de-duplicated, first-seen order
    pub analytes: Vec<String>,
    /// First member; source of fields outside the key (code, reference, …)
    pub representative: &'a R,
    /// Every row in the group, input order
    pub members: Vec<&'a R>,
    /// First number of each member's LOD, where one was found
    pub lods: Vec<f64>,
    /// First number of each member's LOQ, where one was found
    pub loqs: Vec<f64>,
}

impl<'a, R: FieldLookup> DisplayGroup<'a, R> {
    fn new(key: GroupKey, first: &'a R) -> Self {
        Self {
            key,
            analytes: Vec::new(),
            representative: first,
            members: Vec::new(),
            lods: Vec::new(),
            loqs: Vec::new(),
        }
    }

    fn push(&mut self, entry: &'a R, analyte: String) {
        if !self.analytes.contains(&analyte) {
            self.analytes.push(analyte);
        }
        if let Some(n) = first_number(&raw_text(entry, fields::LIMITE_DETECCION)) {
            self.lods.push(n);
        }
        if let Some(n) = first_number(&raw_text(entry, fields::LIMITE_CUANTIFICACION)) {
            self.loqs.push(n);
        }
        self.members.push(entry);
    }

    /// More than one distinct analyte.
    pub fn is_grouped(&self) -> bool {
        self.analytes.len() > 1
    }

    /// Whether the group is accredited.
    pub fn acreditada(&self) -> bool {
        self.key.acreditada
    }

    /// Numeric LOD range across members, if any member had a number.
    pub fn detection_range(&self) -> Option<LimitRange> {
        LimitRange::from_values(self.lods.iter().copied())
    }

    /// Numeric LOQ range across members, if any member had a number.
    pub fn quantification_range(&self) -> Option<LimitRange> {
        LimitRange::from_values(self.loqs.iter().copied())
    }
}

/// All groups of one category, in display order.
#[derive(Debug, Clone)]
pub struct CategoryGroups<'a, R> {
    /// Raw category value, or `"otros"`
    pub category: String,
    /// Groups, method bucket by method bucket
    pub groups: Vec<DisplayGroup<'a, R>>,
}

impl<R> CategoryGroups<'_, R> {
    /// Number of rows across all groups.
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Group `entries` for display in `language`.
///
/// Entries whose resolved analyte is blank are dropped; every other entry
/// lands in exactly one group.
///
/// # Examples
///
/// ```
/// use farmavet_content::methodology::group_methodologies;
/// use farmavet_core::{Language, Record};
///
/// let base = Record::new()
///     .with("nombre", "Tetraciclinas")
///     .with("categoria", "residuos")
///     .with("matriz", "Carne")
///     .with("limite_deteccion", "0.5 ug/kg")
///     .with("acreditada", 1_i64);
/// let entries = vec![
///     base.clone().with("analito", "Tetraciclina"),
///     base.with("analito", "Oxitetraciclina"),
/// ];
///
/// let categories = group_methodologies(&entries, Language::Es);
/// assert_eq!(categories.len(), 1);
/// assert_eq!(categories[0].groups[0].analytes, ["Tetraciclina", "Oxitetraciclina"]);
/// ```
pub fn group_methodologies<R: FieldLookup>(
    entries: &[R],
    language: Language,
) -> Vec<CategoryGroups<'_, R>> {
    let mut categories: Vec<CategoryBuilder<'_, R>> = Vec::new();
    let mut category_index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let analyte = resolved_text(entry, fields::ANALITO, language);
        let analyte = analyte.trim();
        if analyte.is_empty() {
            log::trace!("Dropping methodology row without analyte");
            continue;
        }

        let category = category_of(entry);
        let idx = *category_index.entry(category.clone()).or_insert_with(|| {
            categories.push(CategoryBuilder::new(category));
            categories.len() - 1
        });
        categories[idx].push(entry, analyte.to_string(), language);
    }

    categories.into_iter().map(CategoryBuilder::finish).collect()
}

/// Flatten groups back into their rows, in display order.
pub fn flatten<'a, R>(categories: &[CategoryGroups<'a, R>]) -> Vec<&'a R> {
    categories
        .iter()
        .flat_map(|c| c.groups.iter())
        .flat_map(|g| g.members.iter().copied())
        .collect()
}

// ============================================================================
// Builders
// ============================================================================

struct CategoryBuilder<'a, R> {
    category: String,
    buckets: Vec<MethodBucket<'a, R>>,
    bucket_index: HashMap<String, usize>,
}

struct MethodBucket<'a, R> {
    groups: Vec<DisplayGroup<'a, R>>,
    group_index: HashMap<GroupKey, usize>,
}

impl<'a, R: FieldLookup> CategoryBuilder<'a, R> {
    fn new(category: String) -> Self {
        Self {
            category,
            buckets: Vec::new(),
            bucket_index: HashMap::new(),
        }
    }

    fn push(&mut self, entry: &'a R, analyte: String, language: Language) {
        let key = GroupKey::of(entry, language);

        let buckets = &mut self.buckets;
        let b = *self
            .bucket_index
            .entry(key.nombre.clone())
            .or_insert_with(|| {
                buckets.push(MethodBucket {
                    groups: Vec::new(),
                    group_index: HashMap::new(),
                });
                buckets.len() - 1
            });
        let bucket = &mut self.buckets[b];

        let groups = &mut bucket.groups;
        let g = *bucket.group_index.entry(key.clone()).or_insert_with(|| {
            groups.push(DisplayGroup::new(key, entry));
            groups.len() - 1
        });
        bucket.groups[g].push(entry, analyte);
    }

    fn finish(self) -> CategoryGroups<'a, R> {
        CategoryGroups {
            category: self.category,
            groups: self.buckets.into_iter().flat_map(|b| b.groups).collect(),
        }
    }
}

fn category_of<R: FieldLookup + ?Sized>(entry: &R) -> String {
    match entry.field(fields::CATEGORIA) {
        Some(v) if !v.is_blank() => v.to_text().into_owned(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

fn resolved_text<R: FieldLookup + ?Sized>(entry: &R, field: &str, language: Language) -> String {
    resolve(entry, field, language)
        .map(|v| v.to_text().into_owned())
        .unwrap_or_default()
}

fn raw_text<R: FieldLookup + ?Sized>(entry: &R, field: &str) -> String {
    entry
        .field(field)
        .map(|v| v.to_text().into_owned())
        .unwrap_or_default()
}
