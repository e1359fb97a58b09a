//! Translation fallback for bilingual fields.
//!
//! Content tables store Spanish text in a base column `X` and an optional
//! English translation in `X_en`. When rendering in English the translation
//! wins if it has any non-blank content; otherwise the base column is used.
//!
//! ```
//! use farmavet_core::{resolve, Language, Record, Value};
//!
//! let noticia = Record::new().with("titulo", "Hola").with("titulo_en", "");
//! assert_eq!(resolve(&noticia, "titulo", Language::En), Some(&Value::from("Hola")));
//!
//! let noticia = noticia.with("titulo_en", "Hello");
//! assert_eq!(resolve(&noticia, "titulo", Language::En), Some(&Value::from("Hello")));
//! assert_eq!(resolve(&noticia, "titulo", Language::Es), Some(&Value::from("Hola")));
//! ```

use crate::language::Language;
use crate::record::{FieldLookup, Record, Value};

/// Suffix of translated companion columns.
pub const TRANSLATION_SUFFIX: &str = "_en";

/// Name of the English companion of `field`.
pub fn translated_key(field: &str) -> String {
    format!("{field}{TRANSLATION_SUFFIX}")
}

/// Resolve the display value of `field` for `language`.
///
/// Returns the `_en` companion when the language is English and the companion
/// exists with a non-blank value. Otherwise returns the base field if it exists
/// (including when it is null), or `None` when the base field is absent too.
pub fn resolve<'a, R>(record: &'a R, field: &str, language: Language) -> Option<&'a Value>
where
    R: FieldLookup + ?Sized,
{
    if language.is_english()
        && let Some(value) = record.field(&translated_key(field))
        && !value.is_blank()
    {
        return Some(value);
    }
    record.field(field)
}

/// Like [`resolve`], with a caller-supplied default when nothing resolves.
pub fn resolve_or<'a, R>(
    record: &'a R,
    field: &str,
    language: Language,
    default: &'a Value,
) -> &'a Value
where
    R: FieldLookup + ?Sized,
{
    resolve(record, field, language).unwrap_or(default)
}

/// Resolve and stringify. Missing and null values become the empty string.
pub fn resolve_text<R>(record: &R, field: &str, language: Language) -> String
where
    R: FieldLookup + ?Sized,
{
    resolve(record, field, language)
        .map(|v| v.to_text().into_owned())
        .unwrap_or_default()
}

/// Produce a copy of `record` with every translatable field resolved.
///
/// For each base field `X` that has an `X_en` companion, `X` holds the
/// resolved value and `X_en` is dropped. Companions without a base field and
/// all other fields are kept untouched.
pub fn localize(record: &Record, language: Language) -> Record {
    let mut out = Record::new();
    for (key, value) in record.iter() {
        if let Some(base) = key.strip_suffix(TRANSLATION_SUFFIX)
            && record.contains_key(base)
        {
            continue;
        }
        if record.contains_key(&translated_key(key)) {
            let resolved = resolve(record, key, language).cloned().unwrap_or_default();
            out.insert(key, resolved);
        } else {
            out.insert(key, value.clone());
        }
    }
    out
}
