//! Upload name sanitising.
//!
//! Uploaded files land under `<upload dir>/<folder>/<name>`, where both the
//! folder and the name come from the client. These helpers reduce them to a
//! safe ASCII subset so neither can escape the upload directory.

/// Folder used when the client does not name one.
pub const DEFAULT_FOLDER: &str = "general";

/// Reduce a client-supplied file name to a safe ASCII name.
///
/// Path components are discarded, whitespace becomes `_`, characters outside
/// `[A-Za-z0-9._-]` are dropped and leading dots/underscores are stripped.
/// Returns `None` if nothing usable is left.
///
/// # Examples
///
/// ```
/// use farmavet_core::util::names::secure_filename;
///
/// assert_eq!(secure_filename("My Photo.PNG"), Some("My_Photo.PNG".to_string()));
/// assert_eq!(secure_filename("../../etc/passwd"), Some("passwd".to_string()));
/// assert_eq!(secure_filename("año 2024.jpg"), Some("ao_2024.jpg".to_string()));
/// assert_eq!(secure_filename("..."), None);
/// ```
pub fn secure_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = cleaned.trim_start_matches(['.', '_']).trim_end_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalise a client-supplied upload folder.
///
/// Each `/`-separated segment is sanitised like a file name; empty, `.` and
/// `..` segments are dropped. Falls back to [`DEFAULT_FOLDER`].
///
/// # Examples
///
/// ```
/// use farmavet_core::util::names::normalize_folder;
///
/// assert_eq!(normalize_folder(Some("noticias")), "noticias");
/// assert_eq!(normalize_folder(Some("hero-media/2024")), "hero-media/2024");
/// assert_eq!(normalize_folder(Some("../secret")), "secret");
/// assert_eq!(normalize_folder(None), "general");
/// ```
pub fn normalize_folder(folder: Option<&str>) -> String {
    let segments: Vec<String> = folder
        .unwrap_or_default()
        .split(['/', '\\'])
        .filter_map(secure_filename)
        .collect();
    if segments.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        segments.join("/")
    }
}

/// Lower-cased extension after the last dot, if any.
pub fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
