//! Image uploads for the admin editors.

use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use chrono::{DateTime, Local};
use farmavet_auth::AuthenticatedAdmin;
use farmavet_core::config::UploadConfig;
use farmavet_core::util::names::{file_extension, normalize_folder, secure_filename};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::state::AppState;

/// Public prefix the upload directory is served under.
pub const UPLOAD_URL_PREFIX: &str = "/static/uploads";

/// Body of a successful upload.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Uploaded {
    /// Public URL of the stored file
    pub url: String,
    /// Stored file name
    pub filename: String,
}

/// `POST /admin/upload`
///
/// Multipart form with a `file` part and an optional `folder` text part.
pub async fn upload(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    mut multipart: Multipart,
) -> Result<Json<Uploaded>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut folder: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(e.body_text()))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::bad_request(e.body_text()))?;
                file = Some((name, bytes.to_vec()));
            }
            Some("folder") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::bad_request(e.body_text()))?;
                folder = Some(text);
            }
            _ => {}
        }
    }

    let Some((original, bytes)) = file else {
        return Err(Error::upload("No se envió ningún archivo"));
    };
    let filename = match stored_name(&original, &state.config.uploads, Local::now()) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(username = %admin.username, file = %original, "upload rejected: {e}");
            return Err(e);
        }
    };
    let folder = normalize_folder(folder.as_deref());
    let saved = save(&state.config.uploads.dir, &folder, &filename, &bytes).await?;
    tracing::info!(username = %admin.username, url = %saved.url, size = bytes.len(), "file uploaded");
    Ok(Json(saved))
}

/// Name a file is stored under: a timestamp prefix plus the sanitised name.
///
/// Rejects empty names and extensions outside the allow-list.
pub fn stored_name(original: &str, uploads: &UploadConfig, now: DateTime<Local>) -> Result<String> {
    if original.trim().is_empty() {
        return Err(Error::upload("No se seleccionó ningún archivo"));
    }
    let name = secure_filename(original)
        .filter(|n| file_extension(n).is_some_and(|ext| uploads.is_allowed(&ext)))
        .ok_or_else(|| Error::upload("Tipo de archivo no permitido"))?;
    Ok(format!("{}{name}", now.format("%Y%m%d_%H%M%S_")))
}

/// Write `bytes` to `<dir>/<folder>/<filename>`, creating the folder.
pub async fn save(dir: &Path, folder: &str, filename: &str, bytes: &[u8]) -> Result<Uploaded> {
    let target_dir = dir.join(folder);
    tokio::fs::create_dir_all(&target_dir).await?;
    tokio::fs::write(target_dir.join(filename), bytes).await?;
    Ok(Uploaded {
        url: format!("{UPLOAD_URL_PREFIX}/{folder}/{filename}"),
        filename: filename.to_string(),
    })
}
