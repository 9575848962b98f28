//! Photo gallery: external urls and uploaded files, paged newest first.

use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use tracing::{info, warn};

use kura_db::Database;
use kura_db::models::PhotoRow;
use kura_types::api::{AddPhotosResponse, Notice, PhotoPage};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiPath;
use crate::policy::{self, Action, Caller};
use crate::uploads::UploadStore;

pub const PHOTOS_PER_PAGE: i64 = 12;

/// Clamp a requested 1-based page and compute the page count.
/// Returns `(page, total_pages)`.
pub fn page_window(requested: Option<i64>, total: i64) -> (i64, i64) {
    let page = requested.unwrap_or(1).max(1);
    let total_pages = (total + PHOTOS_PER_PAGE - 1) / PHOTOS_PER_PAGE;
    (page, total_pages)
}

pub fn page(db: &Database, requested: Option<i64>) -> ApiResult<PhotoPage> {
    let total = db.count_photos()?;
    let (page, total_pages) = page_window(requested, total);
    let offset = (page - 1).saturating_mul(PHOTOS_PER_PAGE);

    let photos = db
        .list_photos_page(PHOTOS_PER_PAGE, offset)?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(PhotoPage { photos, page, total_pages, total })
}

/// Insert one row per source: the external url first, then stored uploads
/// in the order they arrived.
pub fn add(
    db: &Database,
    caller: &Caller,
    url: Option<&str>,
    stored: &[String],
) -> ApiResult<Vec<PhotoRow>> {
    policy::authorize(caller, Action::AddPhoto)?;

    let mut urls = Vec::with_capacity(stored.len() + 1);
    if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
        urls.push(url.to_string());
    }
    urls.extend(stored.iter().cloned());

    if urls.is_empty() {
        return Err(ApiError::validation("Choose a file or enter a photo url."));
    }

    let rows = db.insert_photos(&urls)?;
    info!("{} added {} photo(s)", caller.username, rows.len());
    Ok(rows)
}

/// Urls of the removed rows that no remaining photo points at.
fn unreferenced(db: &Database, rows: &[PhotoRow]) -> ApiResult<Vec<String>> {
    let mut urls: Vec<String> = Vec::new();
    for row in rows {
        if urls.contains(&row.url) {
            continue;
        }
        if db.count_photos_with_url(&row.url)? == 0 {
            urls.push(row.url.clone());
        }
    }
    Ok(urls)
}

/// Delete one photo. Returns the urls whose files can now be unlinked.
pub fn delete(db: &Database, caller: &Caller, id: i64) -> ApiResult<Vec<String>> {
    policy::authorize(caller, Action::DeletePhoto)?;

    let row = db
        .delete_photo(id)?
        .ok_or_else(|| ApiError::not_found("Photo not found."))?;
    info!("{} deleted photo {}", caller.username, id);
    unreferenced(db, std::slice::from_ref(&row))
}

pub fn delete_all(db: &Database, caller: &Caller) -> ApiResult<Vec<String>> {
    policy::authorize(caller, Action::DeleteAllPhotos)?;

    let rows = db.delete_all_photos()?;
    info!("{} deleted all {} photo(s)", caller.username, rows.len());
    unreferenced(db, &rows)
}

/// Best effort: a failed unlink is only logged.
async fn remove_uploads(uploads: &UploadStore, urls: &[String]) {
    for url in urls {
        if let Err(e) = uploads.remove(url).await {
            warn!("Failed to remove upload {}: {:#}", url, e);
        }
    }
}

/// Drain the form, saving file parts as they arrive. Saved urls go into
/// `stored` as soon as they exist so the caller can undo them on failure.
async fn read_upload(
    uploads: &UploadStore,
    multipart: &mut Multipart,
    stored: &mut Vec<String>,
) -> ApiResult<Option<String>> {
    let mut url = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo_url" => url = Some(field.text().await?),
            "photo_file" => {
                let original = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                // Browsers send an empty part when no file was chosen.
                if original.is_empty() && data.is_empty() {
                    continue;
                }
                stored.push(uploads.save(&original, &data).await?);
            }
            other => warn!("Ignoring unexpected upload field {:?}", other),
        }
    }
    Ok(url)
}

// -- Handlers --

/// POST /admin/add_photo
///
/// Multipart fields: an optional `photo_url` and any number of `photo_file`
/// parts. Files are written to the upload store before the rows go in; if
/// anything fails afterwards the files are removed again.
pub async fn add_photo(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<AddPhotosResponse>)> {
    policy::authorize(&caller, Action::AddPhoto)?;
    let mut multipart = multipart?;

    let mut stored = Vec::new();
    let url = match read_upload(&state.uploads, &mut multipart, &mut stored).await {
        Ok(url) => url,
        Err(e) => {
            remove_uploads(&state.uploads, &stored).await;
            return Err(e);
        }
    };

    let urls = stored.clone();
    let result = blocking(&state, move |s| add(&s.db, &caller, url.as_deref(), &urls)).await;
    let rows = match result {
        Ok(rows) => rows,
        Err(e) => {
            remove_uploads(&state.uploads, &stored).await;
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(AddPhotosResponse {
            notice: "Photo added.".into(),
            photos: rows.into_iter().map(Into::into).collect(),
        }),
    ))
}

/// POST /admin/delete_photo/{id}
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Notice>> {
    let orphans = blocking(&state, move |s| delete(&s.db, &caller, id)).await?;
    remove_uploads(&state.uploads, &orphans).await;
    Ok(Json(Notice::new("Photo deleted.")))
}

/// POST /admin/delete_all_photos
pub async fn delete_all_photos(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Notice>> {
    let orphans = blocking(&state, move |s| delete_all(&s.db, &caller)).await?;
    remove_uploads(&state.uploads, &orphans).await;
    Ok(Json(Notice::new("All photos deleted.")))
}
