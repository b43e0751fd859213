//! Image upload endpoint.

use super::error::ApiError;
use crate::app_config::LimitsConfig;
use crate::entries::{EntryStore, NewEntry};
use crate::storage::StorageBackend;
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{post, web, HttpResponse};
use futures::TryStreamExt;
use serde::Serialize;
use std::sync::Arc;

/// Maximum size of the `name` and `email` fields
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_entry);
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub id: i32,
    pub image_url: String,
}

/// Fields collected from the multipart stream.
#[derive(Default)]
struct UploadForm {
    /// Original filename and contents
    image: Option<(String, Vec<u8>)>,
    name: Option<String>,
    email: Option<String>,
}

/// POST /upload - store an image and record who sent it
///
/// The whole form is read before anything is stored, so field order in the
/// request does not matter and an invalid form never reaches storage.
#[post("/upload")]
async fn create_entry(
    store: web::Data<Arc<dyn EntryStore>>,
    storage: web::Data<Arc<dyn StorageBackend>>,
    limits: web::Data<LimitsConfig>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_form(payload, limits.max_upload_bytes()).await?;

    let (image_name, data) = match form.image {
        Some((image_name, data)) if !data.is_empty() => (image_name, data),
        _ => return Err(ApiError::BadRequest("No image uploaded.".to_string())),
    };

    let (name, email) = match (form.name, form.email) {
        (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => (name, email),
        _ => {
            return Err(ApiError::BadRequest(
                "Name and email are required.".to_string(),
            ))
        }
    };

    let stored = storage.store(data, &image_name).await.map_err(|e| {
        log::error!("create_entry: storing {:?} failed: {}", image_name, e);
        ApiError::Internal("Image upload failed.".to_string())
    })?;

    // A failed insert leaves the stored image in place.
    let id = store
        .insert_entry(NewEntry {
            name,
            email,
            image_name,
            image_url: stored.url.clone(),
        })
        .await
        .map_err(|e| {
            log::error!(
                "create_entry: insert failed, {} is orphaned: {}",
                stored.url,
                e
            );
            ApiError::Internal("DB insert failed.".to_string())
        })?;

    log::info!("create_entry: saved entry {} ({})", id, stored.url);
    Ok(HttpResponse::Ok().json(CreatedResponse {
        message: "Entry saved",
        id,
        image_url: stored.url,
    }))
}

async fn read_form(mut payload: Multipart, max_image_bytes: usize) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let disposition = field.content_disposition();
        let field_name = disposition.get_name().map(str::to_owned);
        // `filename*=utf-8''...` carries the name when it is not plain ASCII.
        let filename = disposition.get_filename().map(str::to_owned).or_else(|| {
            disposition
                .get_filename_ext()
                .map(|ext| String::from_utf8_lossy(&ext.value).into_owned())
        });

        match (field_name.as_deref(), filename) {
            (Some("image"), Some(filename)) => {
                if form.image.is_some() {
                    return Err(ApiError::BadRequest(
                        "Only one image may be uploaded.".to_string(),
                    ));
                }
                let data = read_field(&mut field, max_image_bytes)
                    .await?
                    .ok_or_else(|| {
                        ApiError::PayloadTooLarge(format!(
                            "Image exceeds the {} byte upload limit.",
                            max_image_bytes
                        ))
                    })?;
                form.image = Some((filename, data));
            }
            (Some("name"), None) => form.name = Some(read_text(&mut field).await?),
            (Some("email"), None) => form.email = Some(read_text(&mut field).await?),
            _ => {
                // Unknown fields are skipped.
                while field.try_next().await.map_err(malformed)?.is_some() {}
            }
        }
    }

    Ok(form)
}

/// Read a field into memory. `None` if it grows past `limit` bytes.
async fn read_field(field: &mut Field, limit: usize) -> Result<Option<Vec<u8>>, ApiError> {
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(buf))
}

async fn read_text(field: &mut Field) -> Result<String, ApiError> {
    let buf = read_field(field, MAX_TEXT_FIELD_BYTES)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Form field is too long.".to_string()))?;
    String::from_utf8(buf)
        .map_err(|_| ApiError::BadRequest("Form fields must be UTF-8 text.".to_string()))
}

fn malformed(e: MultipartError) -> ApiError {
    log::error!("create_entry: multipart read error: {}", e);
    ApiError::BadRequest("Error interpreting user input.".to_string())
}
