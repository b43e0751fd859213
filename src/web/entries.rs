use super::error::ApiError;
use crate::entries::EntryStore;
use actix_web::{delete, get, web, HttpResponse};
use serde::Serialize;
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.app_data(web::PathConfig::default().error_handler(|err, _req| {
        log::debug!("entries: rejected path: {}", err);
        ApiError::BadRequest("Invalid entry id.".to_string()).into()
    }))
    .service(list_entries)
    .service(delete_entry);
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /entries - every entry, in the order the database returns them
#[get("/entries")]
async fn list_entries(store: web::Data<Arc<dyn EntryStore>>) -> Result<HttpResponse, ApiError> {
    let entries = store.list_entries().await.map_err(|e| {
        log::error!("list_entries: {}", e);
        ApiError::Internal("DB fetch failed.".to_string())
    })?;

    log::debug!("list_entries: {} entries", entries.len());
    Ok(HttpResponse::Ok().json(entries))
}

/// DELETE /entries/{id} - remove the row; the stored image is kept
///
/// Succeeds whether or not the id existed.
#[delete("/entries/{id}")]
async fn delete_entry(
    store: web::Data<Arc<dyn EntryStore>>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let deleted = HttpResponse::Ok().json(MessageResponse {
        message: "Entry deleted",
    });

    // No row can carry an id the column type cannot hold.
    let id = match i32::try_from(id.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            log::debug!("delete_entry: id out of range, nothing to delete");
            return Ok(deleted);
        }
    };
    let affected = store.delete_entry(id).await.map_err(|e| {
        log::error!("delete_entry: {}: {}", id, e);
        ApiError::Internal("DB delete failed.".to_string())
    })?;

    if affected == 0 {
        log::debug!("delete_entry: no entry with id {}", id);
    } else {
        log::info!("delete_entry: deleted entry {}", id);
    }
    Ok(deleted)
}
