#![allow(dead_code)]

pub mod memory;
pub mod multipart;

/// Build the API around the given store and storage backend.
///
/// Optional third argument: the `LimitsConfig` to use.
macro_rules! init_app {
    ($store:expr, $storage:expr) => {
        init_app!($store, $storage, uploader::app_config::LimitsConfig::default())
    };
    ($store:expr, $storage:expr, $limits:expr) => {{
        let store: std::sync::Arc<dyn uploader::entries::EntryStore> = $store.clone();
        let storage: std::sync::Arc<dyn uploader::storage::StorageBackend> = $storage.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(store))
                .app_data(actix_web::web::Data::new(storage))
                .app_data(actix_web::web::Data::new($limits))
                .wrap(uploader::web::cors_headers())
                .configure(uploader::web::configure),
        )
        .await
    }};
}

/// POST /upload request carrying `body`.
pub fn upload_request(body: multipart::MultipartBody) -> actix_web::test::TestRequest {
    let (content_type, payload) = body.finish();
    actix_web::test::TestRequest::post()
        .uri("/upload")
        .insert_header((actix_web::http::header::CONTENT_TYPE, content_type))
        .set_payload(payload)
}
