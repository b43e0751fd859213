pub mod entries;
pub mod error;
pub mod upload;

use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;
use actix_web::{route, HttpResponse, Responder};

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    upload::configure(conf);
    entries::configure(conf);

    conf.service(preflight);
}

/// Headers added to every response so browsers on other origins can call the API.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new().add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
}

/// Answer CORS preflight requests for any path.
#[route("/{tail:.*}", method = "OPTIONS")]
async fn preflight() -> impl Responder {
    HttpResponse::NoContent()
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, DELETE, OPTIONS"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .insert_header((header::ACCESS_CONTROL_MAX_AGE, "86400"))
        .finish()
}
