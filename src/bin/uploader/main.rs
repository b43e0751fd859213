use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use std::sync::Arc;
use uploader::app_config::AppConfig;
use uploader::entries::{DbEntryStore, EntryStore};
use uploader::storage::StorageBackend;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // An unreachable database is reported but does not stop the server.
    let store: Arc<dyn EntryStore> = Arc::new(DbEntryStore::open(&config.database).await);
    let storage: Arc<dyn StorageBackend> = uploader::storage::from_config(&config.storage)
        .context("Failed to initialize storage backend")?;
    let static_mount = storage.static_mount();
    let limits = config.limits.clone();

    let bind = (config.server.bind.clone(), config.server.port);
    log::info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        let app = App::new()
            .app_data(Data::new(store.clone()))
            .app_data(Data::new(storage.clone()))
            .app_data(Data::new(limits.clone()))
            .wrap(uploader::web::cors_headers())
            .wrap(Logger::new("%a \"%r\" %s %b %T"))
            .configure(uploader::web::configure);

        match &static_mount {
            Some((prefix, dir)) => app.service(actix_files::Files::new(prefix, dir)),
            None => app,
        }
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // A missing .env file is fine; the environment may already be set.
    let dotenv = dotenv::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = dotenv {
        log::debug!("No .env loaded: {}", err);
    }
}
