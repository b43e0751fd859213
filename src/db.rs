//! Connection pool construction.

use crate::app_config::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

/// Build the MySQL connection URL from the configured parts.
///
/// Credentials are percent-encoded, so passwords containing `@` or `/` survive.
pub fn database_url(config: &DatabaseConfig) -> Result<String, DbErr> {
    if !config.url.is_empty() {
        return Ok(config.url.clone());
    }

    let invalid = |what: &str| DbErr::Custom(format!("Invalid database {}", what));

    let mut url = url::Url::parse(&format!("mysql://{}", config.host))
        .map_err(|e| DbErr::Custom(format!("Invalid database host: {}", e)))?;
    url.set_port(Some(config.port)).map_err(|_| invalid("port"))?;
    url.set_username(&config.user).map_err(|_| invalid("user"))?;
    if !config.password.is_empty() {
        url.set_password(Some(&config.password))
            .map_err(|_| invalid("password"))?;
    }
    url.set_path(&config.name);

    Ok(url.to_string())
}

/// Open the bounded connection pool.
///
/// Requests beyond `max_connections` wait for a free connection until the
/// acquire timeout instead of being rejected.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url(config)?);
    opt.max_connections(config.max_connections.max(1))
        .connect_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .sqlx_logging(false);

    log::info!(
        "Connecting to database {}:{}/{} (pool size {})",
        config.host,
        config.port,
        config.name,
        config.max_connections.max(1)
    );
    Database::connect(opt).await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn check_connection(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "SELECT 1".to_owned(),
    ))
    .await?;
    Ok(())
}
