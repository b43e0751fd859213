//! Entry persistence.
//!
//! The HTTP layer talks to an [`EntryStore`] rather than to a connection
//! directly, so tests can swap in a substitute store.

use crate::app_config::DatabaseConfig;
use crate::db;
use crate::orm::entries;
use async_trait::async_trait;
use sea_orm::{entity::*, DatabaseConnection, DbErr, EntityTrait};
use std::sync::{Arc, RwLock};

pub type Entry = entries::Model;

/// Fields supplied by the client when creating an entry.
#[derive(Clone, Debug)]
pub struct NewEntry {
    pub name: String,
    pub email: String,
    pub image_name: String,
    pub image_url: String,
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert a row and return its auto-assigned id.
    async fn insert_entry(&self, entry: NewEntry) -> Result<i32, DbErr>;

    /// Every entry in the order the database returns them.
    async fn list_entries(&self) -> Result<Vec<Entry>, DbErr>;

    /// Delete by id, returning how many rows matched (0 or 1).
    async fn delete_entry(&self, id: i32) -> Result<u64, DbErr>;
}

/// [`EntryStore`] backed by the SeaORM connection pool.
///
/// When the database is unreachable at startup the pool is opened on the
/// next query instead; until then every operation fails with [`DbErr::Conn`].
pub struct DbEntryStore {
    db: RwLock<Option<Arc<DatabaseConnection>>>,
    config: Option<DatabaseConfig>,
}

impl DbEntryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: RwLock::new(Some(Arc::new(db))),
            config: None,
        }
    }

    /// A store that connects on first use.
    pub fn lazy(config: DatabaseConfig) -> Self {
        Self {
            db: RwLock::new(None),
            config: Some(config),
        }
    }

    /// Open the pool and run the startup check. Failures are logged and never
    /// stop the caller.
    pub async fn open(config: &DatabaseConfig) -> Self {
        match db::connect(config).await {
            Ok(conn) => {
                match db::check_connection(&conn).await {
                    Ok(()) => log::info!("Connected to database"),
                    Err(err) => log::error!("Database connection check failed: {}", err),
                }
                let mut store = Self::new(conn);
                store.config = Some(config.clone());
                store
            }
            Err(err) => {
                log::error!("Database connection failed, retrying on first query: {}", err);
                Self::lazy(config.clone())
            }
        }
    }

    async fn connection(&self) -> Result<Arc<DatabaseConnection>, DbErr> {
        let existing = self.db.read().map_err(|_| poisoned())?.clone();
        if let Some(conn) = existing {
            return Ok(conn);
        }

        let config = self
            .config
            .as_ref()
            .ok_or_else(|| DbErr::Conn("No database configured".to_string()))?;
        let conn = Arc::new(db::connect(config).await?);
        log::info!("Connected to database");

        // Two requests may race here; the first pool stored wins.
        let mut slot = self.db.write().map_err(|_| poisoned())?;
        Ok(slot.get_or_insert(conn).clone())
    }
}

fn poisoned() -> DbErr {
    DbErr::Custom("Connection slot poisoned".to_string())
}

#[async_trait]
impl EntryStore for DbEntryStore {
    async fn insert_entry(&self, entry: NewEntry) -> Result<i32, DbErr> {
        let model = entries::ActiveModel {
            name: Set(entry.name),
            email: Set(entry.email),
            image_name: Set(entry.image_name),
            image_url: Set(entry.image_url),
            ..Default::default()
        };

        let db = self.connection().await?;
        let res = entries::Entity::insert(model).exec(&*db).await?;
        Ok(res.last_insert_id)
    }

    async fn list_entries(&self) -> Result<Vec<Entry>, DbErr> {
        let db = self.connection().await?;
        entries::Entity::find().all(&*db).await
    }

    async fn delete_entry(&self, id: i32) -> Result<u64, DbErr> {
        let db = self.connection().await?;
        let res = entries::Entity::delete_by_id(id).exec(&*db).await?;
        Ok(res.rows_affected)
    }
}
