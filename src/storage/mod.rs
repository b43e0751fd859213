//! Storage backend abstraction for uploaded images.
//!
//! Supports multiple backends:
//! - `local`: Local filesystem storage, served statically
//! - `cloudinary`: Cloudinary media hosting

pub mod cloudinary;
pub mod local;

use crate::app_config::StorageConfig;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a stored image ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// Server-relative path or absolute URL the image can be fetched from
    pub url: String,
    /// Backend-specific identifier (generated filename or provider public id)
    pub key: String,
}

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error
    Io(std::io::Error),
    /// Could not reach the media provider
    Remote(String),
    /// Media provider refused the upload
    Rejected(String),
    /// Backend is misconfigured
    Config(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::Remote(msg) => write!(f, "Remote storage error: {}", msg),
            StorageError::Rejected(msg) => write!(f, "Upload rejected: {}", msg),
            StorageError::Config(msg) => write!(f, "Storage misconfigured: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Trait for storage backends.
///
/// All storage backends must implement this trait to provide
/// a unified interface for image storage.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persist an image and return where it can be retrieved.
    async fn store(&self, data: Vec<u8>, original_filename: &str)
        -> Result<StoredObject, StorageError>;

    /// URL prefix and directory to serve read-only, if the backend
    /// needs the HTTP server to expose its files.
    fn static_mount(&self) -> Option<(String, PathBuf)> {
        None
    }
}

/// Build the backend selected by `config.backend`.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.backend.as_str() {
        "local" => Ok(Arc::new(local::LocalStorage::new(
            PathBuf::from(&config.upload_dir),
            config.public_prefix.clone(),
        )?)),
        "cloudinary" => Ok(Arc::new(cloudinary::CloudinaryStorage::new(config)?)),
        other => Err(StorageError::Config(format!(
            "unknown storage backend '{}'",
            other
        ))),
    }
}

/// Generate a stored filename: millisecond timestamp, a short random
/// suffix, and the original extension.
pub fn generate_filename(original_filename: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let stem = format!("{}-{}", millis, &suffix[..8]);

    match file_extension(original_filename) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Extension of the client filename, if it is plain alphanumeric.
fn file_extension(original_filename: &str) -> Option<&str> {
    Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}
