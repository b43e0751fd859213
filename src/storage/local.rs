//! Local filesystem storage backend.

use super::{generate_filename, StorageBackend, StorageError, StoredObject};
use actix_web::web;
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Local filesystem storage backend.
pub struct LocalStorage {
    /// Directory images are written to
    base_path: PathBuf,
    /// URL prefix `base_path` is served under
    public_prefix: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    ///
    /// The `base_path` directory will be created if it doesn't exist.
    pub fn new(base_path: PathBuf, public_prefix: String) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;
        log::info!("LocalStorage initialized at {:?}", base_path);

        let public_prefix = format!("/{}", public_prefix.trim_matches('/'));
        Ok(Self {
            base_path,
            public_prefix,
        })
    }

    fn public_url(&self, filename: &str) -> String {
        if self.public_prefix == "/" {
            format!("/{}", filename)
        } else {
            format!("{}/{}", self.public_prefix, filename)
        }
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
    ) -> Result<StoredObject, StorageError> {
        let filename = generate_filename(original_filename);
        let path = self.base_path.join(&filename);
        log::info!("LocalStorage: store: {:?} as {:?}", original_filename, path);

        // Use web::block for blocking file operations
        web::block(move || -> std::io::Result<()> {
            // Never overwrite an existing upload
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)?;
            file.write_all(&data)?;
            file.sync_all()
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        Ok(StoredObject {
            url: self.public_url(&filename),
            key: filename,
        })
    }

    fn static_mount(&self) -> Option<(String, PathBuf)> {
        Some((self.public_prefix.clone(), self.base_path.clone()))
    }
}
