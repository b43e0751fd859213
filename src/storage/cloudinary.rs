//! Cloudinary media hosting backend.
//!
//! Images are sent with a signed upload request into a configured folder.
//! With the default `authenticated` access mode the returned `secure_url`
//! only resolves for signed delivery requests.

use super::{StorageBackend, StorageError, StoredObject};
use crate::app_config::StorageConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::Duration;

/// Maximum time to wait for the provider to accept an upload
const UPLOAD_TIMEOUT_SECS: u64 = 60;

pub struct CloudinaryStorage {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
    folder: String,
    access_mode: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryStorage {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        for (value, name) in [
            (&config.cloudinary_cloud_name, "cloud name"),
            (&config.cloudinary_api_key, "API key"),
            (&config.cloudinary_api_secret, "API secret"),
        ] {
            if value.is_empty() {
                return Err(StorageError::Config(format!("Cloudinary {} is not set", name)));
            }
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let upload_url = format!(
            "{}/{}/image/upload",
            config.cloudinary_api_url.trim_end_matches('/'),
            config.cloudinary_cloud_name
        );
        log::info!(
            "CloudinaryStorage initialized for cloud: {}, folder: {}",
            config.cloudinary_cloud_name,
            config.cloudinary_folder
        );

        Ok(Self {
            client,
            upload_url,
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
            folder: config.cloudinary_folder.clone(),
            access_mode: config.cloudinary_access_mode.clone(),
        })
    }
}

/// Request signature: SHA-1 over the `key=value` pairs sorted by key and
/// joined with `&`, followed directly by the API secret.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl StorageBackend for CloudinaryStorage {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
    ) -> Result<StoredObject, StorageError> {
        log::info!("CloudinaryStorage: store: {}", original_filename);

        let params = vec![
            ("access_mode", self.access_mode.clone()),
            ("folder", self.folder.clone()),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
        ];
        let signature = sign_params(&params, &self.api_secret);

        let mut form = Form::new()
            .part(
                "file",
                Part::bytes(data).file_name(original_filename.to_owned()),
            )
            .text("api_key", self.api_key.clone())
            .text("signature", signature);
        for (key, value) in params.into_iter().filter(|(_, v)| !v.is_empty()) {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("HTTP {}", status),
            };
            return Err(StorageError::Rejected(message));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Remote(format!("Unreadable upload response: {}", e)))?;

        Ok(StoredObject {
            url: body.secure_url,
            key: body.public_id,
        })
    }
}
