//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with UPLOADER_, `__` between sections)
//! 2. Flat environment names used by older deployments (PORT, DB_HOST, ...)
//! 3. Config file (config.toml)
//! 4. Default values
//!
//! Secrets like database passwords and API keys should be kept in environment
//! variables, not in the config file.

use config::{Config, ConfigError, Environment, File, Map, Source, Value};
use serde::{Deserialize, Serialize};

/// Flat environment variable names and the setting each one feeds.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("UPLOAD_DIR", "storage.upload_dir"),
    ("DB_HOST", "database.host"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("DB_PORT", "database.port"),
    ("CLOUDINARY_CLOUD_NAME", "storage.cloudinary_cloud_name"),
    ("CLOUDINARY_API_KEY", "storage.cloudinary_api_key"),
    ("CLOUDINARY_API_SECRET", "storage.cloudinary_api_secret"),
];

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL; when set, the individual parts below are ignored
    pub url: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Should be in env var UPLOADER_DATABASE__PASSWORD or DB_PASSWORD
    pub password: String,
    pub name: String,
    /// Pool capacity. 1 gives a single, serialized connection.
    pub max_connections: u32,
    /// How long a request waits for a free pooled connection
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: "uploader".to_string(),
            max_connections: 10,
            acquire_timeout_seconds: 30,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend: "local" or "cloudinary"
    pub backend: String,
    /// Directory uploaded images are written to (used when backend = "local")
    pub upload_dir: String,
    /// URL prefix the upload directory is served under (used when backend = "local")
    pub public_prefix: String,
    /// Cloudinary API root (used when backend = "cloudinary")
    pub cloudinary_api_url: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    /// Should be in env var UPLOADER_STORAGE__CLOUDINARY_API_SECRET or CLOUDINARY_API_SECRET
    pub cloudinary_api_secret: String,
    /// Media folder uploads are placed in
    pub cloudinary_folder: String,
    /// Delivery access mode: "authenticated" or "public"
    pub cloudinary_access_mode: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            upload_dir: "uploads".to_string(),
            public_prefix: "/uploads".to_string(),
            cloudinary_api_url: "https://api.cloudinary.com/v1_1".to_string(),
            cloudinary_cloud_name: String::new(),
            cloudinary_api_key: String::new(),
            cloudinary_api_secret: String::new(),
            cloudinary_folder: "private_uploads".to_string(),
            cloudinary_access_mode: "authenticated".to_string(),
        }
    }
}

/// Upload limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in MB
    pub max_upload_size_mb: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: 10,
        }
    }
}

impl LimitsConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb as usize * 1024 * 1024
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(LegacyEnvironment)
            // e.g., UPLOADER_SERVER__PORT, UPLOADER_STORAGE__BACKEND
            .add_source(
                Environment::with_prefix("UPLOADER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Reads the flat variable names from [`LEGACY_ENV_KEYS`].
#[derive(Debug, Clone)]
struct LegacyEnvironment;

impl Source for LegacyEnvironment {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let origin = "legacy environment".to_string();
        let mut values = Map::new();
        for (var, key) in LEGACY_ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    values.insert(key.to_string(), Value::new(Some(&origin), value));
                }
            }
        }
        Ok(values)
    }
}
