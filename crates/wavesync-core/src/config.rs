//! Configuration module
//!
//! This module provides the configuration for the API server and the reconciliation
//! job: document store, object storage, upload limits and probe tuning.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_AUDIO_FOLDER, DEFAULT_COVER_FOLDER, DEFAULT_MAX_UPLOAD_SIZE_MB,
    DEFAULT_PROBE_FALLBACK_HOST, DEFAULT_RECONCILE_INTERVAL_MS, PLACEHOLDER_COVER_URL,
    PROBE_FALLBACK_MAX_BYTES, PROBE_PREFIX_BYTES,
};
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const PROBE_HEAD_TIMEOUT_SECS: u64 = 10;
const PROBE_RANGE_TIMEOUT_SECS: u64 = 30;
const PROBE_DEADLINE_SECS: u64 = 30;
const PROBE_FALLBACK_TIMEOUT_SECS: u64 = 45;

/// Document store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStoreBackend {
    Postgres,
    /// Process-local store; contents are lost on exit.
    Memory,
}

impl FromStr for DocumentStoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DocumentStoreBackend::Postgres),
            "memory" => Ok(DocumentStoreBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid document store: {}", s)),
        }
    }
}

/// Timeouts and limits for remote duration probing.
#[derive(Clone, Debug)]
pub struct ProbeSettings {
    pub head_timeout: Duration,
    pub range_timeout: Duration,
    /// Upper bound for the whole ranged strategy (HEAD + ranged GET + parse).
    pub deadline: Duration,
    pub fallback_timeout: Duration,
    pub prefix_bytes: u64,
    pub fallback_max_bytes: usize,
    /// Hosts (and their subdomains) eligible for the whole-file fallback.
    pub fallback_hosts: Vec<String>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            head_timeout: Duration::from_secs(PROBE_HEAD_TIMEOUT_SECS),
            range_timeout: Duration::from_secs(PROBE_RANGE_TIMEOUT_SECS),
            deadline: Duration::from_secs(PROBE_DEADLINE_SECS),
            fallback_timeout: Duration::from_secs(PROBE_FALLBACK_TIMEOUT_SECS),
            prefix_bytes: PROBE_PREFIX_BYTES,
            fallback_max_bytes: PROBE_FALLBACK_MAX_BYTES,
            fallback_hosts: vec![DEFAULT_PROBE_FALLBACK_HOST.to_string()],
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub environment: String,
    pub frontend_url: Option<String>,
    // Document store
    pub document_store: DocumentStoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Object storage
    pub storage_backend: StorageBackend,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Ingestion
    pub max_upload_size_bytes: usize,
    pub audio_folder: String,
    pub cover_folder: String,
    pub placeholder_cover_url: String,
    // Probing and reconciliation
    pub probe: ProbeSettings,
    pub reconcile_interval_ms: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn inner(&self) -> &AppConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn frontend_url(&self) -> Option<&str> {
        self.inner().frontend_url.as_deref()
    }

    pub fn document_store(&self) -> DocumentStoreBackend {
        self.inner().document_store
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn cloudinary_cloud_name(&self) -> Option<&str> {
        self.inner().cloudinary_cloud_name.as_deref()
    }

    pub fn cloudinary_api_key(&self) -> Option<&str> {
        self.inner().cloudinary_api_key.as_deref()
    }

    pub fn cloudinary_api_secret(&self) -> Option<&str> {
        self.inner().cloudinary_api_secret.as_deref()
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn audio_folder(&self) -> &str {
        &self.inner().audio_folder
    }

    pub fn cover_folder(&self) -> &str {
        &self.inner().cover_folder
    }

    pub fn placeholder_cover_url(&self) -> &str {
        &self.inner().placeholder_cover_url
    }

    pub fn probe_settings(&self) -> &ProbeSettings {
        &self.inner().probe
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.inner().reconcile_interval_ms)
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_secs(key: &str, default: u64) -> Duration {
    Duration::from_secs(env_parse(key, default))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env_opt("ENVIRONMENT")
            .or_else(|| env_opt("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match env_opt("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let document_store = env_opt("DOCUMENT_STORE")
            .map(|s| s.parse::<DocumentStoreBackend>())
            .transpose()?
            .unwrap_or(DocumentStoreBackend::Postgres);

        let storage_backend = env_opt("STORAGE_BACKEND")
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Cloudinary);

        let max_upload_size_mb = env_parse("MAX_UPLOAD_SIZE_MB", DEFAULT_MAX_UPLOAD_SIZE_MB);

        let fallback_hosts = env_opt("PROBE_FALLBACK_HOSTS")
            .unwrap_or_else(|| DEFAULT_PROBE_FALLBACK_HOST.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let probe = ProbeSettings {
            head_timeout: env_secs("PROBE_HEAD_TIMEOUT_SECS", PROBE_HEAD_TIMEOUT_SECS),
            range_timeout: env_secs("PROBE_RANGE_TIMEOUT_SECS", PROBE_RANGE_TIMEOUT_SECS),
            deadline: env_secs("PROBE_DEADLINE_SECS", PROBE_DEADLINE_SECS),
            fallback_timeout: env_secs("PROBE_FALLBACK_TIMEOUT_SECS", PROBE_FALLBACK_TIMEOUT_SECS),
            fallback_hosts,
            ..ProbeSettings::default()
        };

        Ok(AppConfig {
            server_port,
            environment,
            frontend_url: env_opt("FRONTEND_URL"),
            document_store,
            database_url: env_opt("DATABASE_URL"),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            storage_backend,
            cloudinary_cloud_name: env_opt("CLOUDINARY_CLOUD_NAME"),
            cloudinary_api_key: env_opt("CLOUDINARY_API_KEY"),
            cloudinary_api_secret: env_opt("CLOUDINARY_API_SECRET"),
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            audio_folder: env_opt("AUDIO_FOLDER")
                .unwrap_or_else(|| DEFAULT_AUDIO_FOLDER.to_string()),
            cover_folder: env_opt("COVER_FOLDER")
                .unwrap_or_else(|| DEFAULT_COVER_FOLDER.to_string()),
            placeholder_cover_url: env_opt("PLACEHOLDER_COVER_URL")
                .unwrap_or_else(|| PLACEHOLDER_COVER_URL.to_string()),
            probe,
            reconcile_interval_ms: env_parse("RECONCILE_INTERVAL_MS", DEFAULT_RECONCILE_INTERVAL_MS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let env = self.environment.to_lowercase();
        if (env == "production" || env == "prod") && self.frontend_url.is_none() {
            return Err(anyhow::anyhow!(
                "FRONTEND_URL must be set in production (CORS origin)"
            ));
        }

        if self.document_store == DocumentStoreBackend::Postgres {
            match self.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when DOCUMENT_STORE=postgres"
                    ))
                }
            }
        }

        match self.storage_backend {
            StorageBackend::Cloudinary => {
                if self.cloudinary_cloud_name.is_none()
                    || self.cloudinary_api_key.is_none()
                    || self.cloudinary_api_secret.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "STORAGE_BACKEND=cloudinary requires CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() || self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "STORAGE_BACKEND=s3 requires S3_BUCKET and S3_REGION (or AWS_REGION)"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "STORAGE_BACKEND=local requires LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL"
                    ));
                }
            }
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.probe.deadline < self.probe.head_timeout {
            return Err(anyhow::anyhow!(
                "PROBE_DEADLINE_SECS must not be shorter than PROBE_HEAD_TIMEOUT_SECS"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            frontend_url: None,
            document_store: DocumentStoreBackend::Memory,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::Local,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/wavesync".to_string()),
            local_storage_base_url: Some("http://localhost:5000/media".to_string()),
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            audio_folder: DEFAULT_AUDIO_FOLDER.to_string(),
            cover_folder: DEFAULT_COVER_FOLDER.to_string(),
            placeholder_cover_url: PLACEHOLDER_COVER_URL.to_string(),
            probe: ProbeSettings::default(),
            reconcile_interval_ms: DEFAULT_RECONCILE_INTERVAL_MS,
        }
    }

    #[test]
    fn default_probe_settings_match_documented_limits() {
        let probe = ProbeSettings::default();
        assert_eq!(probe.head_timeout, Duration::from_secs(10));
        assert_eq!(probe.range_timeout, Duration::from_secs(30));
        assert_eq!(probe.deadline, Duration::from_secs(30));
        assert_eq!(probe.fallback_timeout, Duration::from_secs(45));
        assert_eq!(probe.prefix_bytes, 1_048_576);
        assert_eq!(probe.fallback_max_bytes, 5 * 1024 * 1024);
        assert_eq!(probe.fallback_hosts, vec!["cloudinary.com".to_string()]);
    }

    #[test]
    fn validate_accepts_local_memory_setup() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_requires_database_url_for_postgres() {
        let mut config = base_config();
        config.document_store = DocumentStoreBackend::Postgres;
        assert!(config.validate().is_err());

        config.database_url = Some("mysql://localhost/db".to_string());
        assert!(config.validate().is_err());

        config.database_url = Some("postgresql://localhost/wavesync".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_requires_cloudinary_credentials() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::Cloudinary;
        assert!(config.validate().is_err());

        config.cloudinary_cloud_name = Some("demo".to_string());
        config.cloudinary_api_key = Some("key".to_string());
        config.cloudinary_api_secret = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_requires_frontend_url_in_production() {
        let mut config = base_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.frontend_url = Some("https://wavesync.app".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn document_store_backend_parses() {
        assert_eq!(
            "memory".parse::<DocumentStoreBackend>().unwrap(),
            DocumentStoreBackend::Memory
        );
        assert_eq!(
            "PostgreSQL".parse::<DocumentStoreBackend>().unwrap(),
            DocumentStoreBackend::Postgres
        );
        assert!("firestore".parse::<DocumentStoreBackend>().is_err());
    }
}
