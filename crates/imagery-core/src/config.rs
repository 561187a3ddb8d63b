//! Configuration module
//!
//! Environment-driven configuration for the storage, metadata store, upload
//! policy and delivery URL signer. `.env` files are honoured via dotenvy.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::delivery::DeliveryUrlSigner;
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const PRESIGN_TTL_SECS: u64 = 15 * 60;
const MAX_UPLOAD_BYTES: i64 = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub s3_public_endpoint: Option<String>, // Host clients use to reach the store, if it differs
    pub local_storage_path: Option<String>,
    // Upload policy
    pub presign_ttl: Duration,
    /// 0 disables the size check
    pub max_upload_bytes: i64,
    // Transformation proxy
    pub imgproxy_base_url: String,
    pub imgproxy_key_hex: String,
    pub imgproxy_salt_hex: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => StorageBackend::from_str(&value)?,
            Err(_) => StorageBackend::S3,
        };

        let presign_ttl_secs = env::var("PRESIGN_TTL_SECONDS")
            .unwrap_or_else(|_| PRESIGN_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("PRESIGN_TTL_SECONDS must be a valid number"))?;

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| MAX_UPLOAD_BYTES.to_string())
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_BYTES must be a valid number"))?;

        Ok(Config {
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid number"))?,
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_TIMEOUT_SECONDS must be a valid number"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").or_else(|_| env::var("AWS_REGION")).ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_public_endpoint: env::var("S3_PUBLIC_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            presign_ttl: Duration::from_secs(presign_ttl_secs),
            max_upload_bytes,
            imgproxy_base_url: env::var("IMGPROXY_BASE_URL").unwrap_or_default(),
            imgproxy_key_hex: env::var("IMGPROXY_KEY_HEX").unwrap_or_default(),
            imgproxy_salt_hex: env::var("IMGPROXY_SALT_HEX").unwrap_or_default(),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.storage_backend == StorageBackend::S3 && self.s3_bucket.is_none() {
            return Err(anyhow::anyhow!("STORAGE_BACKEND=s3 requires S3_BUCKET to be set"));
        }

        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=local requires LOCAL_STORAGE_PATH to be set"
            ));
        }

        if self.max_upload_bytes < 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_BYTES cannot be negative"));
        }

        if self.is_production() && !self.imgproxy_base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "IMGPROXY_BASE_URL must use https in production"
            ));
        }

        self.delivery_signer()?;

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Bucket name used in `s3://bucket/key` source locators.
    pub fn source_bucket(&self) -> &str {
        self.s3_bucket.as_deref().unwrap_or("local")
    }

    pub fn delivery_signer(&self) -> Result<DeliveryUrlSigner, anyhow::Error> {
        DeliveryUrlSigner::from_hex(
            &self.imgproxy_base_url,
            &self.imgproxy_key_hex,
            &self.imgproxy_salt_hex,
        )
    }
}
