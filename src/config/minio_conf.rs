use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Object storage settings. Each asset kind lives in its own bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Company logos and signatures (private, served through the API)
    pub company_assets_bucket: String,
    /// Files attached to quotes (public-read)
    pub quote_files_bucket: String,
    /// Company and client signatures attached to quotes (public-read)
    pub signatures_bucket: String,
    /// Public base URL used to build direct download links
    pub links_prefix: String,
    pub region: Option<String>,
    pub secure: bool,
}

impl MinioConfig {
    /// Load MinIO configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MINIO_ENDPOINT: MinIO server endpoint (e.g., "localhost:9000")
    /// - MINIO_ACCESS_KEY / MINIO_SECRET_KEY: credentials
    /// - MINIO_COMPANY_ASSETS_BUCKET: defaults to "company-assets"
    /// - MINIO_QUOTE_FILES_BUCKET: defaults to "quote-files"
    /// - MINIO_SIGNATURES_BUCKET: defaults to "signatures"
    /// - MINIO_LINKS_PREFIX: public base URL for download links
    /// - MINIO_REGION: Optional region (defaults to "us-east-1")
    /// - MINIO_SECURE: Whether to use HTTPS (defaults to false)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MinIO configuration from environment variables");

        let endpoint = env::var("MINIO_ENDPOINT").map_err(|_| {
            error!("MINIO_ENDPOINT environment variable not found");
            ConfigError::EnvVarNotFound("MINIO_ENDPOINT".to_string())
        })?;
        debug!("MinIO endpoint: {}", endpoint);

        let access_key = env::var("MINIO_ACCESS_KEY").map_err(|_| {
            error!("MINIO_ACCESS_KEY environment variable not found");
            ConfigError::EnvVarNotFound("MINIO_ACCESS_KEY".to_string())
        })?;
        debug!("MinIO access key loaded (length: {} chars)", access_key.len());

        let secret_key = env::var("MINIO_SECRET_KEY").map_err(|_| {
            error!("MINIO_SECRET_KEY environment variable not found");
            ConfigError::EnvVarNotFound("MINIO_SECRET_KEY".to_string())
        })?;
        debug!("MinIO secret key loaded (length: {} chars)", secret_key.len());

        let company_assets_bucket = bucket_from_env("MINIO_COMPANY_ASSETS_BUCKET", "company-assets");
        let quote_files_bucket = bucket_from_env("MINIO_QUOTE_FILES_BUCKET", "quote-files");
        let signatures_bucket = bucket_from_env("MINIO_SIGNATURES_BUCKET", "signatures");

        let region = env::var("MINIO_REGION").ok().or_else(|| {
            warn!("MINIO_REGION not set, using default: us-east-1");
            Some("us-east-1".to_string())
        });
        debug!("MinIO region: {:?}", region);

        let secure = env::var("MINIO_SECURE")
            .unwrap_or_else(|_| {
                warn!("MINIO_SECURE not set, defaulting to false (HTTP)");
                "false".to_string()
            })
            .parse()
            .unwrap_or_else(|_| {
                warn!("Invalid MINIO_SECURE value, defaulting to false");
                false
            });
        debug!("MinIO secure connection: {}", secure);

        let links_prefix = env::var("MINIO_LINKS_PREFIX").unwrap_or_else(|_| {
            warn!("MINIO_LINKS_PREFIX not set, using default: http://127.0.0.1:9000");
            "http://127.0.0.1:9000".to_string()
        });
        debug!("MinIO links prefix: {}", links_prefix);

        let config = Self {
            endpoint,
            access_key,
            secret_key,
            company_assets_bucket,
            quote_files_bucket,
            signatures_bucket,
            links_prefix,
            region,
            secure,
        };

        config.validate()?;
        info!("MinIO configuration loaded successfully");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        info!("Validating MinIO configuration");

        if self.endpoint.is_empty() {
            error!("MinIO endpoint is empty");
            return Err(ConfigError::ValidationError("Endpoint cannot be empty".to_string()));
        }

        if self.access_key.is_empty() {
            error!("MinIO access key is empty");
            return Err(ConfigError::ValidationError("Access key cannot be empty".to_string()));
        }

        if self.secret_key.is_empty() {
            error!("MinIO secret key is empty");
            return Err(ConfigError::ValidationError("Secret key cannot be empty".to_string()));
        }

        for bucket in self.buckets() {
            validate_bucket_name(bucket)?;
        }

        info!("MinIO configuration validation successful");
        Ok(())
    }

    /// All buckets the service writes to
    pub fn buckets(&self) -> [&str; 3] {
        [
            self.company_assets_bucket.as_str(),
            self.quote_files_bucket.as_str(),
            self.signatures_bucket.as_str(),
        ]
    }

    /// Get the full endpoint URL with protocol
    pub fn get_endpoint_url(&self) -> String {
        let protocol = if self.secure { "https" } else { "http" };
        let url = format!("{}://{}", protocol, self.endpoint);
        debug!("Generated MinIO endpoint URL: {}", url);
        url
    }
}

fn bucket_from_env(var: &str, default: &str) -> String {
    let bucket = env::var(var).unwrap_or_else(|_| {
        debug!("{} not set, using default: {}", var, default);
        default.to_string()
    });
    debug!("{}: {}", var, bucket);
    bucket
}

fn validate_bucket_name(bucket: &str) -> Result<(), ConfigError> {
    if !bucket.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.') {
        error!("Invalid bucket name format: {}", bucket);
        return Err(ConfigError::ValidationError(format!(
            "Bucket name '{}' contains invalid characters",
            bucket
        )));
    }

    if bucket.len() < 3 || bucket.len() > 63 {
        error!("Invalid bucket name length: {}", bucket.len());
        return Err(ConfigError::ValidationError(format!(
            "Bucket name '{}' must be between 3 and 63 characters",
            bucket
        )));
    }
    Ok(())
}

impl Default for MinioConfig {
    fn default() -> Self {
        warn!("Using default MinIO configuration - this should only be used for testing");
        Self {
            endpoint: "localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            company_assets_bucket: "company-assets".to_string(),
            quote_files_bucket: "quote-files".to_string(),
            signatures_bucket: "signatures".to_string(),
            links_prefix: "http://127.0.0.1:9000".to_string(),
            region: Some("us-east-1".to_string()),
            secure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MinioConfig::default();
        assert_eq!(config.endpoint, "localhost:9000");
        assert_eq!(config.buckets(), ["company-assets", "quote-files", "signatures"]);
        assert_eq!(config.region, Some("us-east-1".to_string()));
        assert!(!config.secure);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = MinioConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_endpoint() {
        let mut config = MinioConfig::default();
        config.endpoint = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_bucket_name() {
        let mut config = MinioConfig::default();
        config.signatures_bucket = "ab".to_string();
        assert!(config.validate().is_err());

        let mut config = MinioConfig::default();
        config.quote_files_bucket = "Quote_Files".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_get_endpoint_url() {
        let mut config = MinioConfig::default();
        assert_eq!(config.get_endpoint_url(), "http://localhost:9000");

        config.secure = true;
        assert_eq!(config.get_endpoint_url(), "https://localhost:9000");
    }
}
