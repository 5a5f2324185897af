use crate::config::MinioConfig;
use async_trait::async_trait;
use bytes::Bytes;
use minio::s3::args::{
    BucketExistsArgs, GetObjectArgs, MakeBucketArgs, PutObjectArgs, RemoveObjectArgs,
};
use minio::s3::client::{Client, ClientBuilder};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use std::io::Cursor;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Blob storage used for quote files, signatures and company assets.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        object_name: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), MinioError>;
    async fn get_object(&self, bucket: &str, object_name: &str) -> Result<Bytes, MinioError>;
    async fn remove_object(&self, bucket: &str, object_name: &str) -> Result<(), MinioError>;
    /// Direct link for objects in public-read buckets
    fn download_link(&self, bucket: &str, object_name: &str) -> String;
}

/// Unique object name under `prefix`, keeping a readable tail of the
/// original file name.
pub fn object_key(prefix: &str, original_filename: &str) -> String {
    let cleaned: String = original_filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        format!("{}/{}", prefix.trim_end_matches('/'), Uuid::new_v4())
    } else {
        format!("{}/{}-{}", prefix.trim_end_matches('/'), Uuid::new_v4(), cleaned)
    }
}

pub fn generate_download_link(base_url: &str, bucket_name: &str, object_name: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        bucket_name,
        object_name
    )
}

/// Content type from the object name, for objects stored without one
pub fn guess_content_type(object_name: &str) -> &'static str {
    let extension = object_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct MinioService {
    client: Client,
    pub config: MinioConfig,
}

impl MinioService {
    /// Create a new MinIO service instance and make sure every bucket exists
    #[instrument(skip(config), fields(endpoint = %config.endpoint))]
    pub async fn new(config: MinioConfig) -> Result<Self, MinioError> {
        info!("Initializing MinIO service");

        config.validate().map_err(|e| {
            error!("MinIO configuration validation failed: {}", e);
            MinioError::ConfigError(e.to_string())
        })?;

        let base_url = config.get_endpoint_url().parse::<BaseUrl>()
            .map_err(|e| {
                error!("Failed to parse MinIO endpoint URL: {}", e);
                MinioError::ConnectionError(format!("Invalid endpoint URL: {}", e))
            })?;

        debug!("Creating MinIO client with endpoint: {}", config.get_endpoint_url());

        let static_provider = StaticProvider::new(&config.access_key, &config.secret_key, None);

        let client = ClientBuilder::new(base_url)
            .provider(Some(Box::new(static_provider)))
            .build()
            .map_err(|e| {
                error!("Failed to create MinIO client: {}", e);
                MinioError::ConnectionError(format!("Client creation failed: {}", e))
            })?;

        let service = Self { client, config };

        for bucket in service.config.buckets() {
            service.ensure_bucket_exists(bucket).await?;
        }

        info!("MinIO service initialized successfully");
        Ok(service)
    }

    #[instrument(skip(self))]
    async fn ensure_bucket_exists(&self, bucket: &str) -> Result<(), MinioError> {
        info!("Checking if bucket '{}' exists", bucket);

        let bucket_exists_args = BucketExistsArgs::new(bucket)
            .map_err(|e| {
                error!("Failed to create bucket exists args: {}", e);
                MinioError::InvalidArguments(e.to_string())
            })?;

        let exists = self.client.bucket_exists(&bucket_exists_args).await
            .map_err(|e| {
                error!("Failed to check if bucket exists: {}", e);
                MinioError::OperationError(format!("Bucket exists check failed: {}", e))
            })?;

        if exists {
            debug!("Bucket '{}' already exists", bucket);
            return Ok(());
        }

        warn!("Bucket '{}' does not exist, creating it", bucket);

        let make_bucket_args = MakeBucketArgs::new(bucket)
            .map_err(|e| {
                error!("Failed to create make bucket args: {}", e);
                MinioError::InvalidArguments(e.to_string())
            })?;

        self.client.make_bucket(&make_bucket_args).await
            .map_err(|e| {
                error!("Failed to create bucket '{}': {}", bucket, e);
                MinioError::OperationError(format!("Bucket creation failed: {}", e))
            })?;

        info!("Successfully created bucket '{}'", bucket);
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MinioService {
    #[instrument(skip(self, data), fields(bucket = %bucket, object_name = %object_name, size = data.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        object_name: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), MinioError> {
        info!("Uploading object '{}' to bucket '{}'", object_name, bucket);

        let bucket_name = bucket.to_string();
        let object_name_owned = object_name.to_string();
        let client = self.client.clone();
        let content_type_owned = content_type.map(|ct| ct.to_string());

        // PutObjectArgs borrows a std reader, so the upload runs off the async workers.
        tokio::task::spawn_blocking(move || {
            let mut reader = Cursor::new(data);
            let data_len = reader.get_ref().len();

            let mut args = PutObjectArgs::new(
                &bucket_name,
                &object_name_owned,
                &mut reader,
                Some(data_len),
                None,
            ).map_err(|e| MinioError::InvalidArguments(e.to_string()))?;

            if let Some(ref ct) = content_type_owned {
                args.content_type = ct;
            }

            futures::executor::block_on(client.put_object(&mut args))
                .map_err(|e| MinioError::OperationError(format!("Upload failed: {}", e)))?;

            info!("Successfully uploaded object '{}'", &object_name_owned);
            Ok(())
        })
        .await
        .map_err(|e| {
            error!("Failed to join blocking task for put_object: {}", e);
            MinioError::OperationError(format!("Join error: {}", e))
        })?
    }

    #[instrument(skip(self), fields(bucket = %bucket, object_name = %object_name))]
    async fn get_object(&self, bucket: &str, object_name: &str) -> Result<Bytes, MinioError> {
        info!("Downloading object '{}' from bucket '{}'", object_name, bucket);

        let args = GetObjectArgs::new(bucket, object_name)
            .map_err(|e| {
                error!("Failed to create get object args: {}", e);
                MinioError::InvalidArguments(e.to_string())
            })?;

        let response = self.client.get_object(&args).await
            .map_err(|e| {
                error!("Failed to get object '{}': {}", object_name, e);
                MinioError::ObjectNotFound(format!("{}/{}: {}", bucket, object_name, e))
            })?;

        let bytes = response.bytes().await
            .map_err(|e| {
                error!("Failed to read object data: {}", e);
                MinioError::OperationError(format!("Read failed: {}", e))
            })?;

        debug!("Downloaded object '{}' ({} bytes)", object_name, bytes.len());
        Ok(bytes)
    }

    #[instrument(skip(self), fields(bucket = %bucket, object_name = %object_name))]
    async fn remove_object(&self, bucket: &str, object_name: &str) -> Result<(), MinioError> {
        info!("Deleting object '{}' from bucket '{}'", object_name, bucket);

        let args = RemoveObjectArgs::new(bucket, object_name)
            .map_err(|e| {
                error!("Failed to create remove object args: {}", e);
                MinioError::InvalidArguments(e.to_string())
            })?;

        self.client.remove_object(&args).await
            .map_err(|e| {
                error!("Failed to delete object '{}': {}", object_name, e);
                MinioError::OperationError(format!("Delete failed: {}", e))
            })?;

        info!("Successfully deleted object '{}'", object_name);
        Ok(())
    }

    fn download_link(&self, bucket: &str, object_name: &str) -> String {
        generate_download_link(&self.config.links_prefix, bucket, object_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MinioError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),
}
