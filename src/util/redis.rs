use crate::config::RedisConfig;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, error, info, instrument};

/// Key/value operations the draft store needs from Redis
#[async_trait]
pub trait RedisServiceTrait: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>, RedisError>;
    async fn set_string_with_expiry(&self, key: &str, value: &str, expiry_secs: u64) -> Result<(), RedisError>;
    async fn delete(&self, key: &str) -> Result<bool, RedisError>;
    async fn ping(&self) -> Result<String, RedisError>;
}

#[derive(Clone)]
pub struct RedisService {
    connection_manager: ConnectionManager,
}

impl RedisService {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: RedisConfig) -> Result<Self, RedisError> {
        info!("Initializing Redis service");

        config.validate().map_err(|e| {
            error!("Redis configuration validation failed: {}", e);
            RedisError::ConfigError(e.to_string())
        })?;

        let client = Client::open(config.get_connection_url())
            .map_err(|e| {
                error!("Failed to create Redis client: {}", e);
                RedisError::ConnectionError(format!("Client creation failed: {}", e))
            })?;

        let connect = ConnectionManager::new(client);
        let timeout = std::time::Duration::from_secs(config.connection_timeout_secs);
        let connection_manager = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| {
                error!("Timed out connecting to Redis after {:?}", timeout);
                RedisError::TimeoutError(format!("No connection after {:?}", timeout))
            })?
            .map_err(|e| {
                error!("Failed to create Redis connection manager: {}", e);
                RedisError::ConnectionError(format!("Connection manager creation failed: {}", e))
            })?;

        let service = Self { connection_manager };
        RedisServiceTrait::ping(&service).await?;

        info!("Redis service initialized successfully");
        Ok(service)
    }

    fn connection(&self) -> ConnectionManager {
        self.connection_manager.clone()
    }
}

#[async_trait]
impl RedisServiceTrait for RedisService {
    #[instrument(skip(self), fields(key = %key))]
    async fn get_string(&self, key: &str) -> Result<Option<String>, RedisError> {
        let mut conn = self.connection();
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            error!("Failed to get key '{}': {}", key, e);
            RedisError::OperationError(format!("Get operation failed: {}", e))
        })?;
        debug!(found = value.is_some(), "Fetched key");
        Ok(value)
    }

    #[instrument(skip(self, value), fields(key = %key, ttl_secs = expiry_secs))]
    async fn set_string_with_expiry(&self, key: &str, value: &str, expiry_secs: u64) -> Result<(), RedisError> {
        let mut conn = self.connection();
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(expiry_secs)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!("Failed to setex key '{}': {}", key, e);
                RedisError::OperationError(format!("Setex operation failed: {}", e))
            })?;
        debug!("Stored key with TTL");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, key: &str) -> Result<bool, RedisError> {
        let mut conn = self.connection();
        let deleted: u64 = conn.del(key).await.map_err(|e| {
            error!("Failed to delete key '{}': {}", key, e);
            RedisError::OperationError(format!("Delete operation failed: {}", e))
        })?;
        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<String, RedisError> {
        let mut conn = self.connection();
        let result: String = redis::cmd("PING").query_async(&mut conn).await.map_err(|e| {
            error!("Redis ping failed: {}", e);
            RedisError::OperationError(format!("Ping failed: {}", e))
        })?;

        if result == "PONG" {
            Ok(result)
        } else {
            error!("Unexpected ping response: {}", result);
            Err(RedisError::OperationError(format!("Unexpected ping response: {}", result)))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),
}
