pub mod app_conf;
pub mod draft_conf;
pub mod email_conf;
pub mod follow_up_conf;
pub mod jwt_conf;
pub mod minio_conf;
pub mod mongo_conf;
pub mod quote_conf;
pub mod redis_conf;
pub mod share_conf;

pub use app_conf::AppConfig;
pub use draft_conf::DraftConfig;
pub use email_conf::EmailConfig;
pub use follow_up_conf::FollowUpConfig;
pub use jwt_conf::JwtConfig;
pub use minio_conf::MinioConfig;
pub use mongo_conf::MongoConfig;
pub use quote_conf::QuoteConfig;
pub use redis_conf::RedisConfig;
pub use share_conf::ShareConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
