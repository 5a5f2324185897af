use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Storage settings for unsaved quote drafts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftConfig {
    /// Redis key prefix for drafts
    pub redis_key_prefix: String,
    /// Draft lifetime in seconds
    pub ttl_secs: u64,
    /// Largest accepted draft payload in bytes
    pub max_payload_bytes: usize,
}

impl DraftConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading draft configuration from environment variables");

        let redis_key_prefix = env::var("DRAFT_REDIS_PREFIX").unwrap_or_else(|_| {
            warn!("DRAFT_REDIS_PREFIX not set, defaulting to quote_draft:");
            "quote_draft:".to_string()
        });

        let ttl_secs = env::var("DRAFT_TTL_SECS")
            .unwrap_or_else(|_| {
                warn!("DRAFT_TTL_SECS not set, defaulting to 604800 seconds (7 days)");
                "604800".to_string()
            })
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid DRAFT_TTL_SECS value");
                ConfigError::InvalidValue("Invalid DRAFT_TTL_SECS value".to_string())
            })?;

        let max_payload_bytes = env::var("DRAFT_MAX_PAYLOAD_BYTES")
            .unwrap_or_else(|_| "262144".to_string())
            .parse::<usize>()
            .map_err(|_| {
                error!("Invalid DRAFT_MAX_PAYLOAD_BYTES value");
                ConfigError::InvalidValue("Invalid DRAFT_MAX_PAYLOAD_BYTES value".to_string())
            })?;
        debug!(ttl_secs, max_payload_bytes, "Draft limits");

        let config = DraftConfig {
            redis_key_prefix,
            ttl_secs,
            max_payload_bytes,
        };

        config.validate()?;
        info!("Draft configuration loaded successfully");
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        DraftConfig {
            redis_key_prefix: "test_quote_draft:".to_string(),
            ttl_secs: 60,
            max_payload_bytes: 4096,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis_key_prefix.is_empty() {
            error!("Draft key prefix is empty");
            return Err(ConfigError::ValidationError("Draft key prefix cannot be empty".to_string()));
        }

        if self.ttl_secs == 0 {
            error!("Draft TTL is 0");
            return Err(ConfigError::ValidationError("Draft TTL cannot be 0".to_string()));
        }

        if self.max_payload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "Draft payload limit cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn get_redis_key(&self, user_id: &str, draft_key: &str) -> String {
        format!("{}{}:{}", self.redis_key_prefix, user_id, draft_key)
    }
}

impl Default for DraftConfig {
    fn default() -> Self {
        DraftConfig {
            redis_key_prefix: "quote_draft:".to_string(),
            ttl_secs: 604_800,
            max_payload_bytes: 262_144,
        }
    }
}
