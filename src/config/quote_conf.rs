use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Prefix of generated quote numbers, e.g. "DEV" gives "DEV-2024-0001"
    pub number_prefix: String,
    /// Validity applied to new quotes that do not carry a valid_until date
    pub default_validity_days: i64,
    /// Largest accepted upload for quote files and company assets, in bytes
    pub max_upload_bytes: usize,
}

impl QuoteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading quote configuration from environment variables");

        let number_prefix = env::var("QUOTE_NUMBER_PREFIX").unwrap_or_else(|_| {
            warn!("QUOTE_NUMBER_PREFIX not set, defaulting to DEV");
            "DEV".to_string()
        });

        let default_validity_days = env::var("QUOTE_DEFAULT_VALIDITY_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .map_err(|_| {
                error!("Invalid QUOTE_DEFAULT_VALIDITY_DAYS value");
                ConfigError::InvalidValue("Invalid QUOTE_DEFAULT_VALIDITY_DAYS value".to_string())
            })?;

        let max_upload_bytes = env::var("QUOTE_MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse::<usize>()
            .map_err(|_| {
                error!("Invalid QUOTE_MAX_UPLOAD_BYTES value");
                ConfigError::InvalidValue("Invalid QUOTE_MAX_UPLOAD_BYTES value".to_string())
            })?;
        debug!(%number_prefix, default_validity_days, max_upload_bytes, "Quote settings");

        let config = QuoteConfig {
            number_prefix,
            default_validity_days,
            max_upload_bytes,
        };

        config.validate()?;
        info!("Quote configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.number_prefix.is_empty()
            || !self.number_prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            error!("Invalid quote number prefix: {}", self.number_prefix);
            return Err(ConfigError::ValidationError(
                "Quote number prefix must be non-empty and alphanumeric".to_string(),
            ));
        }

        if self.default_validity_days <= 0 {
            return Err(ConfigError::ValidationError(
                "Default validity must be at least one day".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError("Upload limit cannot be 0".to_string()));
        }

        Ok(())
    }

    pub fn format_number(&self, year: i32, sequence: u64) -> String {
        format!("{}-{}-{:04}", self.number_prefix, year, sequence)
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        QuoteConfig {
            number_prefix: "DEV".to_string(),
            default_validity_days: 30,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
