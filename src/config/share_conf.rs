use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;
use crate::util::token::{MAX_TOKEN_LENGTH, MIN_TOKEN_LENGTH};

/// Settings for the public quote links sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Frontend base URL hosting the public quote page
    pub frontend_base_url: String,
    /// Path of the public quote page (e.g., "/quote-share")
    pub share_path: String,
    /// Token length in characters
    pub token_length: usize,
}

impl ShareConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading share link configuration from environment variables");

        let frontend_base_url = env::var("FRONTEND_BASE_URL").map_err(|_| {
            error!("FRONTEND_BASE_URL environment variable not found");
            ConfigError::EnvVarNotFound("FRONTEND_BASE_URL".to_string())
        })?;
        debug!("Frontend base URL: {}", frontend_base_url);

        let share_path = env::var("QUOTE_SHARE_PATH").unwrap_or_else(|_| {
            warn!("QUOTE_SHARE_PATH not set, defaulting to /quote-share");
            "/quote-share".to_string()
        });

        let token_length = env::var("QUOTE_SHARE_TOKEN_LENGTH")
            .unwrap_or_else(|_| {
                warn!("QUOTE_SHARE_TOKEN_LENGTH not set, defaulting to 32 characters");
                "32".to_string()
            })
            .parse::<usize>()
            .map_err(|_| {
                error!("Invalid QUOTE_SHARE_TOKEN_LENGTH value");
                ConfigError::InvalidValue("Invalid QUOTE_SHARE_TOKEN_LENGTH value".to_string())
            })?;
        debug!("Share token length: {} characters", token_length);

        let config = ShareConfig {
            frontend_base_url,
            share_path,
            token_length,
        };

        config.validate()?;
        info!("Share link configuration loaded successfully");
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        ShareConfig {
            frontend_base_url: "http://localhost:3000".to_string(),
            share_path: "/quote-share".to_string(),
            token_length: 16,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frontend_base_url.starts_with("http://")
            && !self.frontend_base_url.starts_with("https://")
        {
            error!("Frontend base URL must start with http:// or https://");
            return Err(ConfigError::ValidationError(
                "Frontend base URL must start with http:// or https://".to_string(),
            ));
        }

        if !self.share_path.starts_with('/') {
            error!("Share path must start with /");
            return Err(ConfigError::ValidationError("Share path must start with /".to_string()));
        }

        if !(MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&self.token_length) {
            error!(token_length = self.token_length, "Share token length out of range");
            return Err(ConfigError::ValidationError(format!(
                "Share token length must be between {} and {} characters",
                MIN_TOKEN_LENGTH, MAX_TOKEN_LENGTH
            )));
        }

        Ok(())
    }

    /// Public URL the client opens to view the quote
    pub fn generate_share_url(&self, token: &str) -> String {
        let base_url = self.frontend_base_url.trim_end_matches('/');
        let path = self.share_path.trim_matches('/');
        format!("{}/{}/{}", base_url, path, token)
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            frontend_base_url: "https://example.com".to_string(),
            share_path: "/quote-share".to_string(),
            token_length: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        assert!(ShareConfig::from_test_env().validate().is_ok());
        assert!(ShareConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let mut config = ShareConfig::from_test_env();
        config.frontend_base_url = "localhost:3000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_short_token_length() {
        let mut config = ShareConfig::from_test_env();
        config.token_length = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_long_token_length() {
        let mut config = ShareConfig::from_test_env();
        config.token_length = 128;
        assert!(config.validate().is_ok());
        config.token_length = 129;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generate_share_url() {
        let mut config = ShareConfig::from_test_env();
        assert_eq!(
            config.generate_share_url("abc123"),
            "http://localhost:3000/quote-share/abc123"
        );

        config.frontend_base_url = "http://localhost:3000/".to_string();
        config.share_path = "/quote-share/".to_string();
        assert_eq!(
            config.generate_share_url("abc123"),
            "http://localhost:3000/quote-share/abc123"
        );
    }
}
