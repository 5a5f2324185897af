use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

/// Claims of the bearer tokens issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID), owner of every quote the caller touches
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
    #[error("Missing JWT secret")]
    MissingSecret,
}

pub trait JwtTokenUtils: Send + Sync {
    fn generate_access_token(&self, user_id: &str, email: Option<&str>) -> Result<String, JwtError>;
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }

    pub fn from_env() -> Result<Self, JwtError> {
        let jwt_config = JwtConfig::from_env().map_err(|e| {
            error!("JWT configuration unavailable: {}", e);
            JwtError::MissingSecret
        })?;
        Ok(JwtTokenUtilsImpl::new(jwt_config))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        match &self.jwt_config.jwt_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.jwt_config.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_access_token(&self, user_id: &str, email: Option<&str>) -> Result<String, JwtError> {
        debug!("Generating access token for user: {}", user_id);

        let now = Utc::now();
        let expiration = now + Duration::minutes(self.jwt_config.access_token_expiration);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.jwt_config.jwt_issuer.clone(),
            aud: self.jwt_config.jwt_audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
            .map(|token| {
                info!("Generated access token for user: {}", user_id);
                token
            })
            .map_err(|err| {
                error!("Failed to encode JWT token: {}", err);
                JwtError::EncodingFailed(err.to_string())
            })
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());

        match decode::<Claims>(token, &decoding_key, &self.validation()) {
            Ok(token_data) => {
                debug!("Token validation successful for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    warn!("Rejected expired token");
                    Err(JwtError::TokenExpired)
                }
                _ => {
                    warn!("Failed to decode JWT token: {}", err);
                    Err(JwtError::DecodingFailed(err.to_string()))
                }
            },
        }
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(JwtError::InvalidToken)?;

        if token.is_empty() {
            error!("Empty token in authorization header");
            return Err(JwtError::InvalidToken);
        }

        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate() {
        let utils = JwtTokenUtilsImpl::new(JwtConfig::default());
        let token = utils.generate_access_token("user-1", Some("a@b.fr")).unwrap();
        let claims = utils.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("a@b.fr"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let utils = JwtTokenUtilsImpl::new(JwtConfig::default());
        let token = utils.generate_access_token("user-1", None).unwrap();

        let mut other = JwtConfig::default();
        other.jwt_secret = "another_secret_key_that_is_long_enough_for_hs256_usage".to_string();
        let other = JwtTokenUtilsImpl::new(other);
        assert!(matches!(other.validate_access_token(&token), Err(JwtError::DecodingFailed(_))));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let utils = JwtTokenUtilsImpl::new(JwtConfig::default());
        let token = utils.generate_access_token("user-1", None).unwrap();

        let mut config = JwtConfig::default();
        config.jwt_audience = Some("someone-else".to_string());
        assert!(JwtTokenUtilsImpl::new(config).validate_access_token(&token).is_err());
    }

    #[test]
    fn test_extract_token_from_header() {
        let utils = JwtTokenUtilsImpl::new(JwtConfig::default());
        assert_eq!(utils.extract_token_from_header("Bearer abc").unwrap(), "abc");
        assert!(utils.extract_token_from_header("Basic abc").is_err());
        assert!(utils.extract_token_from_header("Bearer   ").is_err());
    }
}
