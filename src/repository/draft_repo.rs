use crate::config::DraftConfig;
use crate::model::draft::QuoteDraft;
use crate::util::redis::{RedisError, RedisServiceTrait};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Per-user storage of unsaved quote forms
#[async_trait]
pub trait DraftRepository: Send + Sync {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<QuoteDraft>, RedisError>;
    async fn set(&self, user_id: &str, draft: &QuoteDraft) -> Result<(), RedisError>;
    /// Returns whether a draft was removed
    async fn clear(&self, user_id: &str, key: &str) -> Result<bool, RedisError>;
}

pub struct RedisDraftRepository {
    config: DraftConfig,
    redis: Arc<dyn RedisServiceTrait>,
}

impl RedisDraftRepository {
    pub fn new(config: DraftConfig, redis: Arc<dyn RedisServiceTrait>) -> Self {
        RedisDraftRepository { config, redis }
    }
}

#[async_trait]
impl DraftRepository for RedisDraftRepository {
    #[instrument(skip(self))]
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<QuoteDraft>, RedisError> {
        let raw = self.redis.get_string(&self.config.get_redis_key(user_id, key)).await?;
        match raw {
            Some(raw) => {
                let draft = serde_json::from_str(&raw)
                    .map_err(|e| RedisError::SerializationError(e.to_string()))?;
                Ok(Some(draft))
            }
            None => {
                debug!("No draft stored");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, draft), fields(key = %draft.key))]
    async fn set(&self, user_id: &str, draft: &QuoteDraft) -> Result<(), RedisError> {
        let raw = serde_json::to_string(draft)
            .map_err(|e| RedisError::SerializationError(e.to_string()))?;
        self.redis
            .set_string_with_expiry(
                &self.config.get_redis_key(user_id, &draft.key),
                &raw,
                self.config.ttl_secs,
            )
            .await
    }

    #[instrument(skip(self))]
    async fn clear(&self, user_id: &str, key: &str) -> Result<bool, RedisError> {
        self.redis.delete(&self.config.get_redis_key(user_id, key)).await
    }
}
