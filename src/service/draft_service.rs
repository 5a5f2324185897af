use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};

use crate::config::DraftConfig;
use crate::model::draft::QuoteDraft;
use crate::repository::draft_repo::DraftRepository;
use crate::util::error::{ServiceError, ServiceResult};

const MAX_KEY_LENGTH: usize = 64;

#[async_trait]
pub trait DraftService: Send + Sync {
    async fn get_draft(&self, user_id: &str, key: &str) -> ServiceResult<QuoteDraft>;
    async fn save_draft(&self, user_id: &str, key: &str, payload: serde_json::Value) -> ServiceResult<QuoteDraft>;
    /// Whether a draft existed
    async fn clear_draft(&self, user_id: &str, key: &str) -> ServiceResult<bool>;
}

pub struct DraftServiceImpl {
    pub repo: Arc<dyn DraftRepository>,
    pub config: DraftConfig,
}

impl DraftServiceImpl {
    pub fn new(repo: Arc<dyn DraftRepository>, config: DraftConfig) -> Self {
        DraftServiceImpl { repo, config }
    }
}

/// Keys end up inside Redis key names, so only a safe alphabet is allowed
pub fn validate_draft_key(key: &str) -> ServiceResult<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "Draft key must be 1 to {} characters of letters, digits, '-' or '_'",
            MAX_KEY_LENGTH
        )))
    }
}

#[async_trait]
impl DraftService for DraftServiceImpl {
    async fn get_draft(&self, user_id: &str, key: &str) -> ServiceResult<QuoteDraft> {
        validate_draft_key(key)?;
        self.repo
            .get(user_id, key)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No draft saved under {}", key)))
    }

    #[instrument(skip(self, payload))]
    async fn save_draft(&self, user_id: &str, key: &str, payload: serde_json::Value) -> ServiceResult<QuoteDraft> {
        validate_draft_key(key)?;
        let size = serde_json::to_vec(&payload)
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?
            .len();
        if size > self.config.max_payload_bytes {
            return Err(ServiceError::InvalidInput(format!(
                "Draft is {} bytes, the limit is {}",
                size, self.config.max_payload_bytes
            )));
        }

        let draft = QuoteDraft {
            key: key.to_string(),
            payload,
            saved_at: Utc::now(),
        };
        self.repo.set(user_id, &draft).await?;
        debug!(size, "Draft saved");
        Ok(draft)
    }

    async fn clear_draft(&self, user_id: &str, key: &str) -> ServiceResult<bool> {
        validate_draft_key(key)?;
        Ok(self.repo.clear(user_id, key).await?)
    }
}
