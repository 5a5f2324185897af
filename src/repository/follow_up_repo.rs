use crate::model::follow_up::{FollowUp, FollowUpStatus};
use crate::repository::mongo::{collect, FOLLOW_UPS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};
use tracing::instrument;

#[async_trait]
pub trait FollowUpRepository: Send + Sync {
    async fn create(&self, follow_up: FollowUp) -> RepositoryResult<FollowUp>;
    async fn update(&self, follow_up: &FollowUp) -> RepositoryResult<()>;
    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<FollowUp>>;
    /// Pending and scheduled follow-ups of every quote
    async fn list_active(&self) -> RepositoryResult<Vec<FollowUp>>;
    async fn delete_stopped_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<u64>;
    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoFollowUpRepository {
    collection: Collection<FollowUp>,
}

impl MongoFollowUpRepository {
    pub fn new(db: &Database) -> Self {
        MongoFollowUpRepository {
            collection: db.collection::<FollowUp>(FOLLOW_UPS),
        }
    }
}

#[async_trait]
impl FollowUpRepository for MongoFollowUpRepository {
    async fn create(&self, follow_up: FollowUp) -> RepositoryResult<FollowUp> {
        let mut follow_up = follow_up;
        follow_up.id = Some(ObjectId::new());
        self.collection.insert_one(&follow_up, None).await?;
        Ok(follow_up)
    }

    #[instrument(skip(self, follow_up), fields(id = ?follow_up.id, status = %follow_up.status))]
    async fn update(&self, follow_up: &FollowUp) -> RepositoryResult<()> {
        let id = follow_up
            .id
            .ok_or_else(|| RepositoryError::validation("Follow-up has no id"))?;
        let result = self.collection.replace_one(doc! { "_id": id }, follow_up, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Follow-up not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<FollowUp>> {
        let cursor = self.collection.find(doc! { "quote_id": quote_id }, None).await?;
        collect(cursor).await
    }

    async fn list_active(&self) -> RepositoryResult<Vec<FollowUp>> {
        let active = [FollowUpStatus::Pending, FollowUpStatus::Scheduled].map(|s| s.to_string());
        let cursor = self
            .collection
            .find(doc! { "status": { "$in": active.to_vec() } }, None)
            .await?;
        collect(cursor).await
    }

    async fn delete_stopped_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<u64> {
        let result = self
            .collection
            .delete_many(
                doc! { "quote_id": quote_id, "status": FollowUpStatus::Stopped.to_string() },
                None,
            )
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()> {
        self.collection.delete_many(doc! { "quote_id": quote_id }, None).await?;
        Ok(())
    }
}
