use crate::model::quote_share::{QuoteAccessLog, QuoteShare};
use crate::repository::mongo::{collect, ACCESS_LOGS, QUOTE_SHARES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

#[async_trait]
pub trait QuoteShareRepository: Send + Sync {
    async fn create(&self, share: QuoteShare) -> RepositoryResult<QuoteShare>;
    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<QuoteShare>>;
    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteShare>>;
    async fn revoke(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    async fn create(&self, log: QuoteAccessLog) -> RepositoryResult<QuoteAccessLog>;
    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteAccessLog>>;
}

pub struct MongoQuoteShareRepository {
    collection: Collection<QuoteShare>,
}

impl MongoQuoteShareRepository {
    pub fn new(db: &Database) -> Self {
        MongoQuoteShareRepository {
            collection: db.collection::<QuoteShare>(QUOTE_SHARES),
        }
    }
}

#[async_trait]
impl QuoteShareRepository for MongoQuoteShareRepository {
    async fn create(&self, share: QuoteShare) -> RepositoryResult<QuoteShare> {
        let mut share = share;
        share.id = Some(ObjectId::new());
        self.collection.insert_one(&share, None).await?;
        Ok(share)
    }

    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<QuoteShare>> {
        Ok(self.collection.find_one(doc! { "token": token }, None).await?)
    }

    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteShare>> {
        let cursor = self.collection.find(doc! { "quote_id": quote_id }, None).await?;
        collect(cursor).await
    }

    async fn revoke(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "revoked": true } }, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Share not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()> {
        self.collection.delete_many(doc! { "quote_id": quote_id }, None).await?;
        Ok(())
    }
}

pub struct MongoAccessLogRepository {
    collection: Collection<QuoteAccessLog>,
}

impl MongoAccessLogRepository {
    pub fn new(db: &Database) -> Self {
        MongoAccessLogRepository {
            collection: db.collection::<QuoteAccessLog>(ACCESS_LOGS),
        }
    }
}

#[async_trait]
impl AccessLogRepository for MongoAccessLogRepository {
    async fn create(&self, log: QuoteAccessLog) -> RepositoryResult<QuoteAccessLog> {
        let mut log = log;
        log.id = Some(ObjectId::new());
        self.collection.insert_one(&log, None).await?;
        Ok(log)
    }

    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteAccessLog>> {
        let cursor = self.collection.find(doc! { "quote_id": quote_id }, None).await?;
        collect(cursor).await
    }
}
