use crate::model::quote_event::{QuoteEvent, QuoteEventType};
use crate::repository::mongo::{collect, QUOTE_EVENTS};
use crate::repository::repository_error::RepositoryResult;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

#[async_trait]
pub trait QuoteEventRepository: Send + Sync {
    async fn create(&self, event: QuoteEvent) -> RepositoryResult<QuoteEvent>;
    async fn exists(&self, quote_id: ObjectId, event_type: QuoteEventType) -> RepositoryResult<bool>;
    /// Oldest first
    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteEvent>>;
    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoQuoteEventRepository {
    collection: Collection<QuoteEvent>,
}

impl MongoQuoteEventRepository {
    pub fn new(db: &Database) -> Self {
        MongoQuoteEventRepository {
            collection: db.collection::<QuoteEvent>(QUOTE_EVENTS),
        }
    }
}

#[async_trait]
impl QuoteEventRepository for MongoQuoteEventRepository {
    async fn create(&self, event: QuoteEvent) -> RepositoryResult<QuoteEvent> {
        let mut event = event;
        event.id = Some(ObjectId::new());
        self.collection.insert_one(&event, None).await?;
        Ok(event)
    }

    async fn exists(&self, quote_id: ObjectId, event_type: QuoteEventType) -> RepositoryResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "quote_id": quote_id, "event_type": event_type.to_string() }, None)
            .await?;
        Ok(count > 0)
    }

    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteEvent>> {
        let cursor = self.collection.find(doc! { "quote_id": quote_id }, None).await?;
        let mut events = collect(cursor).await?;
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(events)
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()> {
        self.collection.delete_many(doc! { "quote_id": quote_id }, None).await?;
        Ok(())
    }
}
