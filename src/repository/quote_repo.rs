use crate::model::quote::Quote;
use crate::model::quote_status::QuoteStatus;
use crate::repository::mongo::{collect, QUOTES, QUOTE_COUNTERS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use tracing::{error, info, instrument};

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote>;
    /// Same as `get_by_id` but scoped to the owner, other users get NotFound
    async fn get_for_user(&self, id: ObjectId, user_id: &str) -> RepositoryResult<Quote>;
    async fn update(&self, quote: &Quote) -> RepositoryResult<()>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Quote>>;
    /// Next value of the owner's quote sequence for `year`, starting at 1.
    /// Numbers are never handed out twice, deleted quotes included.
    async fn next_sequence(&self, user_id: &str, year: i32) -> RepositoryResult<u64>;
    async fn list_by_statuses(&self, statuses: &[QuoteStatus]) -> RepositoryResult<Vec<Quote>>;
}

pub struct MongoQuoteRepository {
    collection: Collection<Quote>,
    counters: Collection<Document>,
}

impl MongoQuoteRepository {
    pub fn new(db: &Database) -> Self {
        MongoQuoteRepository {
            collection: db.collection::<Quote>(QUOTES),
            counters: db.collection::<Document>(QUOTE_COUNTERS),
        }
    }
}

fn require_id(quote: &Quote) -> RepositoryResult<ObjectId> {
    quote
        .id
        .ok_or_else(|| RepositoryError::validation("Quote has no id"))
}

#[async_trait]
impl QuoteRepository for MongoQuoteRepository {
    #[instrument(skip(self, quote), fields(user_id = %quote.user_id, number = %quote.number))]
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote> {
        let mut new_quote = quote;
        new_quote.id = Some(ObjectId::new());

        self.collection.insert_one(&new_quote, None).await.map_err(|e| {
            error!("Failed to create quote: {}", e);
            RepositoryError::from(e)
        })?;
        info!(quote_id = ?new_quote.id, "Quote created");
        Ok(new_quote)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
    }

    #[instrument(skip(self), fields(id = %id, user_id = %user_id))]
    async fn get_for_user(&self, id: ObjectId, user_id: &str) -> RepositoryResult<Quote> {
        self.collection
            .find_one(doc! { "_id": id, "user_id": user_id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
    }

    #[instrument(skip(self, quote), fields(id = ?quote.id, status = %quote.status))]
    async fn update(&self, quote: &Quote) -> RepositoryResult<()> {
        let id = require_id(quote)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": id }, quote, None)
            .await
            .map_err(|e| {
                error!("Failed to update quote: {}", e);
                RepositoryError::from(e)
            })?;

        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No quote found to update for ID: {}", id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No quote found to delete for ID: {}", id)));
        }
        info!("Quote deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Quote>> {
        let cursor = self.collection.find(doc! { "user_id": user_id }, None).await?;
        let mut quotes = collect(cursor).await?;
        quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quotes)
    }

    #[instrument(skip(self))]
    async fn next_sequence(&self, user_id: &str, year: i32) -> RepositoryResult<u64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = self
            .counters
            .find_one_and_update(
                doc! { "_id": format!("{}:{}", user_id, year) },
                doc! { "$inc": { "seq": 1_i64 } },
                options,
            )
            .await
            .map_err(|e| {
                error!("Failed to bump quote counter: {}", e);
                RepositoryError::from(e)
            })?
            .ok_or_else(|| RepositoryError::database("Quote counter upsert returned nothing"))?;

        match counter.get("seq") {
            Some(Bson::Int64(n)) => u64::try_from(*n).map_err(|_| RepositoryError::validation("Quote counter out of range")),
            Some(Bson::Int32(n)) => u64::try_from(*n).map_err(|_| RepositoryError::validation("Quote counter out of range")),
            _ => Err(RepositoryError::serialization("Quote counter has no numeric seq")),
        }
    }

    #[instrument(skip(self))]
    async fn list_by_statuses(&self, statuses: &[QuoteStatus]) -> RepositoryResult<Vec<Quote>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        let cursor = self
            .collection
            .find(doc! { "status": { "$in": statuses } }, None)
            .await?;
        collect(cursor).await
    }
}
