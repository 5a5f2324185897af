use crate::model::quote_file::QuoteFile;
use crate::repository::mongo::{collect, QUOTE_FILES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

#[async_trait]
pub trait QuoteFileRepository: Send + Sync {
    async fn create(&self, file: QuoteFile) -> RepositoryResult<QuoteFile>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteFile>;
    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteFile>>;
    async fn delete_by_id(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<u64>;
}

pub struct MongoQuoteFileRepository {
    collection: Collection<QuoteFile>,
}

impl MongoQuoteFileRepository {
    pub fn new(db: &Database) -> Self {
        MongoQuoteFileRepository {
            collection: db.collection::<QuoteFile>(QUOTE_FILES),
        }
    }
}

#[async_trait]
impl QuoteFileRepository for MongoQuoteFileRepository {
    async fn create(&self, file: QuoteFile) -> RepositoryResult<QuoteFile> {
        let mut file = file;
        file.id = Some(ObjectId::new());
        self.collection.insert_one(&file, None).await?;
        Ok(file)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteFile> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Quote file not found for ID: {}", id)))
    }

    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteFile>> {
        let cursor = self.collection.find(doc! { "quote_id": quote_id }, None).await?;
        collect(cursor).await
    }

    async fn delete_by_id(&self, id: ObjectId) -> RepositoryResult<()> {
        self.collection.delete_one(doc! { "_id": id }, None).await?;
        Ok(())
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<u64> {
        let result = self.collection.delete_many(doc! { "quote_id": quote_id }, None).await?;
        Ok(result.deleted_count)
    }
}
