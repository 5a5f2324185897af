use crate::model::financial_config::FinancialConfig;
use crate::repository::mongo::FINANCIAL_CONFIGS;
use crate::repository::repository_error::RepositoryResult;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::ReplaceOptions;
use mongodb::{Collection, Database};
use tracing::{info, instrument};

#[async_trait]
pub trait FinancialConfigRepository: Send + Sync {
    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Option<FinancialConfig>>;
    /// Inserts or replaces the single config of `config.quote_id`
    async fn upsert(&self, config: FinancialConfig) -> RepositoryResult<FinancialConfig>;
    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoFinancialConfigRepository {
    collection: Collection<FinancialConfig>,
}

impl MongoFinancialConfigRepository {
    pub fn new(db: &Database) -> Self {
        MongoFinancialConfigRepository {
            collection: db.collection::<FinancialConfig>(FINANCIAL_CONFIGS),
        }
    }
}

#[async_trait]
impl FinancialConfigRepository for MongoFinancialConfigRepository {
    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Option<FinancialConfig>> {
        Ok(self.collection.find_one(doc! { "quote_id": quote_id }, None).await?)
    }

    #[instrument(skip(self, config), fields(quote_id = %config.quote_id))]
    async fn upsert(&self, config: FinancialConfig) -> RepositoryResult<FinancialConfig> {
        let mut config = config;
        let existing = self.find_by_quote_id(config.quote_id).await?;
        config.id = existing.as_ref().and_then(|c| c.id).or_else(|| Some(ObjectId::new()));
        if let Some(existing) = existing {
            config.created_at = existing.created_at;
        }

        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(doc! { "quote_id": config.quote_id }, &config, options)
            .await?;
        info!("Financial config saved");
        Ok(config)
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()> {
        self.collection.delete_many(doc! { "quote_id": quote_id }, None).await?;
        Ok(())
    }
}
