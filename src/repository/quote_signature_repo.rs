use crate::model::quote_signature::{QuoteSignature, SignerKind};
use crate::repository::mongo::{collect, QUOTE_SIGNATURES};
use crate::repository::repository_error::RepositoryResult;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::ReplaceOptions;
use mongodb::{Collection, Database};

#[async_trait]
pub trait QuoteSignatureRepository: Send + Sync {
    /// Stores the signature of `signer_kind`, returning the one it replaced
    async fn upsert(&self, signature: QuoteSignature) -> RepositoryResult<(QuoteSignature, Option<QuoteSignature>)>;
    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteSignature>>;
    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteSignature>>;
}

pub struct MongoQuoteSignatureRepository {
    collection: Collection<QuoteSignature>,
}

impl MongoQuoteSignatureRepository {
    pub fn new(db: &Database) -> Self {
        MongoQuoteSignatureRepository {
            collection: db.collection::<QuoteSignature>(QUOTE_SIGNATURES),
        }
    }
}

fn key(quote_id: ObjectId, signer_kind: SignerKind) -> bson::Document {
    doc! { "quote_id": quote_id, "signer_kind": signer_kind.to_string() }
}

#[async_trait]
impl QuoteSignatureRepository for MongoQuoteSignatureRepository {
    async fn upsert(&self, signature: QuoteSignature) -> RepositoryResult<(QuoteSignature, Option<QuoteSignature>)> {
        let mut signature = signature;
        let filter = key(signature.quote_id, signature.signer_kind);
        let previous = self.collection.find_one(filter.clone(), None).await?;
        signature.id = previous.as_ref().and_then(|s| s.id).or_else(|| Some(ObjectId::new()));

        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection.replace_one(filter, &signature, options).await?;
        Ok((signature, previous))
    }

    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteSignature>> {
        let cursor = self.collection.find(doc! { "quote_id": quote_id }, None).await?;
        collect(cursor).await
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteSignature>> {
        let removed = self.find_by_quote_id(quote_id).await?;
        self.collection.delete_many(doc! { "quote_id": quote_id }, None).await?;
        Ok(removed)
    }
}
