use crate::model::company_profile::CompanyProfile;
use crate::repository::mongo::COMPANY_PROFILES;
use crate::repository::repository_error::RepositoryResult;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::ReplaceOptions;
use mongodb::{Collection, Database};
use tracing::{info, instrument};

#[async_trait]
pub trait CompanyProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> RepositoryResult<Option<CompanyProfile>>;
    /// Keyed by owner: a user never has two profiles
    async fn upsert(&self, profile: CompanyProfile) -> RepositoryResult<CompanyProfile>;
}

pub struct MongoCompanyProfileRepository {
    collection: Collection<CompanyProfile>,
}

impl MongoCompanyProfileRepository {
    pub fn new(db: &Database) -> Self {
        MongoCompanyProfileRepository {
            collection: db.collection::<CompanyProfile>(COMPANY_PROFILES),
        }
    }
}

#[async_trait]
impl CompanyProfileRepository for MongoCompanyProfileRepository {
    async fn find_by_user(&self, user_id: &str) -> RepositoryResult<Option<CompanyProfile>> {
        Ok(self.collection.find_one(doc! { "user_id": user_id }, None).await?)
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    async fn upsert(&self, profile: CompanyProfile) -> RepositoryResult<CompanyProfile> {
        let mut profile = profile;
        if profile.id.is_none() {
            profile.id = Some(ObjectId::new());
        }
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(doc! { "user_id": &profile.user_id }, &profile, options)
            .await?;
        info!("Company profile saved");
        Ok(profile)
    }
}
