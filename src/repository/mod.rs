pub mod client_repo;
pub mod company_profile_repo;
pub mod draft_repo;
pub mod financial_config_repo;
pub mod follow_up_repo;
pub mod mongo;
pub mod quote_event_repo;
pub mod quote_file_repo;
pub mod quote_repo;
pub mod quote_share_repo;
pub mod quote_signature_repo;
pub mod repository_error;

use std::sync::Arc;

use mongodb::Database;

use client_repo::{ClientRepository, MongoClientRepository};
use company_profile_repo::{CompanyProfileRepository, MongoCompanyProfileRepository};
use financial_config_repo::{FinancialConfigRepository, MongoFinancialConfigRepository};
use follow_up_repo::{FollowUpRepository, MongoFollowUpRepository};
use quote_event_repo::{MongoQuoteEventRepository, QuoteEventRepository};
use quote_file_repo::{MongoQuoteFileRepository, QuoteFileRepository};
use quote_repo::{MongoQuoteRepository, QuoteRepository};
use quote_share_repo::{AccessLogRepository, MongoAccessLogRepository, MongoQuoteShareRepository, QuoteShareRepository};
use quote_signature_repo::{MongoQuoteSignatureRepository, QuoteSignatureRepository};

/// Every MongoDB-backed repository, shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub quotes: Arc<dyn QuoteRepository>,
    pub financial_configs: Arc<dyn FinancialConfigRepository>,
    pub files: Arc<dyn QuoteFileRepository>,
    pub signatures: Arc<dyn QuoteSignatureRepository>,
    pub events: Arc<dyn QuoteEventRepository>,
    pub shares: Arc<dyn QuoteShareRepository>,
    pub access_logs: Arc<dyn AccessLogRepository>,
    pub follow_ups: Arc<dyn FollowUpRepository>,
    pub companies: Arc<dyn CompanyProfileRepository>,
    pub clients: Arc<dyn ClientRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Repositories {
            quotes: Arc::new(MongoQuoteRepository::new(db)),
            financial_configs: Arc::new(MongoFinancialConfigRepository::new(db)),
            files: Arc::new(MongoQuoteFileRepository::new(db)),
            signatures: Arc::new(MongoQuoteSignatureRepository::new(db)),
            events: Arc::new(MongoQuoteEventRepository::new(db)),
            shares: Arc::new(MongoQuoteShareRepository::new(db)),
            access_logs: Arc::new(MongoAccessLogRepository::new(db)),
            follow_ups: Arc::new(MongoFollowUpRepository::new(db)),
            companies: Arc::new(MongoCompanyProfileRepository::new(db)),
            clients: Arc::new(MongoClientRepository::new(db)),
        }
    }
}
