#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use bson::oid::ObjectId;
use bytes::Bytes;
use chrono::Utc;

use artisan_quote_backend::app::app::{create_router, AppServices, ServiceSettings};
use artisan_quote_backend::config::{DraftConfig, FollowUpConfig, JwtConfig, ShareConfig};
use artisan_quote_backend::middlewares::auth_middleware::AuthState;
use artisan_quote_backend::model::client::Client;
use artisan_quote_backend::model::company_profile::CompanyProfile;
use artisan_quote_backend::model::draft::QuoteDraft;
use artisan_quote_backend::model::financial_config::FinancialConfig;
use artisan_quote_backend::model::follow_up::{FollowUp, FollowUpStatus};
use artisan_quote_backend::model::quote::Quote;
use artisan_quote_backend::model::quote_event::{QuoteEvent, QuoteEventType};
use artisan_quote_backend::model::quote_file::QuoteFile;
use artisan_quote_backend::model::quote_share::{QuoteAccessLog, QuoteShare};
use artisan_quote_backend::model::quote_signature::QuoteSignature;
use artisan_quote_backend::model::quote_status::QuoteStatus;
use artisan_quote_backend::repository::client_repo::ClientRepository;
use artisan_quote_backend::repository::company_profile_repo::CompanyProfileRepository;
use artisan_quote_backend::repository::draft_repo::DraftRepository;
use artisan_quote_backend::repository::financial_config_repo::FinancialConfigRepository;
use artisan_quote_backend::repository::follow_up_repo::FollowUpRepository;
use artisan_quote_backend::repository::quote_event_repo::QuoteEventRepository;
use artisan_quote_backend::repository::quote_file_repo::QuoteFileRepository;
use artisan_quote_backend::repository::quote_repo::QuoteRepository;
use artisan_quote_backend::repository::quote_share_repo::{AccessLogRepository, QuoteShareRepository};
use artisan_quote_backend::repository::quote_signature_repo::QuoteSignatureRepository;
use artisan_quote_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use artisan_quote_backend::repository::Repositories;
use artisan_quote_backend::util::email::{EmailError, EmailMessage, EmailSender};
use artisan_quote_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use artisan_quote_backend::util::minio::{MinioError, ObjectStorage};
use artisan_quote_backend::util::redis::RedisError;

pub const USER: &str = "artisan-1";
pub const OTHER_USER: &str = "artisan-2";

// --- Mongo stand-ins ---

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    pub items: Mutex<Vec<Quote>>,
    pub counters: Mutex<HashMap<(String, i32), u64>>,
}

impl InMemoryQuoteRepository {
    pub fn all(&self) -> Vec<Quote> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote> {
        let mut quote = quote;
        quote.id = Some(ObjectId::new());
        self.items.lock().unwrap().push(quote.clone());
        Ok(quote)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
    }

    async fn get_for_user(&self, id: ObjectId, user_id: &str) -> RepositoryResult<Quote> {
        let quote = self.get_by_id(id).await?;
        if quote.user_id != user_id {
            return Err(RepositoryError::not_found(format!("Quote not found for ID: {}", id)));
        }
        Ok(quote)
    }

    async fn update(&self, quote: &Quote) -> RepositoryResult<()> {
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|q| q.id == quote.id)
            .ok_or_else(|| RepositoryError::not_found("Quote not found"))?;
        *slot = quote.clone();
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        self.items.lock().unwrap().retain(|q| q.id != Some(id));
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Quote>> {
        let mut quotes: Vec<Quote> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();
        quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quotes)
    }

    async fn next_sequence(&self, user_id: &str, year: i32) -> RepositoryResult<u64> {
        let mut counters = self.counters.lock().unwrap();
        let seq = counters.entry((user_id.to_string(), year)).or_default();
        *seq += 1;
        Ok(*seq)
    }

    async fn list_by_statuses(&self, statuses: &[QuoteStatus]) -> RepositoryResult<Vec<Quote>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|q| statuses.contains(&q.status))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryFinancialConfigRepository {
    pub items: Mutex<Vec<FinancialConfig>>,
}

#[async_trait]
impl FinancialConfigRepository for InMemoryFinancialConfigRepository {
    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Option<FinancialConfig>> {
        Ok(self.items.lock().unwrap().iter().find(|c| c.quote_id == quote_id).cloned())
    }

    async fn upsert(&self, config: FinancialConfig) -> RepositoryResult<FinancialConfig> {
        let mut items = self.items.lock().unwrap();
        let mut config = config;
        if let Some(existing) = items.iter_mut().find(|c| c.quote_id == config.quote_id) {
            config.id = existing.id;
            config.created_at = existing.created_at;
            *existing = config.clone();
        } else {
            config.id = Some(ObjectId::new());
            items.push(config.clone());
        }
        Ok(config)
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()> {
        self.items.lock().unwrap().retain(|c| c.quote_id != quote_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryQuoteFileRepository {
    pub items: Mutex<Vec<QuoteFile>>,
}

#[async_trait]
impl QuoteFileRepository for InMemoryQuoteFileRepository {
    async fn create(&self, file: QuoteFile) -> RepositoryResult<QuoteFile> {
        let mut file = file;
        file.id = Some(ObjectId::new());
        self.items.lock().unwrap().push(file.clone());
        Ok(file)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteFile> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Quote file not found"))
    }

    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteFile>> {
        Ok(self.items.lock().unwrap().iter().filter(|f| f.quote_id == quote_id).cloned().collect())
    }

    async fn delete_by_id(&self, id: ObjectId) -> RepositoryResult<()> {
        self.items.lock().unwrap().retain(|f| f.id != Some(id));
        Ok(())
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<u64> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|f| f.quote_id != quote_id);
        Ok((before - items.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemorySignatureRepository {
    pub items: Mutex<Vec<QuoteSignature>>,
}

#[async_trait]
impl QuoteSignatureRepository for InMemorySignatureRepository {
    async fn upsert(&self, signature: QuoteSignature) -> RepositoryResult<(QuoteSignature, Option<QuoteSignature>)> {
        let mut items = self.items.lock().unwrap();
        let mut signature = signature;
        let previous = items
            .iter()
            .position(|s| s.quote_id == signature.quote_id && s.signer_kind == signature.signer_kind)
            .map(|i| items.remove(i));
        signature.id = previous.as_ref().and_then(|p| p.id).or_else(|| Some(ObjectId::new()));
        items.push(signature.clone());
        Ok((signature, previous))
    }

    async fn find_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteSignature>> {
        Ok(self.items.lock().unwrap().iter().filter(|s| s.quote_id == quote_id).cloned().collect())
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteSignature>> {
        let mut items = self.items.lock().unwrap();
        let (removed, kept): (Vec<_>, Vec<_>) = items.drain(..).partition(|s| s.quote_id == quote_id);
        *items = kept;
        Ok(removed)
    }
}

#[derive(Default)]
pub struct InMemoryEventRepository {
    pub items: Mutex<Vec<QuoteEvent>>,
}

impl InMemoryEventRepository {
    pub fn count(&self, quote_id: ObjectId, event_type: QuoteEventType) -> usize {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.quote_id == quote_id && e.event_type == event_type)
            .count()
    }
}

#[async_trait]
impl QuoteEventRepository for InMemoryEventRepository {
    async fn create(&self, event: QuoteEvent) -> RepositoryResult<QuoteEvent> {
        let mut event = event;
        event.id = Some(ObjectId::new());
        self.items.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn exists(&self, quote_id: ObjectId, event_type: QuoteEventType) -> RepositoryResult<bool> {
        Ok(self.count(quote_id, event_type) > 0)
    }

    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteEvent>> {
        Ok(self.items.lock().unwrap().iter().filter(|e| e.quote_id == quote_id).cloned().collect())
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()> {
        self.items.lock().unwrap().retain(|e| e.quote_id != quote_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryShareRepository {
    pub items: Mutex<Vec<QuoteShare>>,
}

#[async_trait]
impl QuoteShareRepository for InMemoryShareRepository {
    async fn create(&self, share: QuoteShare) -> RepositoryResult<QuoteShare> {
        let mut share = share;
        share.id = Some(ObjectId::new());
        self.items.lock().unwrap().push(share.clone());
        Ok(share)
    }

    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<QuoteShare>> {
        Ok(self.items.lock().unwrap().iter().find(|s| s.token == token).cloned())
    }

    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteShare>> {
        Ok(self.items.lock().unwrap().iter().filter(|s| s.quote_id == quote_id).cloned().collect())
    }

    async fn revoke(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut items = self.items.lock().unwrap();
        let share = items
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("Share not found"))?;
        share.revoked = true;
        Ok(())
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()> {
        self.items.lock().unwrap().retain(|s| s.quote_id != quote_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAccessLogRepository {
    pub items: Mutex<Vec<QuoteAccessLog>>,
}

#[async_trait]
impl AccessLogRepository for InMemoryAccessLogRepository {
    async fn create(&self, log: QuoteAccessLog) -> RepositoryResult<QuoteAccessLog> {
        let mut log = log;
        log.id = Some(ObjectId::new());
        self.items.lock().unwrap().push(log.clone());
        Ok(log)
    }

    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteAccessLog>> {
        Ok(self.items.lock().unwrap().iter().filter(|l| l.quote_id == quote_id).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryFollowUpRepository {
    pub items: Mutex<Vec<FollowUp>>,
}

impl InMemoryFollowUpRepository {
    pub fn of_quote(&self, quote_id: ObjectId) -> Vec<FollowUp> {
        self.items.lock().unwrap().iter().filter(|f| f.quote_id == quote_id).cloned().collect()
    }
}

#[async_trait]
impl FollowUpRepository for InMemoryFollowUpRepository {
    async fn create(&self, follow_up: FollowUp) -> RepositoryResult<FollowUp> {
        let mut follow_up = follow_up;
        follow_up.id = Some(ObjectId::new());
        self.items.lock().unwrap().push(follow_up.clone());
        Ok(follow_up)
    }

    async fn update(&self, follow_up: &FollowUp) -> RepositoryResult<()> {
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|f| f.id == follow_up.id)
            .ok_or_else(|| RepositoryError::not_found("Follow-up not found"))?;
        *slot = follow_up.clone();
        Ok(())
    }

    async fn list_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<Vec<FollowUp>> {
        Ok(self.of_quote(quote_id))
    }

    async fn list_active(&self) -> RepositoryResult<Vec<FollowUp>> {
        Ok(self.items.lock().unwrap().iter().filter(|f| f.status.is_active()).cloned().collect())
    }

    async fn delete_stopped_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<u64> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|f| !(f.quote_id == quote_id && f.status == FollowUpStatus::Stopped));
        Ok((before - items.len()) as u64)
    }

    async fn delete_by_quote_id(&self, quote_id: ObjectId) -> RepositoryResult<()> {
        self.items.lock().unwrap().retain(|f| f.quote_id != quote_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCompanyRepository {
    pub items: Mutex<Vec<CompanyProfile>>,
}

#[async_trait]
impl CompanyProfileRepository for InMemoryCompanyRepository {
    async fn find_by_user(&self, user_id: &str) -> RepositoryResult<Option<CompanyProfile>> {
        Ok(self.items.lock().unwrap().iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn upsert(&self, profile: CompanyProfile) -> RepositoryResult<CompanyProfile> {
        let mut items = self.items.lock().unwrap();
        let mut profile = profile;
        if profile.id.is_none() {
            profile.id = Some(ObjectId::new());
        }
        items.retain(|p| p.user_id != profile.user_id);
        items.push(profile.clone());
        Ok(profile)
    }
}

#[derive(Default)]
pub struct InMemoryClientRepository {
    pub items: Mutex<Vec<Client>>,
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn create(&self, client: Client) -> RepositoryResult<Client> {
        let mut client = client;
        client.id = Some(ObjectId::new());
        self.items.lock().unwrap().push(client.clone());
        Ok(client)
    }

    async fn get_for_user(&self, id: ObjectId, user_id: &str) -> RepositoryResult<Client> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == Some(id) && c.user_id == user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Client not found for ID: {}", id)))
    }

    async fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Client>> {
        let mut clients: Vec<Client> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        clients.sort_by_key(|c| c.name.to_lowercase());
        Ok(clients)
    }

    async fn update(&self, client: &Client) -> RepositoryResult<()> {
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|c| c.id == client.id)
            .ok_or_else(|| RepositoryError::not_found("Client not found"))?;
        *slot = client.clone();
        Ok(())
    }

    async fn delete(&self, id: ObjectId, user_id: &str) -> RepositoryResult<()> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|c| !(c.id == Some(id) && c.user_id == user_id));
        if items.len() == before {
            return Err(RepositoryError::not_found(format!("Client not found for ID: {}", id)));
        }
        Ok(())
    }
}

// --- Redis, MinIO and SMTP stand-ins ---

#[derive(Default)]
pub struct InMemoryDraftRepository {
    pub items: Mutex<HashMap<(String, String), QuoteDraft>>,
}

#[async_trait]
impl DraftRepository for InMemoryDraftRepository {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<QuoteDraft>, RedisError> {
        Ok(self.items.lock().unwrap().get(&(user_id.to_string(), key.to_string())).cloned())
    }

    async fn set(&self, user_id: &str, draft: &QuoteDraft) -> Result<(), RedisError> {
        self.items
            .lock()
            .unwrap()
            .insert((user_id.to_string(), draft.key.clone()), draft.clone());
        Ok(())
    }

    async fn clear(&self, user_id: &str, key: &str) -> Result<bool, RedisError> {
        Ok(self.items.lock().unwrap().remove(&(user_id.to_string(), key.to_string())).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryStorage {
    pub objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn contains(&self, bucket: &str, object_name: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), object_name.to_string()))
    }

    pub fn count_in(&self, bucket: &str) -> usize {
        self.objects.lock().unwrap().keys().filter(|(b, _)| b == bucket).count()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn put_object(
        &self,
        bucket: &str,
        object_name: &str,
        data: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), MinioError> {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), object_name.to_string()), data);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, object_name: &str) -> Result<Bytes, MinioError> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), object_name.to_string()))
            .map(|data| Bytes::from(data.clone()))
            .ok_or_else(|| MinioError::ObjectNotFound(object_name.to_string()))
    }

    async fn remove_object(&self, bucket: &str, object_name: &str) -> Result<(), MinioError> {
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), object_name.to_string()));
        Ok(())
    }

    fn download_link(&self, bucket: &str, object_name: &str) -> String {
        format!("http://storage.test/{}/{}", bucket, object_name)
    }
}

#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: AtomicBool,
}

impl RecordingEmailSender {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// (recipient, subject) of every delivered email
    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| (m.to.clone(), m.subject.clone()))
            .collect()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::SmtpError("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

// --- Wiring ---

pub struct TestContext {
    pub quotes: Arc<InMemoryQuoteRepository>,
    pub financial_configs: Arc<InMemoryFinancialConfigRepository>,
    pub files: Arc<InMemoryQuoteFileRepository>,
    pub signatures: Arc<InMemorySignatureRepository>,
    pub events: Arc<InMemoryEventRepository>,
    pub shares: Arc<InMemoryShareRepository>,
    pub access_logs: Arc<InMemoryAccessLogRepository>,
    pub follow_ups: Arc<InMemoryFollowUpRepository>,
    pub companies: Arc<InMemoryCompanyRepository>,
    pub clients: Arc<InMemoryClientRepository>,
    pub drafts: Arc<InMemoryDraftRepository>,
    pub storage: Arc<InMemoryStorage>,
    pub emails: Arc<RecordingEmailSender>,
    pub jwt: Arc<JwtTokenUtilsImpl>,
    pub settings: ServiceSettings,
    pub services: AppServices,
}

pub fn test_settings() -> ServiceSettings {
    ServiceSettings {
        share: ShareConfig::from_test_env(),
        follow_up: FollowUpConfig::default(),
        draft: DraftConfig::from_test_env(),
        ..ServiceSettings::default()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: ServiceSettings) -> Self {
        let quotes = Arc::new(InMemoryQuoteRepository::default());
        let financial_configs = Arc::new(InMemoryFinancialConfigRepository::default());
        let files = Arc::new(InMemoryQuoteFileRepository::default());
        let signatures = Arc::new(InMemorySignatureRepository::default());
        let events = Arc::new(InMemoryEventRepository::default());
        let shares = Arc::new(InMemoryShareRepository::default());
        let access_logs = Arc::new(InMemoryAccessLogRepository::default());
        let follow_ups = Arc::new(InMemoryFollowUpRepository::default());
        let companies = Arc::new(InMemoryCompanyRepository::default());
        let clients = Arc::new(InMemoryClientRepository::default());
        let drafts = Arc::new(InMemoryDraftRepository::default());
        let storage = Arc::new(InMemoryStorage::default());
        let emails = Arc::new(RecordingEmailSender::default());

        let repos = Repositories {
            quotes: quotes.clone(),
            financial_configs: financial_configs.clone(),
            files: files.clone(),
            signatures: signatures.clone(),
            events: events.clone(),
            shares: shares.clone(),
            access_logs: access_logs.clone(),
            follow_ups: follow_ups.clone(),
            companies: companies.clone(),
            clients: clients.clone(),
        };
        let services = AppServices::new(repos, storage.clone(), emails.clone(), drafts.clone(), &settings);

        TestContext {
            quotes,
            financial_configs,
            files,
            signatures,
            events,
            shares,
            access_logs,
            follow_ups,
            companies,
            clients,
            drafts,
            storage,
            emails,
            jwt: Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default())),
            settings,
            services,
        }
    }

    pub fn router(&self) -> Router {
        let auth_state = Arc::new(AuthState::new(self.jwt.clone()));
        create_router(&self.services, auth_state, self.settings.quote.max_upload_bytes)
    }

    pub fn bearer(&self, user_id: &str) -> String {
        format!("Bearer {}", self.jwt.generate_access_token(user_id, None).unwrap())
    }

    pub async fn seed_company(&self, user_id: &str) -> CompanyProfile {
        let now = Utc::now();
        self.companies
            .upsert(CompanyProfile {
                id: None,
                user_id: user_id.to_string(),
                company_name: "Atelier Dupont".to_string(),
                legal_id: None,
                vat_number: Some("BE0123456789".to_string()),
                address: Some("1 rue des Artisans".to_string()),
                postal_code: None,
                city: None,
                country: None,
                email: "atelier@example.com".to_string(),
                phone: None,
                website: None,
                logo_path: None,
                signature_path: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    pub async fn seed_client(&self, user_id: &str, email: Option<&str>) -> Client {
        let now = Utc::now();
        self.clients
            .create(Client {
                id: None,
                user_id: user_id.to_string(),
                name: "Marie Martin".to_string(),
                email: email.map(|e| e.to_string()),
                phone: None,
                address: None,
                company_name: None,
                notes: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    pub fn quote(&self, id: ObjectId) -> Quote {
        self.quotes.all().into_iter().find(|q| q.id == Some(id)).unwrap()
    }

    pub fn share_of(&self, quote_id: ObjectId, view_only: bool) -> QuoteShare {
        self.shares
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.quote_id == quote_id && s.view_only == view_only)
            .cloned()
            .unwrap()
    }
}
