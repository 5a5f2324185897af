use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Datelike, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use strum::IntoEnumIterator;
use tracing::{error, info, instrument, warn};

use crate::config::{MinioConfig, QuoteConfig};
use crate::dto::quote_dto::{
    BulkAction, BulkActionRequest, BulkActionResponse, BulkItemResult, CreateQuoteRequest, File,
    FinancialConfigResponse, QuoteDetailResponse, QuoteFileResponse, QuoteFilter, QuoteListQuery,
    QuoteListResponse, QuoteStats, SendQuoteRequest, SignatureResponse, UpdateQuoteRequest,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::model::financial_config::{FinancialConfig, FinancialSettings};
use crate::model::follow_up::select_display_follow_up;
use crate::model::quote::Quote;
use crate::model::quote_event::{QuoteEvent, QuoteEventType};
use crate::model::quote_file::QuoteFile;
use crate::model::quote_signature::{QuoteSignature, SignerKind};
use crate::model::quote_status::QuoteStatus;
use crate::repository::Repositories;
use crate::service::follow_up_service::FollowUpCoordinator;
use crate::service::notification_service::QuoteNotifier;
use crate::service::quote_calculator::{calculate_quote_totals, validate_settings};
use crate::service::share_service::ShareService;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::minio::{guess_content_type, object_key, ObjectStorage};
use crate::util::outcome::{ServiceOutcome, SideEffect};

#[async_trait]
pub trait QuoteService: Send + Sync {
    // Quote CRUD
    async fn create_quote(&self, user_id: &str, req: CreateQuoteRequest) -> ServiceResult<ServiceOutcome<Quote>>;
    async fn get_quote(&self, user_id: &str, id: ObjectId) -> ServiceResult<QuoteDetailResponse>;
    async fn update_quote(&self, user_id: &str, id: ObjectId, req: UpdateQuoteRequest) -> ServiceResult<ServiceOutcome<Quote>>;
    async fn delete_quote(&self, user_id: &str, id: ObjectId) -> ServiceResult<ServiceOutcome<()>>;
    async fn duplicate_quote(&self, user_id: &str, id: ObjectId) -> ServiceResult<ServiceOutcome<Quote>>;

    // Dashboard
    async fn list_quotes(&self, user_id: &str, query: QuoteListQuery) -> ServiceResult<QuoteListResponse>;
    async fn quote_stats(&self, user_id: &str) -> ServiceResult<QuoteStats>;
    async fn bulk_action(&self, user_id: &str, req: BulkActionRequest) -> ServiceResult<BulkActionResponse>;

    // Status
    async fn send_quote(&self, user_id: &str, id: ObjectId, req: SendQuoteRequest) -> ServiceResult<ServiceOutcome<Quote>>;
    async fn mark_as_sent(&self, user_id: &str, id: ObjectId) -> ServiceResult<ServiceOutcome<Quote>>;
    async fn change_status(&self, user_id: &str, id: ObjectId, status: QuoteStatus) -> ServiceResult<ServiceOutcome<Quote>>;
    async fn list_events(&self, user_id: &str, id: ObjectId) -> ServiceResult<Vec<QuoteEvent>>;

    // Financial configuration
    async fn get_financial_config(&self, user_id: &str, id: ObjectId) -> ServiceResult<FinancialConfigResponse>;
    async fn update_financial_config(
        &self,
        user_id: &str,
        id: ObjectId,
        settings: FinancialSettings,
    ) -> ServiceResult<ServiceOutcome<FinancialConfigResponse>>;

    // Files and signatures
    async fn upload_file(&self, user_id: &str, id: ObjectId, file: File) -> ServiceResult<QuoteFileResponse>;
    async fn list_files(&self, user_id: &str, id: ObjectId) -> ServiceResult<Vec<QuoteFileResponse>>;
    async fn delete_file(&self, user_id: &str, id: ObjectId, file_id: ObjectId) -> ServiceResult<ServiceOutcome<()>>;
    /// Copies the company profile signature onto the quote
    async fn sign_as_company(&self, user_id: &str, id: ObjectId) -> ServiceResult<ServiceOutcome<SignatureResponse>>;
}

pub struct QuoteServiceImpl {
    pub repos: Repositories,
    pub storage: Arc<dyn ObjectStorage>,
    pub coordinator: Arc<dyn FollowUpCoordinator>,
    pub notifier: Arc<dyn QuoteNotifier>,
    pub shares: Arc<dyn ShareService>,
    pub quote_config: QuoteConfig,
    pub minio_config: MinioConfig,
}

impl QuoteServiceImpl {
    pub fn new(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        coordinator: Arc<dyn FollowUpCoordinator>,
        notifier: Arc<dyn QuoteNotifier>,
        shares: Arc<dyn ShareService>,
        quote_config: QuoteConfig,
        minio_config: MinioConfig,
    ) -> Self {
        QuoteServiceImpl {
            repos,
            storage,
            coordinator,
            notifier,
            shares,
            quote_config,
            minio_config,
        }
    }

    async fn owned_quote(&self, user_id: &str, id: ObjectId) -> ServiceResult<Quote> {
        Ok(self.repos.quotes.get_for_user(id, user_id).await?)
    }

    async fn settings_of(&self, quote_id: ObjectId) -> ServiceResult<Option<FinancialSettings>> {
        Ok(self
            .repos
            .financial_configs
            .find_by_quote_id(quote_id)
            .await?
            .map(|c| c.settings))
    }

    async fn resolve_client(&self, user_id: &str, client_id: Option<&str>) -> ServiceResult<Option<ObjectId>> {
        let Some(raw) = client_id else {
            return Ok(None);
        };
        let id = ObjectId::parse_str(raw)
            .map_err(|_| ServiceError::InvalidInput("Invalid client id".to_string()))?;
        self.repos.clients.get_for_user(id, user_id).await?;
        Ok(Some(id))
    }

    async fn next_number(&self, user_id: &str) -> ServiceResult<String> {
        let year = Utc::now().year();
        let seq = self.repos.quotes.next_sequence(user_id, year).await?;
        Ok(self.quote_config.format_number(year, seq))
    }

    async fn log_event(&self, quote_id: ObjectId, event_type: QuoteEventType, metadata: serde_json::Value) -> ServiceResult<()> {
        self.repos
            .events
            .create(QuoteEvent::new(quote_id, event_type, metadata))
            .await?;
        Ok(())
    }

    fn file_response(&self, file: QuoteFile) -> QuoteFileResponse {
        let download_url = self.storage.download_link(&file.bucket, &file.file_path);
        QuoteFileResponse { file, download_url }
    }

    /// Drops the files and signatures of a deleted quote, records first
    async fn remove_objects(&self, quote_id: ObjectId) -> ServiceResult<()> {
        let files = self.repos.files.find_by_quote_id(quote_id).await?;
        let signatures = self.repos.signatures.delete_by_quote_id(quote_id).await?;
        self.repos.files.delete_by_quote_id(quote_id).await?;

        let mut first_error: Option<ServiceError> = None;
        let paths = files
            .iter()
            .map(|f| (f.bucket.as_str(), f.file_path.as_str()))
            .chain(signatures.iter().map(|s| (s.bucket.as_str(), s.file_path.as_str())));
        for (bucket, path) in paths {
            if let Err(e) = self.storage.remove_object(bucket, path).await {
                warn!(%bucket, %path, error = %e, "Failed to remove object");
                first_error.get_or_insert(e.into());
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn remove_records(&self, quote_id: ObjectId) -> ServiceResult<()> {
        self.repos.shares.delete_by_quote_id(quote_id).await?;
        self.repos.financial_configs.delete_by_quote_id(quote_id).await?;
        self.repos.events.delete_by_quote_id(quote_id).await?;
        Ok(())
    }

    async fn purge_dependents(&self, quote_id: ObjectId, outcome: &mut ServiceOutcome<()>) {
        let objects = self.remove_objects(quote_id).await;
        outcome.record(SideEffect::ObjectCleanup, objects);

        let follow_ups = self.repos.follow_ups.delete_by_quote_id(quote_id).await;
        outcome.record(SideEffect::FollowUps, follow_ups);

        let records = self.remove_records(quote_id).await;
        outcome.record(SideEffect::EventLog, records);
    }

    async fn apply_bulk(&self, user_id: &str, action: BulkAction, raw_id: &str) -> ServiceResult<()> {
        let id = ObjectId::parse_str(raw_id)
            .map_err(|_| ServiceError::InvalidInput("Invalid quote id".to_string()))?;
        match action {
            BulkAction::Delete => self.delete_quote(user_id, id).await.map(|_| ()),
            BulkAction::MarkAsSent => self.mark_as_sent(user_id, id).await.map(|_| ()),
            BulkAction::ConvertToInvoice => self
                .change_status(user_id, id, QuoteStatus::ConvertedToInvoice)
                .await
                .map(|_| ()),
        }
    }
}

pub fn signature_response(storage: &dyn ObjectStorage, signature: QuoteSignature) -> SignatureResponse {
    let download_url = storage.download_link(&signature.bucket, &signature.file_path);
    SignatureResponse { signature, download_url }
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self, req), fields(user_id = %user_id, title = %req.title))]
    async fn create_quote(&self, user_id: &str, req: CreateQuoteRequest) -> ServiceResult<ServiceOutcome<Quote>> {
        info!("Creating quote");
        let client_id = self.resolve_client(user_id, req.client_id.as_deref()).await?;
        let tasks: Vec<_> = req.tasks.into_iter().map(Into::into).collect();
        let totals = calculate_quote_totals(&tasks, None)?;
        let now = Utc::now();
        let valid_until = req
            .valid_until
            .unwrap_or_else(|| now.date_naive() + Duration::days(self.quote_config.default_validity_days));

        let quote = Quote {
            id: None,
            user_id: user_id.to_string(),
            number: self.next_number(user_id).await?,
            title: req.title,
            status: QuoteStatus::Draft,
            client_id,
            totals,
            tasks,
            valid_until: Some(valid_until),
            conditions: req.conditions,
            created_at: now,
            updated_at: now,
            sent_at: None,
            viewed_at: None,
            accepted_at: None,
            rejected_at: None,
            expired_at: None,
            converted_at: None,
        };

        let created = self.repos.quotes.create(quote).await.map_err(|e| {
            error!("Failed to create quote: {e}");
            ServiceError::from(e)
        })?;
        info!(number = %created.number, "Quote created");

        let mut outcome = ServiceOutcome::new(created);
        if let Some(quote_id) = outcome.data.id {
            let logged = self.log_event(quote_id, QuoteEventType::Created, json!({})).await;
            outcome.record(SideEffect::EventLog, logged);
        }
        Ok(outcome)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_quote(&self, user_id: &str, id: ObjectId) -> ServiceResult<QuoteDetailResponse> {
        let quote = self.owned_quote(user_id, id).await?;

        let client = match quote.client_id {
            Some(client_id) => match self.repos.clients.get_for_user(client_id, user_id).await {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("Client of quote unavailable: {e}");
                    None
                }
            },
            None => None,
        };
        let financial_settings = self.settings_of(id).await?;
        let files = self
            .repos
            .files
            .find_by_quote_id(id)
            .await?
            .into_iter()
            .map(|f| self.file_response(f))
            .collect();
        let signatures = self
            .repos
            .signatures
            .find_by_quote_id(id)
            .await?
            .into_iter()
            .map(|s| signature_response(self.storage.as_ref(), s))
            .collect();
        let follow_ups = self.repos.follow_ups.list_by_quote_id(id).await?;
        let follow_up = select_display_follow_up(&follow_ups).cloned();
        let events = self.repos.events.list_by_quote_id(id).await?;

        Ok(QuoteDetailResponse {
            quote,
            client,
            financial_settings,
            files,
            signatures,
            follow_up,
            events,
        })
    }

    #[instrument(skip(self, req), fields(id = %id))]
    async fn update_quote(&self, user_id: &str, id: ObjectId, req: UpdateQuoteRequest) -> ServiceResult<ServiceOutcome<Quote>> {
        let mut quote = self.owned_quote(user_id, id).await?;
        if !quote.status.is_editable() {
            return Err(ServiceError::Conflict(format!(
                "Quote {} is {} and can no longer be edited",
                quote.number, quote.status
            )));
        }

        if let Some(title) = req.title {
            quote.title = title;
        }
        if req.client_id.is_some() {
            quote.client_id = self.resolve_client(user_id, req.client_id.as_deref()).await?;
        }
        if let Some(tasks) = req.tasks {
            quote.tasks = tasks.into_iter().map(Into::into).collect();
        }
        if req.valid_until.is_some() {
            quote.valid_until = req.valid_until;
        }
        if req.conditions.is_some() {
            quote.conditions = req.conditions;
        }
        let settings = self.settings_of(id).await?;
        quote.totals = calculate_quote_totals(&quote.tasks, settings.as_ref())?;
        quote.updated_at = Utc::now();

        self.repos.quotes.update(&quote).await?;
        info!("Quote updated");

        let mut outcome = ServiceOutcome::new(quote);
        let logged = self.log_event(id, QuoteEventType::Updated, json!({})).await;
        outcome.record(SideEffect::EventLog, logged);
        Ok(outcome)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_quote(&self, user_id: &str, id: ObjectId) -> ServiceResult<ServiceOutcome<()>> {
        self.owned_quote(user_id, id).await?;
        self.repos.quotes.delete(id).await?;
        info!("Quote deleted");

        let mut outcome = ServiceOutcome::new(());
        self.purge_dependents(id, &mut outcome).await;
        Ok(outcome)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn duplicate_quote(&self, user_id: &str, id: ObjectId) -> ServiceResult<ServiceOutcome<Quote>> {
        let source = self.owned_quote(user_id, id).await?;
        let settings = self.settings_of(id).await?;
        let totals = calculate_quote_totals(&source.tasks, settings.as_ref())?;
        let now = Utc::now();

        let copy = Quote {
            id: None,
            number: self.next_number(user_id).await?,
            title: format!("{} (copy)", source.title),
            status: QuoteStatus::Draft,
            totals,
            valid_until: Some(now.date_naive() + Duration::days(self.quote_config.default_validity_days)),
            created_at: now,
            updated_at: now,
            sent_at: None,
            viewed_at: None,
            accepted_at: None,
            rejected_at: None,
            expired_at: None,
            converted_at: None,
            ..source
        };
        let created = self.repos.quotes.create(copy).await?;
        info!(number = %created.number, "Quote duplicated");

        let mut outcome = ServiceOutcome::new(created);
        let Some(copy_id) = outcome.data.id else {
            return Ok(outcome);
        };
        if let Some(settings) = settings {
            let config = FinancialConfig {
                id: None,
                quote_id: copy_id,
                settings,
                created_at: now,
                updated_at: now,
            };
            let copied = self.repos.financial_configs.upsert(config).await.map(|_| ());
            outcome.record(SideEffect::Totals, copied);
        }
        let logged = self
            .log_event(copy_id, QuoteEventType::Created, json!({ "duplicated_from": id.to_hex() }))
            .await;
        outcome.record(SideEffect::EventLog, logged);
        Ok(outcome)
    }

    #[instrument(skip(self, query))]
    async fn list_quotes(&self, user_id: &str, query: QuoteListQuery) -> ServiceResult<QuoteListResponse> {
        let status = query
            .status
            .as_deref()
            .map(QuoteStatus::from_str)
            .transpose()
            .map_err(|_| ServiceError::InvalidInput("Unknown quote status".to_string()))?;
        let client_id = query
            .client_id
            .as_deref()
            .map(ObjectId::parse_str)
            .transpose()
            .map_err(|_| ServiceError::InvalidInput("Invalid client id".to_string()))?;
        let filter = QuoteFilter {
            status,
            client_id,
            search: query.search,
            created_from: query.created_from,
            created_to: query.created_to,
        };

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let matching: Vec<Quote> = self
            .repos
            .quotes
            .list_by_user(user_id)
            .await?
            .into_iter()
            .filter(|q| filter.matches(q))
            .collect();
        let total = matching.len() as u64;
        let offset = (page as usize - 1).saturating_mul(limit as usize);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect::<Vec<_>>();
        info!("Fetched {} of {} quotes", items.len(), total);

        Ok(QuoteListResponse { items, total, page, limit })
    }

    #[instrument(skip(self))]
    async fn quote_stats(&self, user_id: &str) -> ServiceResult<QuoteStats> {
        let quotes = self.repos.quotes.list_by_user(user_id).await?;
        let mut by_status: BTreeMap<String, u64> =
            QuoteStatus::iter().map(|s| (s.to_string(), 0)).collect();
        let mut accepted_amount = Decimal::ZERO;
        let mut pending_amount = Decimal::ZERO;

        for quote in &quotes {
            *by_status.entry(quote.status.to_string()).or_default() += 1;
            match quote.status {
                QuoteStatus::Accepted | QuoteStatus::ConvertedToInvoice => {
                    accepted_amount += quote.totals.total_with_vat
                }
                QuoteStatus::Sent | QuoteStatus::Viewed => pending_amount += quote.totals.total_with_vat,
                _ => {}
            }
        }

        Ok(QuoteStats {
            total: quotes.len() as u64,
            by_status,
            accepted_amount,
            pending_amount,
        })
    }

    #[instrument(skip(self, req), fields(action = %req.action, count = req.ids.len()))]
    async fn bulk_action(&self, user_id: &str, req: BulkActionRequest) -> ServiceResult<BulkActionResponse> {
        let mut results = Vec::with_capacity(req.ids.len());
        for raw_id in &req.ids {
            let result = self.apply_bulk(user_id, req.action, raw_id).await;
            results.push(BulkItemResult {
                id: raw_id.clone(),
                success: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            });
        }
        let succeeded = results.iter().filter(|r| r.success).count();
        info!(succeeded, "Bulk action applied");
        Ok(BulkActionResponse {
            action: req.action,
            succeeded,
            failed: results.len() - succeeded,
            results,
        })
    }

    #[instrument(skip(self, req), fields(id = %id))]
    async fn send_quote(&self, user_id: &str, id: ObjectId, req: SendQuoteRequest) -> ServiceResult<ServiceOutcome<Quote>> {
        let quote = self.owned_quote(user_id, id).await?;
        if quote.status.is_final() {
            return Err(ServiceError::Conflict(format!(
                "Quote {} is {} and cannot be sent",
                quote.number, quote.status
            )));
        }

        let recipient = match req.recipient_email {
            Some(email) => email,
            None => {
                let client_id = quote
                    .client_id
                    .ok_or_else(|| ServiceError::InvalidInput("Quote has no client to send to".to_string()))?;
                self.repos
                    .clients
                    .get_for_user(client_id, user_id)
                    .await?
                    .email
                    .ok_or_else(|| ServiceError::InvalidInput("Client has no email address".to_string()))?
            }
        };

        let share = self.shares.ensure_client_share(&quote).await?;
        let mut outcome = ServiceOutcome::new(());
        let emailed = self.notifier.send_quote(&quote, &recipient, &share.url).await;
        outcome.record(SideEffect::Email, emailed);

        let sent = self.coordinator.mark_as_sent(quote).await?;
        let quote = outcome.absorb(sent);
        Ok(outcome.map(|_| quote))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn mark_as_sent(&self, user_id: &str, id: ObjectId) -> ServiceResult<ServiceOutcome<Quote>> {
        let quote = self.owned_quote(user_id, id).await?;
        self.coordinator.mark_as_sent(quote).await
    }

    #[instrument(skip(self), fields(id = %id, status = %status))]
    async fn change_status(&self, user_id: &str, id: ObjectId, status: QuoteStatus) -> ServiceResult<ServiceOutcome<Quote>> {
        let quote = self.owned_quote(user_id, id).await?;
        match status {
            QuoteStatus::Sent => self.coordinator.mark_as_sent(quote).await,
            status if status.settable_by_issuer() => {
                self.coordinator
                    .transition(quote, status, json!({ "source": "issuer" }))
                    .await
            }
            QuoteStatus::Accepted | QuoteStatus::Rejected => Err(ServiceError::Forbidden(format!(
                "Only the client can set quote {} to {}",
                quote.number, status
            ))),
            QuoteStatus::Expired => Err(ServiceError::Forbidden(format!(
                "Quote {} expires on its validity date",
                quote.number
            ))),
            status => Err(ServiceError::Conflict(format!(
                "Quote {} cannot be set to {} by hand",
                quote.number, status
            ))),
        }
    }

    async fn list_events(&self, user_id: &str, id: ObjectId) -> ServiceResult<Vec<QuoteEvent>> {
        self.owned_quote(user_id, id).await?;
        Ok(self.repos.events.list_by_quote_id(id).await?)
    }

    async fn get_financial_config(&self, user_id: &str, id: ObjectId) -> ServiceResult<FinancialConfigResponse> {
        let quote = self.owned_quote(user_id, id).await?;
        let settings = self.settings_of(id).await?.unwrap_or_default();
        Ok(FinancialConfigResponse {
            quote_id: id,
            settings,
            totals: quote.totals,
        })
    }

    #[instrument(skip(self, settings), fields(id = %id))]
    async fn update_financial_config(
        &self,
        user_id: &str,
        id: ObjectId,
        settings: FinancialSettings,
    ) -> ServiceResult<ServiceOutcome<FinancialConfigResponse>> {
        let mut quote = self.owned_quote(user_id, id).await?;
        if !quote.status.is_editable() {
            return Err(ServiceError::Conflict(format!(
                "Quote {} is {} and can no longer be edited",
                quote.number, quote.status
            )));
        }
        validate_settings(&settings).map_err(ServiceError::InvalidInput)?;
        let totals = calculate_quote_totals(&quote.tasks, Some(&settings))?;

        let now = Utc::now();
        let saved = self
            .repos
            .financial_configs
            .upsert(FinancialConfig {
                id: None,
                quote_id: id,
                settings,
                created_at: now,
                updated_at: now,
            })
            .await?;

        // Stored totals must follow the config, so this write is not best effort.
        quote.totals = totals;
        if quote.conditions.is_none() {
            quote.conditions = saved.settings.default_conditions.clone();
        }
        quote.updated_at = now;
        self.repos.quotes.update(&quote).await?;
        info!(total = %quote.totals.total_with_vat, "Financial config saved, totals recomputed");

        let mut outcome = ServiceOutcome::new(FinancialConfigResponse {
            quote_id: id,
            settings: saved.settings,
            totals: quote.totals,
        });
        outcome.done(SideEffect::Totals);
        let logged = self
            .log_event(id, QuoteEventType::Updated, json!({ "financial_config": true }))
            .await;
        outcome.record(SideEffect::EventLog, logged);
        Ok(outcome)
    }

    #[instrument(skip(self, file), fields(id = %id, filename = %file.filename, size = file.size))]
    async fn upload_file(&self, user_id: &str, id: ObjectId, file: File) -> ServiceResult<QuoteFileResponse> {
        self.owned_quote(user_id, id).await?;
        if file.size == 0 {
            return Err(ServiceError::InvalidInput(format!("File {} is empty", file.filename)));
        }
        if file.size > self.quote_config.max_upload_bytes {
            return Err(ServiceError::InvalidInput(format!(
                "File {} exceeds the {} bytes limit",
                file.filename, self.quote_config.max_upload_bytes
            )));
        }

        let bucket = self.minio_config.quote_files_bucket.clone();
        let object_name = object_key(&format!("quotes/{}", id.to_hex()), &file.filename);
        self.storage
            .put_object(&bucket, &object_name, file.content, Some(file.content_type.as_str()))
            .await
            .map_err(|e| {
                error!("Upload of {} failed: {e}", file.filename);
                ServiceError::InternalError(format!("Upload of {} failed: {}", file.filename, e))
            })?;

        let record = QuoteFile {
            id: None,
            quote_id: id,
            bucket: bucket.clone(),
            file_path: object_name.clone(),
            original_filename: file.filename,
            content_type: file.content_type,
            size: file.size as u64,
            created_at: Utc::now(),
        };
        match self.repos.files.create(record).await {
            Ok(saved) => {
                info!("Quote file stored");
                Ok(self.file_response(saved))
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.remove_object(&bucket, &object_name).await {
                    warn!("Orphan object {} left behind: {}", object_name, cleanup);
                }
                Err(e.into())
            }
        }
    }

    async fn list_files(&self, user_id: &str, id: ObjectId) -> ServiceResult<Vec<QuoteFileResponse>> {
        self.owned_quote(user_id, id).await?;
        let files = self.repos.files.find_by_quote_id(id).await?;
        Ok(files.into_iter().map(|f| self.file_response(f)).collect())
    }

    #[instrument(skip(self), fields(id = %id, file_id = %file_id))]
    async fn delete_file(&self, user_id: &str, id: ObjectId, file_id: ObjectId) -> ServiceResult<ServiceOutcome<()>> {
        self.owned_quote(user_id, id).await?;
        let file = self.repos.files.get_by_id(file_id).await?;
        if file.quote_id != id {
            return Err(ServiceError::NotFound(format!("Quote file not found for ID: {}", file_id)));
        }
        self.repos.files.delete_by_id(file_id).await?;

        let mut outcome = ServiceOutcome::new(());
        let removed = self.storage.remove_object(&file.bucket, &file.file_path).await;
        outcome.record(SideEffect::ObjectCleanup, removed);
        Ok(outcome)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn sign_as_company(&self, user_id: &str, id: ObjectId) -> ServiceResult<ServiceOutcome<SignatureResponse>> {
        self.owned_quote(user_id, id).await?;
        let profile = self
            .repos
            .companies
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::InvalidInput("Company profile is missing".to_string()))?;
        let source = profile
            .signature_path
            .clone()
            .ok_or_else(|| ServiceError::InvalidInput("Company profile has no signature".to_string()))?;

        let data = self
            .storage
            .get_object(&self.minio_config.company_assets_bucket, &source)
            .await?;
        let bucket = self.minio_config.signatures_bucket.clone();
        let object_name = object_key(&format!("quotes/{}/company", id.to_hex()), &source);
        self.storage
            .put_object(&bucket, &object_name, data.to_vec(), Some(guess_content_type(&source)))
            .await?;

        let signature = QuoteSignature {
            id: None,
            quote_id: id,
            signer_kind: SignerKind::Company,
            signer_name: profile.company_name,
            bucket,
            file_path: object_name,
            signed_at: Utc::now(),
        };
        let (saved, previous) = self.repos.signatures.upsert(signature).await?;
        info!("Company signature attached");

        let mut outcome = ServiceOutcome::new(signature_response(self.storage.as_ref(), saved));
        if let Some(previous) = previous {
            let removed = self.storage.remove_object(&previous.bucket, &previous.file_path).await;
            outcome.record(SideEffect::ObjectCleanup, removed);
        }
        Ok(outcome)
    }
}
