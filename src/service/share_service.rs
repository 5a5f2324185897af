use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bytes::Bytes;
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::config::{MinioConfig, QuoteConfig, ShareConfig};
use crate::dto::quote_dto::File;
use crate::dto::share_dto::{AcceptQuoteRequest, PublicCompany, PublicQuoteView, RejectQuoteRequest, ShareResponse};
use crate::model::quote::Quote;
use crate::model::quote_share::{QuoteAccessLog, QuoteShare, ShareAction};
use crate::model::quote_signature::{QuoteSignature, SignerKind};
use crate::model::quote_status::QuoteStatus;
use crate::repository::Repositories;
use crate::service::follow_up_service::FollowUpCoordinator;
use crate::service::quote_service::signature_response;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::minio::{guess_content_type, object_key, ObjectStorage};
use crate::util::outcome::{ServiceOutcome, SideEffect};
use crate::util::token::{generate_share_token, is_well_formed_token, token_preview};

#[async_trait]
pub trait ShareService: Send + Sync {
    // Issuer side
    async fn create_share(&self, user_id: &str, quote_id: ObjectId, view_only: bool) -> ServiceResult<ShareResponse>;
    async fn list_shares(&self, user_id: &str, quote_id: ObjectId) -> ServiceResult<Vec<ShareResponse>>;
    async fn revoke_share(&self, user_id: &str, quote_id: ObjectId, share_id: ObjectId) -> ServiceResult<()>;
    async fn list_access_logs(&self, user_id: &str, quote_id: ObjectId) -> ServiceResult<Vec<QuoteAccessLog>>;
    /// Newest full-access link of the quote, created when missing
    async fn ensure_client_share(&self, quote: &Quote) -> ServiceResult<ShareResponse>;

    // Client side, authenticated by the token only
    async fn view(&self, token: &str, user_agent: Option<String>) -> ServiceResult<ServiceOutcome<PublicQuoteView>>;
    async fn accept(
        &self,
        token: &str,
        user_agent: Option<String>,
        req: AcceptQuoteRequest,
    ) -> ServiceResult<ServiceOutcome<PublicQuoteView>>;
    async fn reject(
        &self,
        token: &str,
        user_agent: Option<String>,
        req: RejectQuoteRequest,
    ) -> ServiceResult<ServiceOutcome<PublicQuoteView>>;
    /// Stores the client signature and accepts the quote if it still can be
    async fn sign(
        &self,
        token: &str,
        user_agent: Option<String>,
        signer_name: String,
        file: File,
    ) -> ServiceResult<ServiceOutcome<PublicQuoteView>>;
    async fn company_logo(&self, token: &str) -> ServiceResult<(Bytes, &'static str)>;
}

pub struct ShareServiceImpl {
    pub repos: Repositories,
    pub storage: Arc<dyn ObjectStorage>,
    pub coordinator: Arc<dyn FollowUpCoordinator>,
    pub share_config: ShareConfig,
    pub quote_config: QuoteConfig,
    pub minio_config: MinioConfig,
}

impl ShareServiceImpl {
    pub fn new(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        coordinator: Arc<dyn FollowUpCoordinator>,
        share_config: ShareConfig,
        quote_config: QuoteConfig,
        minio_config: MinioConfig,
    ) -> Self {
        ShareServiceImpl {
            repos,
            storage,
            coordinator,
            share_config,
            quote_config,
            minio_config,
        }
    }

    fn response(&self, share: QuoteShare) -> ShareResponse {
        let url = self.share_config.generate_share_url(&share.token);
        ShareResponse { share, url }
    }

    async fn new_share(&self, quote_id: ObjectId, view_only: bool) -> ServiceResult<ShareResponse> {
        let share = QuoteShare {
            id: None,
            quote_id,
            token: generate_share_token(self.share_config.token_length),
            view_only,
            revoked: false,
            created_at: Utc::now(),
        };
        let created = self.repos.shares.create(share).await?;
        info!(token = %token_preview(&created.token), view_only, "Share link created");
        Ok(self.response(created))
    }

    /// Share and quote behind a token. Unknown tokens are not found, revoked ones forbidden.
    async fn resolve(&self, token: &str) -> ServiceResult<(QuoteShare, Quote)> {
        let not_found = || ServiceError::NotFound("Share link not found".to_string());
        if !is_well_formed_token(token) {
            return Err(not_found());
        }
        let share = self.repos.shares.find_by_token(token).await?.ok_or_else(not_found)?;
        if share.revoked {
            return Err(ServiceError::Forbidden("This share link has been revoked".to_string()));
        }
        let quote = self.repos.quotes.get_by_id(share.quote_id).await?;
        Ok((share, quote))
    }

    async fn log_access(&self, share: &QuoteShare, action: ShareAction, user_agent: Option<String>) -> ServiceResult<()> {
        let share_id = share
            .id
            .ok_or_else(|| ServiceError::InternalError("Share has no id".to_string()))?;
        self.repos
            .access_logs
            .create(QuoteAccessLog {
                id: None,
                share_id,
                quote_id: share.quote_id,
                view_only: share.view_only,
                action,
                user_agent,
                accessed_at: Utc::now(),
            })
            .await?;
        Ok(())
    }

    /// Logs the attempt, then refuses it unless the token allows actions
    async fn authorize_action<T>(
        &self,
        share: &QuoteShare,
        action: ShareAction,
        user_agent: Option<String>,
        outcome: &mut ServiceOutcome<T>,
    ) -> ServiceResult<()> {
        let logged = self.log_access(share, action, user_agent).await;
        outcome.record(SideEffect::AccessLog, logged);
        if !share.allows_actions() {
            warn!(token = %token_preview(&share.token), %action, "Action refused on view-only link");
            return Err(ServiceError::Forbidden("This link is view-only".to_string()));
        }
        Ok(())
    }

    /// Expires an overdue quote before the client can answer it, even if the
    /// scheduler has not reached it yet.
    async fn refuse_if_expired(&self, quote: Quote) -> ServiceResult<Quote> {
        let quote = self
            .coordinator
            .test_expiration(quote, Utc::now().date_naive())
            .await?
            .data;
        if quote.status == QuoteStatus::Expired {
            return Err(ServiceError::Conflict(format!(
                "Quote {} has expired and can no longer be answered",
                quote.number
            )));
        }
        Ok(quote)
    }

    async fn build_view(&self, share: &QuoteShare, quote: Quote) -> ServiceResult<PublicQuoteView> {
        let quote_id = share.quote_id;
        let settings = self
            .repos
            .financial_configs
            .find_by_quote_id(quote_id)
            .await?
            .map(|c| c.settings)
            .unwrap_or_default();
        let company = self
            .repos
            .companies
            .find_by_user(&quote.user_id)
            .await?
            .map(|p| PublicCompany {
                has_logo: p.logo_path.is_some(),
                company_name: p.company_name,
                email: p.email,
                phone: p.phone,
                address: p.address,
                vat_number: p.vat_number,
            });
        let client_name = match quote.client_id {
            Some(client_id) => self
                .repos
                .clients
                .get_for_user(client_id, &quote.user_id)
                .await
                .ok()
                .map(|c| c.name),
            None => None,
        };
        let signatures = self
            .repos
            .signatures
            .find_by_quote_id(quote_id)
            .await?
            .into_iter()
            .map(|s| signature_response(self.storage.as_ref(), s))
            .collect();

        Ok(PublicQuoteView {
            actions_allowed: share.allows_actions() && quote.status.can_transition_to(QuoteStatus::Accepted),
            number: quote.number,
            title: quote.title,
            status: quote.status,
            valid_until: quote.valid_until,
            tasks: quote.tasks,
            totals: quote.totals,
            show_vat: settings.vat.display,
            conditions: quote.conditions,
            banner: Some(settings.banner).filter(|b| b.enabled),
            discount: Some(settings.discount).filter(|d| d.enabled),
            company,
            client_name,
            signatures,
            view_only: share.view_only,
        })
    }

    async fn store_client_signature(
        &self,
        quote_id: ObjectId,
        signer_name: String,
        file: File,
        outcome: &mut ServiceOutcome<()>,
    ) -> ServiceResult<()> {
        let bucket = self.minio_config.signatures_bucket.clone();
        let object_name = object_key(&format!("quotes/{}/client", quote_id.to_hex()), &file.filename);
        self.storage
            .put_object(&bucket, &object_name, file.content, Some(file.content_type.as_str()))
            .await?;

        let signature = QuoteSignature {
            id: None,
            quote_id,
            signer_kind: SignerKind::Client,
            signer_name,
            bucket,
            file_path: object_name,
            signed_at: Utc::now(),
        };
        let (_, previous) = self.repos.signatures.upsert(signature).await?;
        if let Some(previous) = previous {
            let removed = self.storage.remove_object(&previous.bucket, &previous.file_path).await;
            outcome.record(SideEffect::ObjectCleanup, removed);
        }
        Ok(())
    }
}

#[async_trait]
impl ShareService for ShareServiceImpl {
    #[instrument(skip(self), fields(quote_id = %quote_id))]
    async fn create_share(&self, user_id: &str, quote_id: ObjectId, view_only: bool) -> ServiceResult<ShareResponse> {
        self.repos.quotes.get_for_user(quote_id, user_id).await?;
        self.new_share(quote_id, view_only).await
    }

    async fn list_shares(&self, user_id: &str, quote_id: ObjectId) -> ServiceResult<Vec<ShareResponse>> {
        self.repos.quotes.get_for_user(quote_id, user_id).await?;
        let shares = self.repos.shares.list_by_quote_id(quote_id).await?;
        Ok(shares.into_iter().map(|s| self.response(s)).collect())
    }

    #[instrument(skip(self), fields(quote_id = %quote_id, share_id = %share_id))]
    async fn revoke_share(&self, user_id: &str, quote_id: ObjectId, share_id: ObjectId) -> ServiceResult<()> {
        self.repos.quotes.get_for_user(quote_id, user_id).await?;
        let owned = self
            .repos
            .shares
            .list_by_quote_id(quote_id)
            .await?
            .iter()
            .any(|s| s.id == Some(share_id));
        if !owned {
            return Err(ServiceError::NotFound(format!("Share not found for ID: {}", share_id)));
        }
        self.repos.shares.revoke(share_id).await?;
        info!("Share link revoked");
        Ok(())
    }

    async fn list_access_logs(&self, user_id: &str, quote_id: ObjectId) -> ServiceResult<Vec<QuoteAccessLog>> {
        self.repos.quotes.get_for_user(quote_id, user_id).await?;
        let mut logs = self.repos.access_logs.list_by_quote_id(quote_id).await?;
        logs.sort_by(|a, b| b.accessed_at.cmp(&a.accessed_at));
        Ok(logs)
    }

    async fn ensure_client_share(&self, quote: &Quote) -> ServiceResult<ShareResponse> {
        let quote_id = quote
            .id
            .ok_or_else(|| ServiceError::InternalError("Quote has no id".to_string()))?;
        let existing = self
            .repos
            .shares
            .list_by_quote_id(quote_id)
            .await?
            .into_iter()
            .filter(QuoteShare::allows_actions)
            .max_by_key(|s| s.created_at);
        match existing {
            Some(share) => Ok(self.response(share)),
            None => self.new_share(quote_id, false).await,
        }
    }

    #[instrument(skip(self, token, user_agent), fields(token = %token_preview(token)))]
    async fn view(&self, token: &str, user_agent: Option<String>) -> ServiceResult<ServiceOutcome<PublicQuoteView>> {
        let (share, quote) = self.resolve(token).await?;
        let mut outcome = ServiceOutcome::new(());
        let logged = self.log_access(&share, ShareAction::View, user_agent).await;
        outcome.record(SideEffect::AccessLog, logged);

        // View-only links are the issuer's own copies and never count as a client view.
        let quote = if !share.view_only && quote.status == QuoteStatus::Sent {
            outcome.absorb(self.coordinator.mark_quote_viewed(quote).await?)
        } else {
            quote
        };

        let view = self.build_view(&share, quote).await?;
        Ok(outcome.map(|_| view))
    }

    #[instrument(skip(self, token, user_agent, req), fields(token = %token_preview(token)))]
    async fn accept(
        &self,
        token: &str,
        user_agent: Option<String>,
        req: AcceptQuoteRequest,
    ) -> ServiceResult<ServiceOutcome<PublicQuoteView>> {
        let (share, quote) = self.resolve(token).await?;
        let mut outcome = ServiceOutcome::new(());
        self.authorize_action(&share, ShareAction::Accept, user_agent, &mut outcome)
            .await?;
        let quote = self.refuse_if_expired(quote).await?;

        let metadata = json!({ "source": "client", "signer_name": req.signer_name });
        let quote = outcome.absorb(
            self.coordinator
                .transition(quote, QuoteStatus::Accepted, metadata)
                .await?,
        );
        let view = self.build_view(&share, quote).await?;
        Ok(outcome.map(|_| view))
    }

    #[instrument(skip(self, token, user_agent, req), fields(token = %token_preview(token)))]
    async fn reject(
        &self,
        token: &str,
        user_agent: Option<String>,
        req: RejectQuoteRequest,
    ) -> ServiceResult<ServiceOutcome<PublicQuoteView>> {
        let (share, quote) = self.resolve(token).await?;
        let mut outcome = ServiceOutcome::new(());
        self.authorize_action(&share, ShareAction::Reject, user_agent, &mut outcome)
            .await?;
        let quote = self.refuse_if_expired(quote).await?;

        let metadata = json!({ "source": "client", "reason": req.reason });
        let quote = outcome.absorb(
            self.coordinator
                .transition(quote, QuoteStatus::Rejected, metadata)
                .await?,
        );
        let view = self.build_view(&share, quote).await?;
        Ok(outcome.map(|_| view))
    }

    #[instrument(skip(self, token, user_agent, file), fields(token = %token_preview(token), size = file.size))]
    async fn sign(
        &self,
        token: &str,
        user_agent: Option<String>,
        signer_name: String,
        file: File,
    ) -> ServiceResult<ServiceOutcome<PublicQuoteView>> {
        let (share, quote) = self.resolve(token).await?;
        let mut outcome = ServiceOutcome::new(());
        self.authorize_action(&share, ShareAction::Sign, user_agent, &mut outcome)
            .await?;
        let quote = self.refuse_if_expired(quote).await?;

        let signer_name = signer_name.trim().to_string();
        if signer_name.is_empty() {
            return Err(ServiceError::InvalidInput("Signer name is required".to_string()));
        }
        if file.size == 0 || file.size > self.quote_config.max_upload_bytes {
            return Err(ServiceError::InvalidInput(format!(
                "Signature image must be between 1 and {} bytes",
                self.quote_config.max_upload_bytes
            )));
        }
        let accepts = quote.status.can_transition_to(QuoteStatus::Accepted);
        if !accepts && quote.status != QuoteStatus::Accepted {
            return Err(ServiceError::Conflict(format!(
                "Quote {} is {} and can no longer be signed",
                quote.number, quote.status
            )));
        }

        self.store_client_signature(share.quote_id, signer_name.clone(), file, &mut outcome)
            .await?;
        info!("Client signature stored");

        let quote = if accepts {
            let metadata = json!({ "source": "client", "signer_name": signer_name, "signed": true });
            outcome.absorb(
                self.coordinator
                    .transition(quote, QuoteStatus::Accepted, metadata)
                    .await?,
            )
        } else {
            quote
        };
        let view = self.build_view(&share, quote).await?;
        Ok(outcome.map(|_| view))
    }

    async fn company_logo(&self, token: &str) -> ServiceResult<(Bytes, &'static str)> {
        let (_, quote) = self.resolve(token).await?;
        let logo_path = self
            .repos
            .companies
            .find_by_user(&quote.user_id)
            .await?
            .and_then(|p| p.logo_path)
            .ok_or_else(|| ServiceError::NotFound("Company has no logo".to_string()))?;
        let data = self
            .storage
            .get_object(&self.minio_config.company_assets_bucket, &logo_path)
            .await?;
        Ok((data, guess_content_type(&logo_path)))
    }
}
