use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::config::ShareConfig;
use crate::model::company_profile::CompanyProfile;
use crate::model::follow_up::FollowUp;
use crate::model::quote::Quote;
use crate::repository::client_repo::ClientRepository;
use crate::repository::company_profile_repo::CompanyProfileRepository;
use crate::repository::quote_share_repo::QuoteShareRepository;
use crate::util::email::{build_email, validate_email_address, EmailContext, EmailSender, EmailType};
use crate::util::error::{ServiceError, ServiceResult};

/// Emails tied to the life of a quote. Callers treat every failure as a
/// best-effort side effect.
#[async_trait]
pub trait QuoteNotifier: Send + Sync {
    /// The quote itself, to the client
    async fn send_quote(&self, quote: &Quote, recipient: &str, share_url: &str) -> ServiceResult<()>;
    /// Accepted, rejected or expired notice to the artisan
    async fn notify_issuer(&self, quote: &Quote, email_type: EmailType) -> ServiceResult<()>;
    async fn send_follow_up(&self, quote: &Quote, follow_up: &FollowUp) -> ServiceResult<()>;
}

pub struct EmailQuoteNotifier {
    pub email_sender: Arc<dyn EmailSender>,
    pub company_repo: Arc<dyn CompanyProfileRepository>,
    pub client_repo: Arc<dyn ClientRepository>,
    pub share_repo: Arc<dyn QuoteShareRepository>,
    pub share_config: ShareConfig,
}

impl EmailQuoteNotifier {
    pub fn new(
        email_sender: Arc<dyn EmailSender>,
        company_repo: Arc<dyn CompanyProfileRepository>,
        client_repo: Arc<dyn ClientRepository>,
        share_repo: Arc<dyn QuoteShareRepository>,
        share_config: ShareConfig,
    ) -> Self {
        EmailQuoteNotifier {
            email_sender,
            company_repo,
            client_repo,
            share_repo,
            share_config,
        }
    }

    async fn company(&self, quote: &Quote) -> ServiceResult<CompanyProfile> {
        self.company_repo
            .find_by_user(&quote.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No company profile to send from".to_string()))
    }

    /// Client name and address of the quote, the address being required
    async fn client_contact(&self, quote: &Quote) -> ServiceResult<(String, String)> {
        let client_id = quote
            .client_id
            .ok_or_else(|| ServiceError::InvalidInput("Quote has no client".to_string()))?;
        let client = self.client_repo.get_for_user(client_id, &quote.user_id).await?;
        let email = client
            .email
            .ok_or_else(|| ServiceError::InvalidInput("Client has no email address".to_string()))?;
        Ok((client.name, email))
    }

    async fn client_share_url(&self, quote: &Quote) -> ServiceResult<Option<String>> {
        let Some(quote_id) = quote.id else {
            return Ok(None);
        };
        let shares = self.share_repo.list_by_quote_id(quote_id).await?;
        Ok(shares
            .iter()
            .filter(|s| s.allows_actions())
            .max_by_key(|s| s.created_at)
            .map(|s| self.share_config.generate_share_url(&s.token)))
    }

    async fn deliver(&self, to: &str, email_type: EmailType, ctx: &EmailContext) -> ServiceResult<()> {
        validate_email_address(to)?;
        self.email_sender.send_email(build_email(to, email_type, ctx)).await?;
        info!(%email_type, "Quote email sent");
        Ok(())
    }
}

pub fn email_context(quote: &Quote, company: &CompanyProfile, recipient_name: &str) -> EmailContext {
    EmailContext {
        recipient_name: recipient_name.to_string(),
        company_name: company.company_name.clone(),
        quote_number: quote.number.clone(),
        quote_title: quote.title.clone(),
        total_amount: format!("{:.2}", quote.totals.total_with_vat),
        valid_until: quote.valid_until.map(|d| d.format("%Y-%m-%d").to_string()),
        share_url: None,
        follow_up_stage: None,
    }
}

#[async_trait]
impl QuoteNotifier for EmailQuoteNotifier {
    #[instrument(skip(self, quote, share_url), fields(quote = %quote.number))]
    async fn send_quote(&self, quote: &Quote, recipient: &str, share_url: &str) -> ServiceResult<()> {
        let company = self.company(quote).await?;
        let recipient_name = match self.client_contact(quote).await {
            Ok((name, _)) => name,
            Err(_) => recipient.to_string(),
        };
        let mut ctx = email_context(quote, &company, &recipient_name);
        ctx.share_url = Some(share_url.to_string());
        self.deliver(recipient, EmailType::QuoteSent, &ctx).await
    }

    #[instrument(skip(self, quote), fields(quote = %quote.number))]
    async fn notify_issuer(&self, quote: &Quote, email_type: EmailType) -> ServiceResult<()> {
        let company = self.company(quote).await?;
        let ctx = email_context(quote, &company, &company.company_name);
        self.deliver(&company.email, email_type, &ctx).await
    }

    #[instrument(skip(self, quote, follow_up), fields(quote = %quote.number, stage = follow_up.stage))]
    async fn send_follow_up(&self, quote: &Quote, follow_up: &FollowUp) -> ServiceResult<()> {
        let company = self.company(quote).await?;
        let (name, email) = self.client_contact(quote).await?;
        let mut ctx = email_context(quote, &company, &name);
        ctx.share_url = self.client_share_url(quote).await?;
        ctx.follow_up_stage = Some(follow_up.stage);
        self.deliver(&email, EmailType::FollowUpReminder, &ctx).await
    }
}
