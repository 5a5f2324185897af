use crate::dto::quote_dto::SignatureResponse;
use crate::model::financial_config::{BannerSettings, DiscountSettings};
use crate::model::quote::{QuoteTask, QuoteTotals};
use crate::model::quote_share::QuoteShare;
use crate::model::quote_status::QuoteStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateShareRequest {
    /// View-only links are the ones the artisan keeps for themselves
    #[serde(default)]
    pub view_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareResponse {
    #[serde(flatten)]
    pub share: QuoteShare,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AcceptQuoteRequest {
    #[validate(length(min = 1, max = 200))]
    pub signer_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RejectQuoteRequest {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

/// Issuer details printed on the public page
#[derive(Debug, Clone, Serialize)]
pub struct PublicCompany {
    pub company_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub vat_number: Option<String>,
    pub has_logo: bool,
}

/// What a client sees behind a share token
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuoteView {
    pub number: String,
    pub title: String,
    pub status: QuoteStatus,
    pub valid_until: Option<NaiveDate>,
    pub tasks: Vec<QuoteTask>,
    pub totals: QuoteTotals,
    pub show_vat: bool,
    pub conditions: Option<String>,
    pub banner: Option<BannerSettings>,
    pub discount: Option<DiscountSettings>,
    pub company: Option<PublicCompany>,
    pub client_name: Option<String>,
    pub signatures: Vec<SignatureResponse>,
    pub view_only: bool,
    /// Accept, reject and sign are offered
    pub actions_allowed: bool,
}
