use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The artisan's business identity, printed on every quote. One per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub company_name: String,
    pub legal_id: Option<String>,
    pub vat_number: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Object path in the company assets bucket
    pub logo_path: Option<String>,
    pub signature_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompanyAsset {
    Logo,
    Signature,
}

impl CompanyProfile {
    pub fn asset_path(&self, asset: CompanyAsset) -> Option<&str> {
        match asset {
            CompanyAsset::Logo => self.logo_path.as_deref(),
            CompanyAsset::Signature => self.signature_path.as_deref(),
        }
    }

    /// Replaces the stored path and hands back the previous one
    pub fn replace_asset(&mut self, asset: CompanyAsset, path: String) -> Option<String> {
        let slot = match asset {
            CompanyAsset::Logo => &mut self.logo_path,
            CompanyAsset::Signature => &mut self.signature_path,
        };
        slot.replace(path)
    }
}
