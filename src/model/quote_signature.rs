use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignerKind {
    Company,
    Client,
}

/// A signature image attached to a quote. One per (quote, signer kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSignature {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub quote_id: ObjectId,
    pub signer_kind: SignerKind,
    pub signer_name: String,
    pub bucket: String,
    pub file_path: String,
    pub signed_at: DateTime<Utc>,
}
