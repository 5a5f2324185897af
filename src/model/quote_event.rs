use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuoteEventType {
    Created,
    Updated,
    EmailSent,
    Viewed,
    Accepted,
    Rejected,
    Expired,
    ConvertedToInvoice,
    FollowUpSent,
    StatusChanged,
}

/// Append-only history entry for a quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteEvent {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub quote_id: ObjectId,
    pub event_type: QuoteEventType,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl QuoteEvent {
    pub fn new(quote_id: ObjectId, event_type: QuoteEventType, metadata: serde_json::Value) -> Self {
        QuoteEvent {
            id: None,
            quote_id,
            event_type,
            metadata,
            created_at: Utc::now(),
        }
    }
}
