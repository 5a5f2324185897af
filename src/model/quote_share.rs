use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Public link to a quote. View-only links never let the client act on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteShare {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub quote_id: ObjectId,
    pub token: String,
    pub view_only: bool,
    #[serde(default)]
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl QuoteShare {
    pub fn allows_actions(&self) -> bool {
        !self.view_only && !self.revoked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShareAction {
    View,
    Accept,
    Reject,
    Sign,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteAccessLog {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub share_id: ObjectId,
    pub quote_id: ObjectId,
    pub view_only: bool,
    pub action: ShareAction,
    pub user_agent: Option<String>,
    pub accessed_at: DateTime<Utc>,
}
