use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteFile {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub quote_id: ObjectId,
    pub bucket: String,
    pub file_path: String,
    pub original_filename: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}
