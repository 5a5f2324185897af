use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Work-in-progress quote form kept between sessions. The payload is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub key: String,
    pub payload: serde_json::Value,
    pub saved_at: DateTime<Utc>,
}
