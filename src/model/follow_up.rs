use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FollowUpStatus {
    Pending,
    Scheduled,
    Sent,
    Stopped,
    Failed,
}

impl FollowUpStatus {
    /// Still expected to fire
    pub fn is_active(self) -> bool {
        matches!(self, FollowUpStatus::Pending | FollowUpStatus::Scheduled)
    }

    /// Lower is shown first: pending > scheduled > failed > stopped > sent.
    pub fn display_priority(self) -> u8 {
        match self {
            FollowUpStatus::Pending => 0,
            FollowUpStatus::Scheduled => 1,
            FollowUpStatus::Failed => 2,
            FollowUpStatus::Stopped => 3,
            FollowUpStatus::Sent => 4,
        }
    }
}

/// Reminder email sent to the client of a quote left unanswered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub quote_id: ObjectId,
    pub user_id: String,
    pub status: FollowUpStatus,
    /// 1-based reminder stage
    pub stage: u32,
    #[serde(default)]
    pub attempts: u32,
    pub scheduled_at: DateTime<Utc>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FollowUp {
    pub fn new(
        quote_id: ObjectId,
        user_id: &str,
        status: FollowUpStatus,
        stage: u32,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        FollowUp {
            id: None,
            quote_id,
            user_id: user_id.to_string(),
            status,
            stage,
            attempts: 0,
            scheduled_at,
            last_attempt_at: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && self.scheduled_at <= now
    }
}

/// Picks the follow-up to show for a quote. Ties go to the most recent stage.
pub fn select_display_follow_up(follow_ups: &[FollowUp]) -> Option<&FollowUp> {
    follow_ups
        .iter()
        .min_by_key(|f| (f.status.display_priority(), std::cmp::Reverse(f.stage)))
}
