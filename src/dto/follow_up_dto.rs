use crate::model::follow_up::FollowUp;
use crate::model::quote_status::QuoteStatus;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SchedulerAction {
    SyncQuoteStatus,
    MarkQuoteViewed,
    CleanupFinalizedQuote,
    TestExpiration,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulerRequest {
    pub action: SchedulerAction,

    #[validate(length(equal = 24))] // MongoDB ObjectId hex string
    pub quote_id: String,
}

/// Follow-up state of one quote after a coordinator action
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpState {
    pub quote_id: ObjectId,
    pub status: QuoteStatus,
    pub follow_ups: Vec<FollowUp>,
    pub displayed: Option<FollowUp>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CleanupReport {
    pub stopped: u32,
    pub deleted: u64,
}

/// Totals of one scheduler tick
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SchedulerRunReport {
    pub expired: usize,
    pub follow_ups_sent: usize,
    pub follow_ups_failed: usize,
    pub follow_ups_stopped: usize,
}
