//! Status lifecycle of quotes and the follow-up reminders hanging off it.
//!
//! Every status change goes through [`FollowUpCoordinator::transition`]; the
//! status write is the primary action, while events, follow-ups and emails
//! are reported as side effects on the returned [`ServiceOutcome`].

use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::config::FollowUpConfig;
use crate::dto::follow_up_dto::{CleanupReport, FollowUpState, SchedulerAction, SchedulerRunReport};
use crate::model::follow_up::{select_display_follow_up, FollowUp, FollowUpStatus};
use crate::model::quote::Quote;
use crate::model::quote_event::{QuoteEvent, QuoteEventType};
use crate::model::quote_status::QuoteStatus;
use crate::repository::follow_up_repo::FollowUpRepository;
use crate::repository::quote_event_repo::QuoteEventRepository;
use crate::repository::quote_repo::QuoteRepository;
use crate::service::notification_service::QuoteNotifier;
use crate::util::email::EmailType;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::outcome::{ServiceOutcome, SideEffect};

#[async_trait]
pub trait FollowUpCoordinator: Send + Sync {
    /// Moves `quote` to `next` and runs the side effects of the new status
    async fn transition(
        &self,
        quote: Quote,
        next: QuoteStatus,
        metadata: serde_json::Value,
    ) -> ServiceResult<ServiceOutcome<Quote>>;
    /// Draft to sent, plus the deduplicated `email_sent` event and the first
    /// follow-up. Already sent quotes only get the side effects.
    async fn mark_as_sent(&self, quote: Quote) -> ServiceResult<ServiceOutcome<Quote>>;
    /// Creates the first stage if the quote awaits the client and has none
    async fn schedule_follow_ups(&self, quote: &Quote) -> ServiceResult<Vec<FollowUp>>;
    async fn stop_follow_ups(&self, quote_id: ObjectId) -> ServiceResult<u32>;
    async fn sync_quote_status(&self, quote: Quote) -> ServiceResult<ServiceOutcome<Quote>>;
    async fn mark_quote_viewed(&self, quote: Quote) -> ServiceResult<ServiceOutcome<Quote>>;
    async fn cleanup_finalized_quote(&self, quote: &Quote) -> ServiceResult<ServiceOutcome<CleanupReport>>;
    async fn test_expiration(&self, quote: Quote, today: NaiveDate) -> ServiceResult<ServiceOutcome<Quote>>;
    async fn follow_up_state(&self, quote: &Quote) -> ServiceResult<FollowUpState>;
    /// Entry point of `POST /followups/scheduler`
    async fn run_action(
        &self,
        user_id: &str,
        action: SchedulerAction,
        quote_id: ObjectId,
    ) -> ServiceResult<ServiceOutcome<FollowUpState>>;
    async fn expire_due_quotes(&self, today: NaiveDate) -> ServiceResult<usize>;
    async fn process_due_follow_ups(&self, now: DateTime<Utc>) -> ServiceResult<SchedulerRunReport>;
}

pub struct FollowUpCoordinatorImpl {
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub follow_up_repo: Arc<dyn FollowUpRepository>,
    pub event_repo: Arc<dyn QuoteEventRepository>,
    pub notifier: Arc<dyn QuoteNotifier>,
    pub config: FollowUpConfig,
}

impl FollowUpCoordinatorImpl {
    pub fn new(
        quote_repo: Arc<dyn QuoteRepository>,
        follow_up_repo: Arc<dyn FollowUpRepository>,
        event_repo: Arc<dyn QuoteEventRepository>,
        notifier: Arc<dyn QuoteNotifier>,
        config: FollowUpConfig,
    ) -> Self {
        FollowUpCoordinatorImpl {
            quote_repo,
            follow_up_repo,
            event_repo,
            notifier,
            config,
        }
    }

    async fn log_events(&self, events: Vec<QuoteEvent>) -> ServiceResult<()> {
        for event in events {
            self.event_repo.create(event).await?;
        }
        Ok(())
    }

    /// Logs `email_sent` unless the quote already has one
    async fn log_email_sent_once(&self, quote_id: ObjectId, outcome: &mut ServiceOutcome<Quote>) {
        match self.event_repo.exists(quote_id, QuoteEventType::EmailSent).await {
            Ok(true) => outcome.skipped(SideEffect::EventLog, "email_sent already logged"),
            Ok(false) => {
                let event = QuoteEvent::new(quote_id, QuoteEventType::EmailSent, json!({}));
                let result = self.event_repo.create(event).await.map(|_| ());
                outcome.record(SideEffect::EventLog, result);
            }
            Err(e) => outcome.failed(SideEffect::EventLog, e.to_string()),
        }
    }

    async fn record_scheduling(&self, quote: &Quote, outcome: &mut ServiceOutcome<Quote>) {
        match self.schedule_follow_ups(quote).await {
            Ok(created) if created.is_empty() => {
                outcome.skipped(SideEffect::FollowUps, "no follow-up to create")
            }
            Ok(_) => outcome.done(SideEffect::FollowUps),
            Err(e) => outcome.failed(SideEffect::FollowUps, e.to_string()),
        }
    }

    /// Pushes active reminders back so a client reading the quote gets time to answer
    async fn postpone_active(&self, quote_id: ObjectId, now: DateTime<Utc>) -> ServiceResult<()> {
        let not_before = now + self.config.viewed_delay();
        for mut follow_up in self.follow_up_repo.list_by_quote_id(quote_id).await? {
            if follow_up.status.is_active() && follow_up.scheduled_at < not_before {
                follow_up.scheduled_at = not_before;
                follow_up.updated_at = now;
                self.follow_up_repo.update(&follow_up).await?;
            }
        }
        Ok(())
    }

    async fn run_follow_up(
        &self,
        mut follow_up: FollowUp,
        now: DateTime<Utc>,
        report: &mut SchedulerRunReport,
    ) -> ServiceResult<()> {
        let quote = match self.quote_repo.get_by_id(follow_up.quote_id).await {
            Ok(quote) => Some(quote),
            Err(crate::repository::repository_error::RepositoryError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let Some(quote) = quote.filter(|q| q.status.awaits_client()) else {
            follow_up.status = FollowUpStatus::Stopped;
            follow_up.updated_at = now;
            self.follow_up_repo.update(&follow_up).await?;
            report.follow_ups_stopped += 1;
            return Ok(());
        };

        follow_up.attempts += 1;
        follow_up.last_attempt_at = Some(now);
        follow_up.updated_at = now;

        match self.notifier.send_follow_up(&quote, &follow_up).await {
            Ok(()) => {
                follow_up.status = FollowUpStatus::Sent;
                follow_up.last_error = None;
                self.follow_up_repo.update(&follow_up).await?;
                report.follow_ups_sent += 1;

                let event = QuoteEvent::new(
                    follow_up.quote_id,
                    QuoteEventType::FollowUpSent,
                    json!({ "stage": follow_up.stage }),
                );
                if let Err(e) = self.event_repo.create(event).await {
                    warn!(error = %e, "Failed to log follow-up event");
                }

                let next_stage = follow_up.stage + 1;
                if let Some(delay) = self.config.stage_delay(next_stage) {
                    let next = FollowUp::new(
                        follow_up.quote_id,
                        &follow_up.user_id,
                        FollowUpStatus::Scheduled,
                        next_stage,
                        now + delay,
                    );
                    self.follow_up_repo.create(next).await?;
                    debug!(stage = next_stage, "Next follow-up scheduled");
                }
            }
            Err(e) => {
                warn!(quote = %quote.number, attempts = follow_up.attempts, error = %e, "Follow-up email failed");
                follow_up.last_error = Some(e.to_string());
                if follow_up.attempts >= self.config.max_attempts {
                    follow_up.status = FollowUpStatus::Failed;
                    report.follow_ups_failed += 1;
                } else {
                    follow_up.scheduled_at = now + self.config.retry_delay();
                }
                self.follow_up_repo.update(&follow_up).await?;
            }
        }
        Ok(())
    }
}

fn event_for(status: QuoteStatus) -> Option<QuoteEventType> {
    match status {
        QuoteStatus::Draft | QuoteStatus::Sent => None,
        QuoteStatus::Viewed => Some(QuoteEventType::Viewed),
        QuoteStatus::Accepted => Some(QuoteEventType::Accepted),
        QuoteStatus::Rejected => Some(QuoteEventType::Rejected),
        QuoteStatus::Expired => Some(QuoteEventType::Expired),
        QuoteStatus::ConvertedToInvoice => Some(QuoteEventType::ConvertedToInvoice),
    }
}

fn issuer_email(status: QuoteStatus) -> Option<EmailType> {
    match status {
        QuoteStatus::Accepted => Some(EmailType::QuoteAccepted),
        QuoteStatus::Rejected => Some(EmailType::QuoteRejected),
        QuoteStatus::Expired => Some(EmailType::QuoteExpired),
        _ => None,
    }
}

fn quote_id_of(quote: &Quote) -> ServiceResult<ObjectId> {
    quote
        .id
        .ok_or_else(|| ServiceError::InternalError("Quote has no id".to_string()))
}

#[async_trait]
impl FollowUpCoordinator for FollowUpCoordinatorImpl {
    #[instrument(skip(self, quote, metadata), fields(quote = %quote.number, from = %quote.status, to = %next))]
    async fn transition(
        &self,
        quote: Quote,
        next: QuoteStatus,
        metadata: serde_json::Value,
    ) -> ServiceResult<ServiceOutcome<Quote>> {
        let quote_id = quote_id_of(&quote)?;
        let previous = quote.status;
        if !previous.can_transition_to(next) {
            return Err(ServiceError::Conflict(format!(
                "Cannot move quote {} from {} to {}",
                quote.number, previous, next
            )));
        }

        let mut quote = quote;
        quote.apply_status(next, Utc::now());
        self.quote_repo.update(&quote).await?;
        info!("Quote status changed");

        let mut outcome = ServiceOutcome::new(quote);

        let mut events = vec![QuoteEvent::new(
            quote_id,
            QuoteEventType::StatusChanged,
            json!({ "from": previous, "to": next }),
        )];
        if let Some(event_type) = event_for(next) {
            events.push(QuoteEvent::new(quote_id, event_type, metadata));
        }
        let logged = self.log_events(events).await;
        outcome.record(SideEffect::EventLog, logged);

        if next.is_final() {
            let stopped = self.stop_follow_ups(quote_id).await.map(|_| ());
            outcome.record(SideEffect::FollowUps, stopped);
        }

        if let Some(email_type) = issuer_email(next) {
            let sent = self.notifier.notify_issuer(&outcome.data, email_type).await;
            outcome.record(SideEffect::Email, sent);
        }

        Ok(outcome)
    }

    #[instrument(skip(self, quote), fields(quote = %quote.number, status = %quote.status))]
    async fn mark_as_sent(&self, quote: Quote) -> ServiceResult<ServiceOutcome<Quote>> {
        let quote_id = quote_id_of(&quote)?;
        let mut outcome = match quote.status {
            QuoteStatus::Draft => self.transition(quote, QuoteStatus::Sent, json!({})).await?,
            QuoteStatus::Sent | QuoteStatus::Viewed => ServiceOutcome::new(quote),
            status => {
                return Err(ServiceError::Conflict(format!(
                    "Quote {} is {} and cannot be sent",
                    quote.number, status
                )))
            }
        };

        self.log_email_sent_once(quote_id, &mut outcome).await;
        let quote = outcome.data.clone();
        self.record_scheduling(&quote, &mut outcome).await;
        Ok(outcome)
    }

    #[instrument(skip(self, quote), fields(quote = %quote.number))]
    async fn schedule_follow_ups(&self, quote: &Quote) -> ServiceResult<Vec<FollowUp>> {
        if !self.config.enabled || !quote.status.awaits_client() {
            return Ok(Vec::new());
        }
        let quote_id = quote_id_of(quote)?;
        let existing = self.follow_up_repo.list_by_quote_id(quote_id).await?;
        if !existing.is_empty() {
            debug!(count = existing.len(), "Quote already has follow-ups");
            return Ok(Vec::new());
        }
        let Some(delay) = self.config.stage_delay(1) else {
            return Ok(Vec::new());
        };

        let sent_at = quote.sent_at.unwrap_or_else(Utc::now);
        let first = FollowUp::new(quote_id, &quote.user_id, FollowUpStatus::Pending, 1, sent_at + delay);
        let created = self.follow_up_repo.create(first).await?;
        info!(scheduled_at = %created.scheduled_at, "First follow-up scheduled");
        Ok(vec![created])
    }

    #[instrument(skip(self))]
    async fn stop_follow_ups(&self, quote_id: ObjectId) -> ServiceResult<u32> {
        let now = Utc::now();
        let mut stopped = 0;
        for mut follow_up in self.follow_up_repo.list_by_quote_id(quote_id).await? {
            if follow_up.status.is_active() {
                follow_up.status = FollowUpStatus::Stopped;
                follow_up.updated_at = now;
                self.follow_up_repo.update(&follow_up).await?;
                stopped += 1;
            }
        }
        if stopped > 0 {
            info!(stopped, "Follow-ups stopped");
        }
        Ok(stopped)
    }

    async fn sync_quote_status(&self, quote: Quote) -> ServiceResult<ServiceOutcome<Quote>> {
        let quote_id = quote_id_of(&quote)?;
        let mut outcome = ServiceOutcome::new(quote);
        if outcome.data.status.is_final() {
            let stopped = self.stop_follow_ups(quote_id).await.map(|_| ());
            outcome.record(SideEffect::FollowUps, stopped);
        } else if outcome.data.status.awaits_client() {
            let quote = outcome.data.clone();
            self.record_scheduling(&quote, &mut outcome).await;
        } else {
            outcome.skipped(SideEffect::FollowUps, "draft quotes have no follow-ups");
        }
        Ok(outcome)
    }

    #[instrument(skip(self, quote), fields(quote = %quote.number, status = %quote.status))]
    async fn mark_quote_viewed(&self, quote: Quote) -> ServiceResult<ServiceOutcome<Quote>> {
        let quote_id = quote_id_of(&quote)?;
        let mut outcome = match quote.status {
            QuoteStatus::Sent => self.transition(quote, QuoteStatus::Viewed, json!({})).await?,
            QuoteStatus::Viewed => ServiceOutcome::new(quote),
            status => {
                let mut outcome = ServiceOutcome::new(quote);
                outcome.skipped(SideEffect::FollowUps, format!("quote is {}", status));
                return Ok(outcome);
            }
        };
        let postponed = self.postpone_active(quote_id, Utc::now()).await;
        outcome.record(SideEffect::FollowUps, postponed);
        Ok(outcome)
    }

    #[instrument(skip(self, quote), fields(quote = %quote.number))]
    async fn cleanup_finalized_quote(&self, quote: &Quote) -> ServiceResult<ServiceOutcome<CleanupReport>> {
        if !quote.status.is_final() {
            return Err(ServiceError::Conflict(format!(
                "Quote {} is {} and still awaits an answer",
                quote.number, quote.status
            )));
        }
        let quote_id = quote_id_of(quote)?;
        let stopped = self.stop_follow_ups(quote_id).await?;
        let deleted = self.follow_up_repo.delete_stopped_by_quote_id(quote_id).await?;
        info!(stopped, deleted, "Finalized quote cleaned up");
        Ok(ServiceOutcome::new(CleanupReport { stopped, deleted }))
    }

    async fn test_expiration(&self, quote: Quote, today: NaiveDate) -> ServiceResult<ServiceOutcome<Quote>> {
        if quote.status.is_editable() && quote.is_past_validity(today) {
            let metadata = json!({ "valid_until": quote.valid_until });
            return self.transition(quote, QuoteStatus::Expired, metadata).await;
        }
        debug!(quote = %quote.number, "Quote not due for expiration");
        Ok(ServiceOutcome::new(quote))
    }

    async fn follow_up_state(&self, quote: &Quote) -> ServiceResult<FollowUpState> {
        let quote_id = quote_id_of(quote)?;
        let follow_ups = self.follow_up_repo.list_by_quote_id(quote_id).await?;
        let displayed = select_display_follow_up(&follow_ups).cloned();
        Ok(FollowUpState {
            quote_id,
            status: quote.status,
            follow_ups,
            displayed,
        })
    }

    #[instrument(skip(self))]
    async fn run_action(
        &self,
        user_id: &str,
        action: SchedulerAction,
        quote_id: ObjectId,
    ) -> ServiceResult<ServiceOutcome<FollowUpState>> {
        let quote = self.quote_repo.get_for_user(quote_id, user_id).await?;
        let mut outcome = ServiceOutcome::new(());
        let quote = match action {
            SchedulerAction::SyncQuoteStatus => outcome.absorb(self.sync_quote_status(quote).await?),
            SchedulerAction::MarkQuoteViewed => outcome.absorb(self.mark_quote_viewed(quote).await?),
            SchedulerAction::CleanupFinalizedQuote => {
                outcome.absorb(self.cleanup_finalized_quote(&quote).await?);
                quote
            }
            SchedulerAction::TestExpiration => {
                let today = Utc::now().date_naive();
                outcome.absorb(self.test_expiration(quote, today).await?)
            }
        };
        let state = self.follow_up_state(&quote).await?;
        Ok(outcome.map(|_| state))
    }

    #[instrument(skip(self))]
    async fn expire_due_quotes(&self, today: NaiveDate) -> ServiceResult<usize> {
        let candidates = self
            .quote_repo
            .list_by_statuses(&[QuoteStatus::Draft, QuoteStatus::Sent, QuoteStatus::Viewed])
            .await?;

        let mut expired = 0;
        for quote in candidates.into_iter().filter(|q| q.is_past_validity(today)) {
            let number = quote.number.clone();
            match self.test_expiration(quote, today).await {
                Ok(_) => expired += 1,
                Err(e) => warn!(quote = %number, error = %e, "Failed to expire quote"),
            }
        }
        if expired > 0 {
            info!(expired, "Expired quotes past their validity date");
        }
        Ok(expired)
    }

    #[instrument(skip(self))]
    async fn process_due_follow_ups(&self, now: DateTime<Utc>) -> ServiceResult<SchedulerRunReport> {
        let due: Vec<FollowUp> = self
            .follow_up_repo
            .list_active()
            .await?
            .into_iter()
            .filter(|f| f.is_due(now))
            .collect();

        let mut report = SchedulerRunReport::default();
        if due.is_empty() {
            debug!("No follow-up due");
            return Ok(report);
        }

        for follow_up in due {
            let id = follow_up.id;
            if let Err(e) = self.run_follow_up(follow_up, now, &mut report).await {
                warn!(follow_up_id = ?id, error = %e, "Error processing follow-up");
            }
        }
        Ok(report)
    }
}
