mod common;

use chrono::{Datelike, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use artisan_quote_backend::dto::follow_up_dto::SchedulerAction;
use artisan_quote_backend::dto::quote_dto::{
    BulkAction, BulkActionRequest, CreateQuoteRequest, File, QuoteListQuery, SendQuoteRequest,
};
use artisan_quote_backend::dto::share_dto::AcceptQuoteRequest;
use artisan_quote_backend::model::company_profile::CompanyAsset;
use artisan_quote_backend::model::financial_config::FinancialSettings;
use artisan_quote_backend::model::follow_up::FollowUpStatus;
use artisan_quote_backend::model::quote::Quote;
use artisan_quote_backend::model::quote_event::QuoteEventType;
use artisan_quote_backend::model::quote_status::QuoteStatus;
use artisan_quote_backend::service::scheduler::FollowUpScheduler;
use artisan_quote_backend::util::error::ServiceError;

use common::{TestContext, OTHER_USER, USER};

fn kitchen_request(client_id: Option<String>) -> CreateQuoteRequest {
    serde_json::from_value(json!({
        "title": "Kitchen renovation",
        "client_id": client_id,
        "tasks": [{
            "description": "Wall tiling",
            "quantity": "1",
            "unit_price": "100",
            "pricing_type": "flat",
            "materials": [{ "name": "Grout", "quantity": "10", "unit_price": "2" }]
        }]
    }))
    .unwrap()
}

async fn create_quote(ctx: &TestContext, client_id: Option<String>) -> Quote {
    ctx.services
        .quotes
        .create_quote(USER, kitchen_request(client_id))
        .await
        .unwrap()
        .data
}

/// Company, client with an email address and a quote already sent to them
async fn sent_quote(ctx: &TestContext) -> Quote {
    ctx.seed_company(USER).await;
    let client = ctx.seed_client(USER, Some("marie@example.com")).await;
    let quote = create_quote(ctx, client.id.map(|id| id.to_hex())).await;
    ctx.services
        .quotes
        .send_quote(USER, quote.id.unwrap(), SendQuoteRequest::default())
        .await
        .unwrap()
        .data
}

fn make_all_follow_ups_due(ctx: &TestContext) {
    let past = Utc::now() - Duration::minutes(1);
    for follow_up in ctx.follow_ups.items.lock().unwrap().iter_mut() {
        follow_up.scheduled_at = past;
    }
}

#[tokio::test]
async fn test_create_quote_numbers_and_totals() {
    let ctx = TestContext::new();
    let first = create_quote(&ctx, None).await;
    let second = create_quote(&ctx, None).await;

    let year = Utc::now().year();
    assert_eq!(first.number, format!("DEV-{}-0001", year));
    assert_eq!(second.number, format!("DEV-{}-0002", year));
    assert_eq!(first.status, QuoteStatus::Draft);
    assert_eq!(first.totals.total_before_vat, Decimal::new(120, 0));
    assert_eq!(first.totals.total_with_vat, Decimal::new(120, 0));
    assert_eq!(first.valid_until, Some(Utc::now().date_naive() + Duration::days(30)));
    assert_eq!(ctx.events.count(first.id.unwrap(), QuoteEventType::Created), 1);
}

#[tokio::test]
async fn test_unknown_client_is_rejected() {
    let ctx = TestContext::new();
    let foreign = ctx.seed_client(OTHER_USER, Some("someone@example.com")).await;
    let err = ctx
        .services
        .quotes
        .create_quote(USER, kitchen_request(foreign.id.map(|id| id.to_hex())))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_) | ServiceError::InvalidInput(_)));
    assert!(ctx.quotes.all().is_empty());
}

#[tokio::test]
async fn test_financial_config_recomputes_stored_totals() {
    let ctx = TestContext::new();
    let quote = create_quote(&ctx, None).await;
    let id = quote.id.unwrap();

    let settings: FinancialSettings = serde_json::from_value(json!({
        "vat": { "enabled": true, "rate": "21" },
        "deposit": { "enabled": true, "mode": "fixed", "value": "30" },
        "default_conditions": "Payment within 30 days"
    }))
    .unwrap();

    let response = ctx
        .services
        .quotes
        .update_financial_config(USER, id, settings)
        .await
        .unwrap()
        .data;
    assert_eq!(response.totals.vat_amount, Decimal::new(252, 1));
    assert_eq!(response.totals.total_with_vat, Decimal::new(1452, 1));
    assert_eq!(response.totals.deposit_amount, Decimal::new(30, 0));
    assert_eq!(response.totals.balance_amount, Decimal::new(1152, 1));

    let stored = ctx.quote(id);
    assert_eq!(stored.totals, response.totals);
    assert_eq!(stored.conditions.as_deref(), Some("Payment within 30 days"));
}

#[tokio::test]
async fn test_invalid_financial_config_is_rejected() {
    let ctx = TestContext::new();
    let quote = create_quote(&ctx, None).await;
    let settings: FinancialSettings = serde_json::from_value(json!({
        "vat": { "enabled": true, "rate": "150" }
    }))
    .unwrap();

    let err = ctx
        .services
        .quotes
        .update_financial_config(USER, quote.id.unwrap(), settings)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn test_send_quote_shares_emails_and_schedules_first_follow_up() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();

    assert_eq!(quote.status, QuoteStatus::Sent);
    let sent_at = quote.sent_at.unwrap();

    let deliveries = ctx.emails.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, "marie@example.com");
    assert!(deliveries[0].1.starts_with(&format!("Quote {}", quote.number)));

    let share = ctx.share_of(id, false);
    assert!(!share.revoked);

    let follow_ups = ctx.follow_ups.of_quote(id);
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].stage, 1);
    assert_eq!(follow_ups[0].status, FollowUpStatus::Pending);
    assert_eq!(follow_ups[0].scheduled_at, sent_at + Duration::hours(72));
    assert_eq!(ctx.events.count(id, QuoteEventType::EmailSent), 1);
}

#[tokio::test]
async fn test_resending_does_not_duplicate_side_effects() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();

    let again = ctx
        .services
        .quotes
        .send_quote(USER, id, SendQuoteRequest::default())
        .await
        .unwrap()
        .data;

    assert_eq!(again.status, QuoteStatus::Sent);
    assert_eq!(ctx.emails.deliveries().len(), 2);
    assert_eq!(ctx.events.count(id, QuoteEventType::EmailSent), 1);
    assert_eq!(ctx.follow_ups.of_quote(id).len(), 1);
    assert_eq!(ctx.shares.items.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_send_without_recipient_is_invalid() {
    let ctx = TestContext::new();
    let quote = create_quote(&ctx, None).await;
    let err = ctx
        .services
        .quotes
        .send_quote(USER, quote.id.unwrap(), SendQuoteRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert_eq!(ctx.quote(quote.id.unwrap()).status, QuoteStatus::Draft);
}

#[tokio::test]
async fn test_email_failure_does_not_fail_sending() {
    let ctx = TestContext::new();
    ctx.emails.set_failing(true);
    let quote = sent_quote(&ctx).await;
    assert_eq!(quote.status, QuoteStatus::Sent);
    assert!(ctx.emails.deliveries().is_empty());
    assert_eq!(ctx.follow_ups.of_quote(quote.id.unwrap()).len(), 1);
}

#[tokio::test]
async fn test_invalid_transition_is_a_conflict() {
    let ctx = TestContext::new();
    let quote = create_quote(&ctx, None).await;
    let err = ctx
        .services
        .quotes
        .change_status(USER, quote.id.unwrap(), QuoteStatus::Viewed)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_client_acceptance_stops_follow_ups_and_notifies_issuer() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();
    let token = ctx.share_of(id, false).token;

    ctx.services
        .shares
        .accept(&token, None, AcceptQuoteRequest::default())
        .await
        .unwrap();

    let accepted = ctx.quote(id);
    assert_eq!(accepted.status, QuoteStatus::Accepted);
    assert!(accepted.accepted_at.is_some());
    assert!(ctx
        .follow_ups
        .of_quote(id)
        .iter()
        .all(|f| f.status == FollowUpStatus::Stopped));
    assert!(ctx
        .emails
        .deliveries()
        .iter()
        .any(|(to, subject)| to == "atelier@example.com" && subject.ends_with("was accepted")));
    assert_eq!(ctx.events.count(id, QuoteEventType::Accepted), 1);
}

#[tokio::test]
async fn test_issuer_cannot_answer_or_expire_a_quote() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();
    let emails_before = ctx.emails.deliveries().len();

    for status in [QuoteStatus::Accepted, QuoteStatus::Rejected, QuoteStatus::Expired] {
        let err = ctx
            .services
            .quotes
            .change_status(USER, id, status)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)), "{}", status);
    }

    assert_eq!(ctx.quote(id).status, QuoteStatus::Sent);
    assert_eq!(ctx.follow_ups.of_quote(id)[0].status, FollowUpStatus::Pending);
    assert_eq!(ctx.emails.deliveries().len(), emails_before);

    let converted = ctx
        .services
        .quotes
        .change_status(USER, id, QuoteStatus::ConvertedToInvoice)
        .await
        .unwrap()
        .data;
    assert_eq!(converted.status, QuoteStatus::ConvertedToInvoice);
    assert!(converted.converted_at.is_some());
}

#[tokio::test]
async fn test_overflowing_quantity_is_invalid_input() {
    let ctx = TestContext::new();
    let request: CreateQuoteRequest = serde_json::from_value(json!({
        "title": "Huge order",
        "tasks": [{
            "description": "Bricks",
            "quantity": "79228162514264337593543950335",
            "unit_price": "10"
        }]
    }))
    .unwrap();

    let err = ctx.services.quotes.create_quote(USER, request).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert!(ctx.quotes.all().is_empty());
}

#[tokio::test]
async fn test_deleted_quote_numbers_are_not_reused() {
    let ctx = TestContext::new();
    let first = create_quote(&ctx, None).await;
    let second = create_quote(&ctx, None).await;
    ctx.services
        .quotes
        .delete_quote(USER, first.id.unwrap())
        .await
        .unwrap();

    let third = create_quote(&ctx, None).await;
    assert_ne!(third.number, second.number);
    assert_eq!(third.number, format!("DEV-{}-0003", Utc::now().year()));

    // Each artisan has a sequence of their own
    let other = ctx
        .services
        .quotes
        .create_quote(OTHER_USER, kitchen_request(None))
        .await
        .unwrap()
        .data;
    assert_eq!(other.number, format!("DEV-{}-0001", Utc::now().year()));
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let ctx = TestContext::new();
    let sent = sent_quote(&ctx).await;
    create_quote(&ctx, None).await;
    let mut roof = kitchen_request(None);
    roof.title = "Roof repair".to_string();
    ctx.services.quotes.create_quote(USER, roof).await.unwrap();
    create_quote(&ctx, None).await;
    ctx.services
        .quotes
        .create_quote(OTHER_USER, kitchen_request(None))
        .await
        .unwrap();

    let list = |query: QuoteListQuery| {
        let quotes = ctx.services.quotes.clone();
        async move { quotes.list_quotes(USER, query).await.unwrap() }
    };

    let all = list(QuoteListQuery::default()).await;
    assert_eq!(all.total, 4);

    let sent_only = list(QuoteListQuery {
        status: Some("sent".to_string()),
        ..Default::default()
    })
    .await;
    assert_eq!(sent_only.total, 1);
    assert_eq!(sent_only.items[0].id, sent.id);

    let by_client = list(QuoteListQuery {
        client_id: sent.client_id.map(|id| id.to_hex()),
        ..Default::default()
    })
    .await;
    assert_eq!(by_client.total, 1);

    let search = list(QuoteListQuery {
        search: Some("ROOF".to_string()),
        ..Default::default()
    })
    .await;
    assert_eq!(search.total, 1);
    assert_eq!(search.items[0].title, "Roof repair");

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let future = list(QuoteListQuery {
        created_from: Some(tomorrow),
        ..Default::default()
    })
    .await;
    assert_eq!(future.total, 0);

    let second_page = list(QuoteListQuery {
        page: Some(2),
        limit: Some(3),
        ..Default::default()
    })
    .await;
    assert_eq!(second_page.total, 4);
    assert_eq!(second_page.items.len(), 1);

    let far_away = list(QuoteListQuery {
        page: Some(u32::MAX),
        limit: Some(100),
        ..Default::default()
    })
    .await;
    assert_eq!(far_away.total, 4);
    assert!(far_away.items.is_empty());

    let err = ctx
        .services
        .quotes
        .list_quotes(
            USER,
            QuoteListQuery {
                status: Some("archived".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn test_stats_count_statuses_and_amounts() {
    let ctx = TestContext::new();
    let accepted = sent_quote(&ctx).await;
    let token = ctx.share_of(accepted.id.unwrap(), false).token;
    ctx.services
        .shares
        .accept(&token, None, AcceptQuoteRequest::default())
        .await
        .unwrap();

    let pending = create_quote(&ctx, Some(accepted.client_id.unwrap().to_hex())).await;
    ctx.services
        .quotes
        .send_quote(USER, pending.id.unwrap(), SendQuoteRequest::default())
        .await
        .unwrap();
    create_quote(&ctx, None).await;

    let stats = ctx.services.quotes.quote_stats(USER).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_status["draft"], 1);
    assert_eq!(stats.by_status["sent"], 1);
    assert_eq!(stats.by_status["accepted"], 1);
    assert_eq!(stats.by_status["expired"], 0);
    assert_eq!(stats.accepted_amount, Decimal::new(120, 0));
    assert_eq!(stats.pending_amount, Decimal::new(120, 0));
}

#[tokio::test]
async fn test_duplicate_copies_content_as_new_draft() {
    let ctx = TestContext::new();
    let source = sent_quote(&ctx).await;
    let source_id = source.id.unwrap();
    let settings: FinancialSettings = serde_json::from_value(json!({
        "vat": { "enabled": true, "rate": "21" }
    }))
    .unwrap();
    ctx.services
        .quotes
        .update_financial_config(USER, source_id, settings)
        .await
        .unwrap();

    let copy = ctx
        .services
        .quotes
        .duplicate_quote(USER, source_id)
        .await
        .unwrap()
        .data;
    let copy_id = copy.id.unwrap();

    assert_ne!(copy_id, source_id);
    assert_ne!(copy.number, source.number);
    assert_eq!(copy.title, "Kitchen renovation (copy)");
    assert_eq!(copy.status, QuoteStatus::Draft);
    assert!(copy.sent_at.is_none());
    assert_eq!(copy.client_id, source.client_id);
    assert_eq!(copy.tasks, source.tasks);
    assert_eq!(copy.totals.total_with_vat, Decimal::new(1452, 1));

    let config = ctx
        .services
        .quotes
        .get_financial_config(USER, copy_id)
        .await
        .unwrap();
    assert!(config.settings.vat.enabled);
    assert!(ctx.follow_ups.of_quote(copy_id).is_empty());
    assert_eq!(ctx.quote(source_id).status, QuoteStatus::Sent);

    let err = ctx
        .services
        .quotes
        .duplicate_quote(OTHER_USER, source_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_sync_action_reschedules_missing_follow_ups() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();
    ctx.follow_ups.items.lock().unwrap().clear();

    let state = ctx
        .services
        .coordinator
        .run_action(USER, SchedulerAction::SyncQuoteStatus, id)
        .await
        .unwrap()
        .data;
    assert_eq!(state.status, QuoteStatus::Sent);
    assert_eq!(state.follow_ups.len(), 1);
    assert_eq!(state.displayed.unwrap().status, FollowUpStatus::Pending);
}

#[tokio::test]
async fn test_mark_viewed_action() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();

    let state = ctx
        .services
        .coordinator
        .run_action(USER, SchedulerAction::MarkQuoteViewed, id)
        .await
        .unwrap()
        .data;
    assert_eq!(state.status, QuoteStatus::Viewed);
    assert!(ctx.quote(id).viewed_at.is_some());

    let err = ctx
        .services
        .coordinator
        .run_action(OTHER_USER, SchedulerAction::MarkQuoteViewed, id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_cleanup_action_only_for_finalized_quotes() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();

    let err = ctx
        .services
        .coordinator
        .run_action(USER, SchedulerAction::CleanupFinalizedQuote, id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(ctx.follow_ups.of_quote(id).len(), 1);

    let token = ctx.share_of(id, false).token;
    ctx.services
        .shares
        .accept(&token, None, AcceptQuoteRequest::default())
        .await
        .unwrap();

    let state = ctx
        .services
        .coordinator
        .run_action(USER, SchedulerAction::CleanupFinalizedQuote, id)
        .await
        .unwrap()
        .data;
    assert_eq!(state.status, QuoteStatus::Accepted);
    assert!(state.follow_ups.is_empty());
    assert!(state.displayed.is_none());
}

#[tokio::test]
async fn test_expiration_action_expires_overdue_quote() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();

    let state = ctx
        .services
        .coordinator
        .run_action(USER, SchedulerAction::TestExpiration, id)
        .await
        .unwrap()
        .data;
    assert_eq!(state.status, QuoteStatus::Sent);

    for stored in ctx.quotes.items.lock().unwrap().iter_mut() {
        stored.valid_until = Some(Utc::now().date_naive() - Duration::days(1));
    }
    let state = ctx
        .services
        .coordinator
        .run_action(USER, SchedulerAction::TestExpiration, id)
        .await
        .unwrap()
        .data;
    assert_eq!(state.status, QuoteStatus::Expired);
    assert!(state.follow_ups.iter().all(|f| f.status == FollowUpStatus::Stopped));
    assert!(ctx.quote(id).expired_at.is_some());
}

#[tokio::test]
async fn test_replacing_company_asset_deletes_previous_object() {
    let ctx = TestContext::new();
    ctx.seed_company(USER).await;
    fn logo(bytes: &[u8]) -> File {
        File {
            filename: "logo.png".to_string(),
            content_type: "image/png".to_string(),
            content: bytes.to_vec(),
            size: bytes.len(),
        }
    }

    ctx.services
        .companies
        .upload_asset(USER, CompanyAsset::Logo, logo(b"first"))
        .await
        .unwrap();
    let first_path = ctx.companies.items.lock().unwrap()[0].logo_path.clone().unwrap();
    assert!(ctx.storage.contains("company-assets", &first_path));

    let outcome = ctx
        .services
        .companies
        .upload_asset(USER, CompanyAsset::Logo, logo(b"second"))
        .await
        .unwrap();
    let second_path = ctx.companies.items.lock().unwrap()[0].logo_path.clone().unwrap();

    assert_ne!(first_path, second_path);
    assert!(!ctx.storage.contains("company-assets", &first_path));
    assert!(ctx.storage.contains("company-assets", &second_path));
    assert_eq!(ctx.storage.count_in("company-assets"), 1);
    assert_eq!(outcome.data.logo_url.as_deref(), Some("/company-profile/assets/logo"));

    // The signature slot is independent of the logo
    ctx.services
        .companies
        .upload_asset(USER, CompanyAsset::Signature, logo(b"sig"))
        .await
        .unwrap();
    assert!(ctx.storage.contains("company-assets", &second_path));
    assert_eq!(ctx.storage.count_in("company-assets"), 2);
}

#[tokio::test]
async fn test_scheduler_expires_overdue_quotes() {
    let ctx = TestContext::new();
    ctx.seed_company(USER).await;
    let mut request = kitchen_request(None);
    request.valid_until = Some(Utc::now().date_naive() - Duration::days(1));
    let overdue = ctx.services.quotes.create_quote(USER, request).await.unwrap().data;
    let current = create_quote(&ctx, None).await;

    let scheduler = FollowUpScheduler::new(ctx.services.coordinator.clone(), &ctx.settings.follow_up);
    let report = scheduler.run_once().await.unwrap();

    assert_eq!(report.expired, 1);
    let expired = ctx.quote(overdue.id.unwrap());
    assert_eq!(expired.status, QuoteStatus::Expired);
    assert!(expired.expired_at.is_some());
    assert_eq!(ctx.quote(current.id.unwrap()).status, QuoteStatus::Draft);
    assert!(ctx
        .emails
        .deliveries()
        .iter()
        .any(|(_, subject)| subject.ends_with("has expired")));

    let report = scheduler.run_once().await.unwrap();
    assert_eq!(report.expired, 0);
}

#[tokio::test]
async fn test_due_follow_up_is_sent_and_next_stage_scheduled() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();
    make_all_follow_ups_due(&ctx);

    let scheduler = FollowUpScheduler::new(ctx.services.coordinator.clone(), &ctx.settings.follow_up);
    let report = scheduler.run_once().await.unwrap();
    assert_eq!(report.follow_ups_sent, 1);

    let mut follow_ups = ctx.follow_ups.of_quote(id);
    follow_ups.sort_by_key(|f| f.stage);
    assert_eq!(follow_ups.len(), 2);
    assert_eq!(follow_ups[0].status, FollowUpStatus::Sent);
    assert_eq!(follow_ups[0].attempts, 1);
    assert_eq!(follow_ups[1].stage, 2);
    assert_eq!(follow_ups[1].status, FollowUpStatus::Scheduled);
    assert!(follow_ups[1].scheduled_at > Utc::now() + Duration::hours(167));

    let reminder = ctx
        .emails
        .deliveries()
        .into_iter()
        .find(|(_, subject)| subject.starts_with("Reminder"))
        .unwrap();
    assert_eq!(reminder.0, "marie@example.com");
    assert_eq!(ctx.events.count(id, QuoteEventType::FollowUpSent), 1);
}

#[tokio::test]
async fn test_failing_follow_up_gives_up_after_max_attempts() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();
    ctx.emails.set_failing(true);

    let coordinator = ctx.services.coordinator.clone();
    for attempt in 1..=3u32 {
        make_all_follow_ups_due(&ctx);
        let report = coordinator.process_due_follow_ups(Utc::now()).await.unwrap();
        let follow_up = ctx.follow_ups.of_quote(id).remove(0);
        assert_eq!(follow_up.attempts, attempt);
        assert!(follow_up.last_error.is_some());
        if attempt < 3 {
            assert_eq!(follow_up.status, FollowUpStatus::Pending);
            assert!(follow_up.scheduled_at > Utc::now());
            assert_eq!(report.follow_ups_failed, 0);
        } else {
            assert_eq!(follow_up.status, FollowUpStatus::Failed);
            assert_eq!(report.follow_ups_failed, 1);
        }
    }

    make_all_follow_ups_due(&ctx);
    let report = coordinator.process_due_follow_ups(Utc::now()).await.unwrap();
    assert_eq!(report.follow_ups_failed + report.follow_ups_sent, 0);
}

#[tokio::test]
async fn test_follow_up_of_missing_quote_is_stopped() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();
    ctx.quotes.items.lock().unwrap().clear();
    make_all_follow_ups_due(&ctx);

    let report = ctx
        .services
        .coordinator
        .process_due_follow_ups(Utc::now())
        .await
        .unwrap();
    assert_eq!(report.follow_ups_stopped, 1);
    assert_eq!(ctx.follow_ups.of_quote(id)[0].status, FollowUpStatus::Stopped);
}

#[tokio::test]
async fn test_delete_quote_purges_files_and_follow_ups() {
    let ctx = TestContext::new();
    let quote = sent_quote(&ctx).await;
    let id = quote.id.unwrap();

    let uploaded = ctx
        .services
        .quotes
        .upload_file(
            USER,
            id,
            File {
                filename: "plan.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                content: b"%PDF-1.4".to_vec(),
                size: 8,
            },
        )
        .await
        .unwrap();
    assert!(ctx
        .storage
        .contains(&uploaded.file.bucket, &uploaded.file.file_path));

    ctx.services.quotes.delete_quote(USER, id).await.unwrap();

    assert!(ctx.quotes.all().is_empty());
    assert!(!ctx
        .storage
        .contains(&uploaded.file.bucket, &uploaded.file.file_path));
    assert!(ctx.files.items.lock().unwrap().is_empty());
    assert!(ctx.follow_ups.of_quote(id).is_empty());
    assert!(ctx.shares.items.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_quotes_of_other_users_are_not_found() {
    let ctx = TestContext::new();
    let quote = create_quote(&ctx, None).await;
    let err = ctx
        .services
        .quotes
        .get_quote(OTHER_USER, quote.id.unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_bulk_delete_reports_each_item() {
    let ctx = TestContext::new();
    let quote = create_quote(&ctx, None).await;
    let response = ctx
        .services
        .quotes
        .bulk_action(
            USER,
            BulkActionRequest {
                action: BulkAction::Delete,
                ids: vec![quote.id.unwrap().to_hex(), "not-an-id".to_string()],
            },
        )
        .await
        .unwrap();

    assert_eq!(response.succeeded, 1);
    assert_eq!(response.failed, 1);
    assert!(response.results[1].error.is_some());
    assert!(ctx.quotes.all().is_empty());
}
