use axum::{Router, routing::{get, post, put, delete}, middleware};
use std::sync::Arc;

use crate::handler::quote_handler::{
    bulk_action_handler,
    create_quote_handler,
    delete_file_handler,
    delete_quote_handler,
    duplicate_quote_handler,
    get_financial_config_handler,
    get_quote_handler,
    list_events_handler,
    list_files_handler,
    list_quotes_handler,
    mark_as_sent_handler,
    quote_stats_handler,
    send_quote_handler,
    sign_as_company_handler,
    update_financial_config_handler,
    update_quote_handler,
    update_quote_status_handler,
    upload_file_handler,
};
use crate::middlewares::auth_middleware::{require_user, AuthState};
use crate::service::quote_service::QuoteService;

pub fn quote_router(service: Arc<dyn QuoteService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/quotes", post(create_quote_handler).get(list_quotes_handler))
        .route("/quotes/stats", get(quote_stats_handler))
        .route("/quotes/bulk", post(bulk_action_handler))
        .route(
            "/quotes/{id}",
            get(get_quote_handler).put(update_quote_handler).delete(delete_quote_handler),
        )
        .route("/quotes/{id}/duplicate", post(duplicate_quote_handler))
        .route("/quotes/{id}/status", put(update_quote_status_handler))
        .route("/quotes/{id}/send", post(send_quote_handler))
        .route("/quotes/{id}/mark-sent", post(mark_as_sent_handler))
        .route("/quotes/{id}/events", get(list_events_handler))
        .route(
            "/quotes/{id}/financial-config",
            get(get_financial_config_handler).put(update_financial_config_handler),
        )
        .route("/quotes/{id}/files", post(upload_file_handler).get(list_files_handler))
        .route("/quotes/{id}/files/{file_id}", delete(delete_file_handler))
        .route("/quotes/{id}/signatures/company", post(sign_as_company_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_user))
        .with_state(service)
}
