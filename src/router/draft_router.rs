use axum::{Router, routing::get, middleware};
use std::sync::Arc;

use crate::handler::draft_handler::{clear_draft_handler, get_draft_handler, save_draft_handler};
use crate::middlewares::auth_middleware::{require_user, AuthState};
use crate::service::draft_service::DraftService;

pub fn draft_router(service: Arc<dyn DraftService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route(
            "/drafts/{key}",
            get(get_draft_handler).put(save_draft_handler).delete(clear_draft_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_user))
        .with_state(service)
}
