use axum::{Router, routing::{get, post}, middleware};
use std::sync::Arc;

use crate::handler::share_handler::{
    accept_share_handler,
    create_share_handler,
    list_access_logs_handler,
    list_shares_handler,
    reject_share_handler,
    revoke_share_handler,
    share_logo_handler,
    sign_share_handler,
    view_share_handler,
};
use crate::middlewares::auth_middleware::{require_user, AuthState};
use crate::service::share_service::ShareService;

pub fn share_router(service: Arc<dyn ShareService>, auth_state: Arc<AuthState>) -> Router {
    // Client routes, authenticated by the share token alone
    let public = Router::new()
        .route("/quote-share/{token}", get(view_share_handler))
        .route("/quote-share/{token}/accept", post(accept_share_handler))
        .route("/quote-share/{token}/reject", post(reject_share_handler))
        .route("/quote-share/{token}/sign", post(sign_share_handler))
        .route("/quote-share/{token}/logo", get(share_logo_handler));

    let owner = Router::new()
        .route("/quotes/{id}/shares", post(create_share_handler).get(list_shares_handler))
        .route("/quotes/{id}/shares/{share_id}/revoke", post(revoke_share_handler))
        .route("/quotes/{id}/access-logs", get(list_access_logs_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_user));

    public
        .merge(owner)
        .with_state(service)
}
