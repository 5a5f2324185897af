use axum::{Router, routing::post, middleware};
use std::sync::Arc;

use crate::handler::follow_up_handler::scheduler_action_handler;
use crate::middlewares::auth_middleware::{require_user, AuthState};
use crate::service::follow_up_service::FollowUpCoordinator;

pub fn follow_up_router(coordinator: Arc<dyn FollowUpCoordinator>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/followups/scheduler", post(scheduler_action_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_user))
        .with_state(coordinator)
}
