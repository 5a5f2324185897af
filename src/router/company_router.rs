use axum::{Router, routing::get, middleware};
use std::sync::Arc;

use crate::handler::company_handler::{
    download_asset_handler,
    get_profile_handler,
    upload_asset_handler,
    upsert_profile_handler,
};
use crate::middlewares::auth_middleware::{require_user, AuthState};
use crate::service::company_service::CompanyService;

pub fn company_router(service: Arc<dyn CompanyService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/company-profile", get(get_profile_handler).put(upsert_profile_handler))
        .route(
            "/company-profile/assets/{asset}",
            get(download_asset_handler).post(upload_asset_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_user))
        .with_state(service)
}
