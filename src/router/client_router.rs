use axum::{Router, routing::{get, post}, middleware};
use std::sync::Arc;

use crate::handler::client_handler::{
    create_client_handler,
    delete_client_handler,
    get_client_handler,
    list_clients_handler,
    update_client_handler,
};
use crate::middlewares::auth_middleware::{require_user, AuthState};
use crate::service::client_service::ClientService;

pub fn client_router(service: Arc<dyn ClientService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/clients", post(create_client_handler).get(list_clients_handler))
        .route(
            "/clients/{id}",
            get(get_client_handler).put(update_client_handler).delete(delete_client_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_user))
        .with_state(service)
}
