use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::dto::client_dto::ClientRequest;
use crate::handler::{parse_object_id, validated};
use crate::service::client_service::ClientService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn create_client_handler(
    State(service): State<Arc<dyn ClientService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ClientRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = validated(payload)?;
    let client = service.create_client(&claims.sub, payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list_clients_handler(
    State(service): State<Arc<dyn ClientService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_clients(&claims.sub).await?))
}

pub async fn get_client_handler(
    State(service): State<Arc<dyn ClientService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "client")?;
    Ok(Json(service.get_client(&claims.sub, id).await?))
}

pub async fn update_client_handler(
    State(service): State<Arc<dyn ClientService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<ClientRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "client")?;
    let payload = validated(payload)?;
    Ok(Json(service.update_client(&claims.sub, id, payload).await?))
}

pub async fn delete_client_handler(
    State(service): State<Arc<dyn ClientService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "client")?;
    service.delete_client(&claims.sub, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
