use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use crate::dto::share_dto::{AcceptQuoteRequest, CreateShareRequest, RejectQuoteRequest};
use crate::handler::upload::read_upload;
use crate::handler::{parse_object_id, user_agent, validated};
use crate::service::share_service::ShareService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

// Issuer side

pub async fn create_share_handler(
    State(service): State<Arc<dyn ShareService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<CreateShareRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    let payload = validated(payload)?;
    let share = service.create_share(&claims.sub, id, payload.view_only).await?;
    Ok((StatusCode::CREATED, Json(share)))
}

pub async fn list_shares_handler(
    State(service): State<Arc<dyn ShareService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.list_shares(&claims.sub, id).await?))
}

pub async fn revoke_share_handler(
    State(service): State<Arc<dyn ShareService>>,
    Extension(claims): Extension<Claims>,
    Path((id, share_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    let share_id = parse_object_id(&share_id, "share")?;
    service.revoke_share(&claims.sub, id, share_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_access_logs_handler(
    State(service): State<Arc<dyn ShareService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.list_access_logs(&claims.sub, id).await?))
}

// Client side, no session: the token is the credential

pub async fn view_share_handler(
    State(service): State<Arc<dyn ShareService>>,
    Path((token,)): Path<(String,)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.view(&token, user_agent(&headers)).await?))
}

pub async fn accept_share_handler(
    State(service): State<Arc<dyn ShareService>>,
    Path((token,)): Path<(String,)>,
    headers: HeaderMap,
    Json(payload): Json<AcceptQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = validated(payload)?;
    Ok(Json(service.accept(&token, user_agent(&headers), payload).await?))
}

pub async fn reject_share_handler(
    State(service): State<Arc<dyn ShareService>>,
    Path((token,)): Path<(String,)>,
    headers: HeaderMap,
    Json(payload): Json<RejectQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = validated(payload)?;
    Ok(Json(service.reject(&token, user_agent(&headers), payload).await?))
}

/// Multipart: `file` holds the signature image, `signer_name` the signer
pub async fn sign_share_handler(
    State(service): State<Arc<dyn ShareService>>,
    Path((token,)): Path<(String,)>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut form = read_upload(multipart).await?;
    let signer_name = form
        .text("signer_name")
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerError::bad_request("Missing field 'signer_name'"))?;
    let file = form.require_file()?;
    Ok(Json(service.sign(&token, user_agent(&headers), signer_name, file).await?))
}

pub async fn share_logo_handler(
    State(service): State<Arc<dyn ShareService>>,
    Path((token,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let (data, content_type) = service.company_logo(&token).await?;
    Ok(([(CONTENT_TYPE, content_type)], data))
}
