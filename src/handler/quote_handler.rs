use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;

use crate::dto::quote_dto::{
    BulkActionRequest, CreateQuoteRequest, QuoteListQuery, SendQuoteRequest, UpdateQuoteRequest,
    UpdateQuoteStatusRequest,
};
use crate::handler::upload::read_upload;
use crate::handler::{parse_object_id, validated};
use crate::model::financial_config::FinancialSettings;
use crate::service::quote_service::QuoteService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn create_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = validated(payload)?;
    let outcome = service.create_quote(&claims.sub, payload).await?;
    info!(number = %outcome.data.number, "Quote created");
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn list_quotes_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = service.list_quotes(&claims.sub, query).await?;
    Ok(Json(page))
}

pub async fn quote_stats_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.quote_stats(&claims.sub).await?))
}

pub async fn bulk_action_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BulkActionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = validated(payload)?;
    Ok(Json(service.bulk_action(&claims.sub, payload).await?))
}

pub async fn get_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.get_quote(&claims.sub, id).await?))
}

pub async fn update_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<UpdateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    let payload = validated(payload)?;
    Ok(Json(service.update_quote(&claims.sub, id, payload).await?))
}

pub async fn delete_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.delete_quote(&claims.sub, id).await?))
}

pub async fn duplicate_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    let outcome = service.duplicate_quote(&claims.sub, id).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn update_quote_status_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<UpdateQuoteStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.change_status(&claims.sub, id, payload.status).await?))
}

pub async fn send_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<SendQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    let payload = validated(payload)?;
    Ok(Json(service.send_quote(&claims.sub, id, payload).await?))
}

pub async fn mark_as_sent_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.mark_as_sent(&claims.sub, id).await?))
}

pub async fn list_events_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.list_events(&claims.sub, id).await?))
}

pub async fn get_financial_config_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.get_financial_config(&claims.sub, id).await?))
}

pub async fn update_financial_config_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(settings): Json<FinancialSettings>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.update_financial_config(&claims.sub, id, settings).await?))
}

pub async fn upload_file_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    let file = read_upload(multipart).await?.require_file()?;
    let stored = service.upload_file(&claims.sub, id, file).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn list_files_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    Ok(Json(service.list_files(&claims.sub, id).await?))
}

pub async fn delete_file_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id, file_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    let file_id = parse_object_id(&file_id, "file")?;
    Ok(Json(service.delete_file(&claims.sub, id, file_id).await?))
}

pub async fn sign_as_company_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "quote")?;
    let outcome = service.sign_as_company(&claims.sub, id).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
