use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::dto::draft_dto::SaveDraftRequest;
use crate::service::draft_service::DraftService;
use crate::util::error::{HandlerError, ServiceError};
use crate::util::jwt::Claims;

pub async fn get_draft_handler(
    State(service): State<Arc<dyn DraftService>>,
    Extension(claims): Extension<Claims>,
    Path((key,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_draft(&claims.sub, &key).await?))
}

pub async fn save_draft_handler(
    State(service): State<Arc<dyn DraftService>>,
    Extension(claims): Extension<Claims>,
    Path((key,)): Path<(String,)>,
    Json(payload): Json<SaveDraftRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.save_draft(&claims.sub, &key, payload.payload).await?))
}

pub async fn clear_draft_handler(
    State(service): State<Arc<dyn DraftService>>,
    Extension(claims): Extension<Claims>,
    Path((key,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    if service.clear_draft(&claims.sub, &key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServiceError::NotFound(format!("No draft saved under {}", key)).into())
    }
}
