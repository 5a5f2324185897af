use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Extension, Json};
use tracing::info;

use crate::dto::follow_up_dto::SchedulerRequest;
use crate::handler::{parse_object_id, validated};
use crate::service::follow_up_service::FollowUpCoordinator;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn scheduler_action_handler(
    State(coordinator): State<Arc<dyn FollowUpCoordinator>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SchedulerRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = validated(payload)?;
    let quote_id = parse_object_id(&payload.quote_id, "quote")?;
    info!(action = %payload.action, %quote_id, "Scheduler action requested");
    let outcome = coordinator.run_action(&claims.sub, payload.action, quote_id).await?;
    Ok(Json(outcome))
}
