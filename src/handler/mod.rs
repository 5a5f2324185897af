pub mod client_handler;
pub mod company_handler;
pub mod draft_handler;
pub mod follow_up_handler;
pub mod health_handler;
pub mod quote_handler;
pub mod share_handler;
pub mod upload;

use axum::http::{header::USER_AGENT, HeaderMap};
use bson::oid::ObjectId;
use validator::Validate;

use crate::util::error::HandlerError;

pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw).map_err(|_| HandlerError::bad_request(format!("Invalid {} id: {}", what, raw)))
}

pub fn validated<T: Validate>(payload: T) -> Result<T, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    Ok(payload)
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
