use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    Extension, Json,
};

use crate::dto::company_dto::CompanyProfileRequest;
use crate::handler::upload::read_upload;
use crate::handler::validated;
use crate::model::company_profile::CompanyAsset;
use crate::service::company_service::CompanyService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

fn parse_asset(raw: &str) -> Result<CompanyAsset, HandlerError> {
    CompanyAsset::from_str(raw).map_err(|_| HandlerError::bad_request(format!("Unknown company asset: {}", raw)))
}

pub async fn get_profile_handler(
    State(service): State<Arc<dyn CompanyService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_profile(&claims.sub).await?))
}

pub async fn upsert_profile_handler(
    State(service): State<Arc<dyn CompanyService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CompanyProfileRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = validated(payload)?;
    Ok(Json(service.upsert_profile(&claims.sub, payload).await?))
}

pub async fn upload_asset_handler(
    State(service): State<Arc<dyn CompanyService>>,
    Extension(claims): Extension<Claims>,
    Path((asset,)): Path<(String,)>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let asset = parse_asset(&asset)?;
    let file = read_upload(multipart).await?.require_file()?;
    Ok(Json(service.upload_asset(&claims.sub, asset, file).await?))
}

pub async fn download_asset_handler(
    State(service): State<Arc<dyn CompanyService>>,
    Extension(claims): Extension<Claims>,
    Path((asset,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let asset = parse_asset(&asset)?;
    let (data, content_type) = service.download_asset(&claims.sub, asset).await?;
    Ok(([(CONTENT_TYPE, content_type)], data))
}
