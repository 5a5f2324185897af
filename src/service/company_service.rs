use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::config::{MinioConfig, QuoteConfig};
use crate::dto::company_dto::{CompanyProfileRequest, CompanyProfileResponse};
use crate::dto::quote_dto::File;
use crate::model::company_profile::{CompanyAsset, CompanyProfile};
use crate::repository::company_profile_repo::CompanyProfileRepository;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::minio::{guess_content_type, object_key, ObjectStorage};
use crate::util::outcome::{ServiceOutcome, SideEffect};

#[async_trait]
pub trait CompanyService: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> ServiceResult<CompanyProfileResponse>;
    async fn upsert_profile(&self, user_id: &str, req: CompanyProfileRequest) -> ServiceResult<CompanyProfileResponse>;
    /// Stores a logo or signature image, replacing the previous one
    async fn upload_asset(
        &self,
        user_id: &str,
        asset: CompanyAsset,
        file: File,
    ) -> ServiceResult<ServiceOutcome<CompanyProfileResponse>>;
    async fn download_asset(&self, user_id: &str, asset: CompanyAsset) -> ServiceResult<(Bytes, &'static str)>;
}

pub struct CompanyServiceImpl {
    pub repo: Arc<dyn CompanyProfileRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub minio_config: MinioConfig,
    pub quote_config: QuoteConfig,
}

impl CompanyServiceImpl {
    pub fn new(
        repo: Arc<dyn CompanyProfileRepository>,
        storage: Arc<dyn ObjectStorage>,
        minio_config: MinioConfig,
        quote_config: QuoteConfig,
    ) -> Self {
        CompanyServiceImpl {
            repo,
            storage,
            minio_config,
            quote_config,
        }
    }

    async fn existing(&self, user_id: &str) -> ServiceResult<CompanyProfile> {
        self.repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Company profile not found".to_string()))
    }
}

fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

#[async_trait]
impl CompanyService for CompanyServiceImpl {
    async fn get_profile(&self, user_id: &str) -> ServiceResult<CompanyProfileResponse> {
        Ok(self.existing(user_id).await?.into())
    }

    #[instrument(skip(self, req))]
    async fn upsert_profile(&self, user_id: &str, req: CompanyProfileRequest) -> ServiceResult<CompanyProfileResponse> {
        let now = Utc::now();
        let current = self.repo.find_by_user(user_id).await?;

        // Assets are managed through their own endpoint and survive a profile edit.
        let (id, created_at, logo_path, signature_path) = match current {
            Some(p) => (p.id, p.created_at, p.logo_path, p.signature_path),
            None => (None, now, None, None),
        };

        let profile = CompanyProfile {
            id,
            user_id: user_id.to_string(),
            company_name: req.company_name.trim().to_string(),
            legal_id: req.legal_id,
            vat_number: req.vat_number,
            address: req.address,
            postal_code: req.postal_code,
            city: req.city,
            country: req.country,
            email: req.email,
            phone: req.phone,
            website: req.website,
            logo_path,
            signature_path,
            created_at,
            updated_at: now,
        };
        let saved = self.repo.upsert(profile).await?;
        info!("Company profile updated");
        Ok(saved.into())
    }

    #[instrument(skip(self, file), fields(asset = %asset, size = file.size))]
    async fn upload_asset(
        &self,
        user_id: &str,
        asset: CompanyAsset,
        file: File,
    ) -> ServiceResult<ServiceOutcome<CompanyProfileResponse>> {
        if !is_image(&file.content_type) {
            return Err(ServiceError::InvalidInput(format!(
                "{} must be an image, got {}",
                asset, file.content_type
            )));
        }
        if file.size == 0 || file.size > self.quote_config.max_upload_bytes {
            return Err(ServiceError::InvalidInput(format!(
                "Image must be between 1 and {} bytes",
                self.quote_config.max_upload_bytes
            )));
        }

        let mut profile = self.existing(user_id).await?;
        let bucket = &self.minio_config.company_assets_bucket;
        let object_name = object_key(&format!("{}/{}", user_id, asset), &file.filename);
        self.storage
            .put_object(bucket, &object_name, file.content, Some(file.content_type.as_str()))
            .await?;

        let previous = profile.replace_asset(asset, object_name);
        profile.updated_at = Utc::now();
        let saved = self.repo.upsert(profile).await?;

        let mut outcome = ServiceOutcome::new(());
        if let Some(previous) = previous {
            let removed = self.storage.remove_object(bucket, &previous).await;
            if let Err(e) = &removed {
                warn!("Could not remove previous {}: {}", asset, e);
            }
            outcome.record(SideEffect::ObjectCleanup, removed);
        }
        info!("Company asset stored");
        Ok(outcome.map(|_| saved.into()))
    }

    async fn download_asset(&self, user_id: &str, asset: CompanyAsset) -> ServiceResult<(Bytes, &'static str)> {
        let profile = self.existing(user_id).await?;
        let path = profile
            .asset_path(asset)
            .ok_or_else(|| ServiceError::NotFound(format!("No {} uploaded", asset)))?;
        let data = self
            .storage
            .get_object(&self.minio_config.company_assets_bucket, path)
            .await?;
        Ok((data, guess_content_type(path)))
    }
}
