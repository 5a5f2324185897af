use crate::model::company_profile::CompanyProfile;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompanyProfileRequest {
    #[validate(length(min = 1, max = 200, message = "company name is required"))]
    pub company_name: String,

    #[validate(email(message = "a valid company email is required"))]
    pub email: String,

    #[validate(length(max = 50))]
    pub legal_id: Option<String>,

    #[validate(length(max = 50))]
    pub vat_number: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,

    #[validate(length(max = 20))]
    pub postal_code: Option<String>,

    #[validate(length(max = 100))]
    pub city: Option<String>,

    #[validate(length(max = 100))]
    pub country: Option<String>,

    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,

    #[validate(url)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyProfileResponse {
    #[serde(flatten)]
    pub profile: CompanyProfile,
    /// Authenticated download endpoints, set once the asset exists
    pub logo_url: Option<String>,
    pub signature_url: Option<String>,
}

impl From<CompanyProfile> for CompanyProfileResponse {
    fn from(profile: CompanyProfile) -> Self {
        let logo_url = profile
            .logo_path
            .as_ref()
            .map(|_| "/company-profile/assets/logo".to_string());
        let signature_url = profile
            .signature_path
            .as_ref()
            .map(|_| "/company-profile/assets/signature".to_string());
        CompanyProfileResponse {
            profile,
            logo_url,
            signature_url,
        }
    }
}
