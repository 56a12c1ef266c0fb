use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterDeviceTokenRequest {
    #[validate(length(min = 1))]
    pub token: String,
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RemoveDeviceTokenRequest {
    #[validate(length(min = 1))]
    pub token: String,
}
