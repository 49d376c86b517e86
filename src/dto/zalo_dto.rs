use serde::Deserialize;
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::lead::{Country, Qualification};
use crate::utils::validation::validate_birth_year;

/// Raw payload handed over by the Mini App after social login. Shape is not
/// under our control, hence the untyped value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZaloUserInfoPayload {
    pub zalo_data: Option<JsonValue>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTokenPayload {
    pub token: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Lead submission from inside the Zalo webview. Unlike the website form the
/// phone may be absent here; the handler fills it in from `zalo_data` via the
/// extraction heuristic before the normal lead validation runs.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ZaloCreateLeadPayload {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    pub phone: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = validate_birth_year, message = "Invalid birth year"))]
    pub birth_year: Option<i32>,

    pub qualification: Qualification,
    pub country: Country,

    #[validate(length(max = 1000, message = "Message must not exceed 1000 characters"))]
    pub message: Option<String>,

    pub zalo_data: Option<JsonValue>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateQuery {
    pub user_agent: Option<String>,
    pub url: Option<String>,
}
