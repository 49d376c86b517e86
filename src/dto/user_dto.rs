use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::dto::SortOrder;
use crate::models::lead::{Country, Qualification};
use crate::models::user::{LanguageSkill, Role};
use crate::utils::validation::{validate_birth_year, PHONE_RE};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,

    #[validate(custom(function = validate_birth_year, message = "Invalid birth year"))]
    pub birth_year: Option<i32>,

    pub role: Option<Role>,
    pub qualification: Option<Qualification>,
    pub country: Option<Country>,

    #[validate(length(max = 1000, message = "Experience must not exceed 1000 characters"))]
    pub experience: Option<String>,

    pub skills: Option<Vec<String>>,
    pub expected_salary: Option<Decimal>,
    pub available_date: Option<chrono::NaiveDate>,
    pub preferred_location: Option<String>,
    pub language_skills: Option<Vec<LanguageSkill>>,
    pub lead_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,

    #[validate(custom(function = validate_birth_year, message = "Invalid birth year"))]
    pub birth_year: Option<i32>,

    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub qualification: Option<Qualification>,
    pub country: Option<Country>,

    #[validate(length(max = 1000, message = "Experience must not exceed 1000 characters"))]
    pub experience: Option<String>,

    pub skills: Option<Vec<String>>,
    pub expected_salary: Option<Decimal>,
    pub available_date: Option<chrono::NaiveDate>,
    pub preferred_location: Option<String>,
    pub language_skills: Option<Vec<LanguageSkill>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUserPasswordPayload {
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub converted_from_leads: i64,
    pub role_breakdown: Vec<RoleCount>,
}

#[derive(Debug, serde::Serialize)]
pub struct RoleCount {
    pub role: Role,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}
