use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::dto::SortOrder;
use crate::models::lead::{Country, LeadPriority, LeadSource, LeadStatus, Qualification};
use crate::utils::validation::{validate_birth_year, validate_not_blank, PHONE_RE};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[validate(
        length(min = 10, max = 15, message = "Phone number must be 10-15 characters"),
        regex(path = *PHONE_RE, message = "Invalid phone number")
    )]
    pub phone: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = validate_birth_year, message = "Invalid birth year"))]
    pub birth_year: Option<i32>,

    pub qualification: Qualification,
    pub country: Country,

    #[validate(length(max = 1000, message = "Message must not exceed 1000 characters"))]
    pub message: Option<String>,

    pub source: Option<LeadSource>,
    pub zalo_info: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,

    #[validate(
        length(min = 10, max = 15, message = "Phone number must be 10-15 characters"),
        regex(path = *PHONE_RE, message = "Invalid phone number")
    )]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(custom(function = validate_birth_year, message = "Invalid birth year"))]
    pub birth_year: Option<i32>,

    pub qualification: Option<Qualification>,
    pub country: Option<Country>,

    #[validate(length(max = 1000, message = "Message must not exceed 1000 characters"))]
    pub message: Option<String>,

    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddNotePayload {
    #[validate(custom(function = validate_not_blank, message = "Note content must not be empty"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    pub assigned_to: Option<Uuid>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCreatedData {
    pub lead_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub status: LeadStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertLeadData {
    pub user_id: Uuid,
    pub email: String,
    pub temp_password: String,
    pub lead_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total_leads: i64,
    pub recent_leads: i64,
    pub converted_leads: i64,
    pub status_breakdown: Vec<StatusCount>,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> CreateLeadPayload {
        CreateLeadPayload {
            name: "An Nguyen".into(),
            phone: "0912345678".into(),
            email: "an@test.com".into(),
            birth_year: Some(1995),
            qualification: Qualification::University,
            country: Country::Vietnam,
            message: None,
            source: None,
            zalo_info: None,
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(valid_payload().validate().is_ok());
    }

    #[test]
    fn short_name_rejected() {
        let mut p = valid_payload();
        p.name = "A".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn malformed_phone_rejected() {
        let mut p = valid_payload();
        p.phone = "09abc45678".into();
        assert!(p.validate().is_err());

        p.phone = "091234".into();
        assert!(p.validate().is_err(), "too short");
    }

    #[test]
    fn bad_email_rejected() {
        let mut p = valid_payload();
        p.email = "not-an-email".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn birth_year_out_of_range_rejected() {
        let mut p = valid_payload();
        p.birth_year = Some(1900);
        assert!(p.validate().is_err());
        p.birth_year = None;
        assert!(p.validate().is_ok(), "birth year is optional");
    }

    #[test]
    fn oversized_message_rejected() {
        let mut p = valid_payload();
        p.message = Some("x".repeat(1001));
        assert!(p.validate().is_err());
        p.message = Some("x".repeat(1000));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn whitespace_note_rejected() {
        let note = AddNotePayload {
            content: "   ".into(),
        };
        assert!(note.validate().is_err());
    }
}
