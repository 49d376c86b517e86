use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Unqualified,
    Converted,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Unqualified => "unqualified",
            LeadStatus::Converted => "converted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "lead_source", rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Zalo,
    Facebook,
    Referral,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "lead_priority", rename_all = "snake_case")]
pub enum LeadPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "qualification", rename_all = "snake_case")]
pub enum Qualification {
    HighSchool,
    College,
    University,
    Postgraduate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "country", rename_all = "snake_case")]
pub enum Country {
    Vietnam,
    Germany,
    Japan,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub birth_year: Option<i32>,
    pub qualification: Qualification,
    pub country: Country,
    pub message: Option<String>,
    pub zalo_info: Option<JsonValue>,
    pub status: LeadStatus,
    pub priority: LeadPriority,
    pub assigned_to: Option<Uuid>,
    pub converted_to_user: Option<Uuid>,
    pub converted_at: Option<DateTime<Utc>>,
    pub source: LeadSource,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only annotation on a lead. Rows are only ever inserted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadNote {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub content: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
