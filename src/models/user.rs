use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::lead::{Country, Qualification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    Hr,
    Candidate,
}

impl Role {
    /// Capability check used by every role-gated handler. Empty `allowed`
    /// means any authenticated user.
    pub fn is_allowed(&self, allowed: &[Role]) -> bool {
        allowed.is_empty() || allowed.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Candidate => "candidate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSkill {
    pub language: String,
    pub level: LanguageLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageLevel {
    Beginner,
    Intermediate,
    Advanced,
    Native,
}

/// Password hash and reset-token material never leave the API: the fields are
/// skipped on every serialization path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub birth_year: Option<i32>,
    pub role: Role,
    pub is_active: bool,
    pub qualification: Option<Qualification>,
    pub country: Option<Country>,
    pub experience: Option<String>,
    pub skills: Option<Vec<String>>,
    pub expected_salary: Option<Decimal>,
    pub available_date: Option<NaiveDate>,
    pub preferred_location: Option<String>,
    pub language_skills: Option<JsonValue>,
    pub lead_id: Option<Uuid>,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub login_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_gate() {
        assert!(Role::Admin.is_allowed(&[Role::Admin]));
        assert!(Role::Admin.is_allowed(&[Role::Admin, Role::Hr]));
        assert!(Role::Admin.is_allowed(&[]));
    }

    #[test]
    fn candidate_blocked_from_staff_gates() {
        assert!(!Role::Candidate.is_allowed(&[Role::Admin, Role::Hr]));
        assert!(!Role::Candidate.is_allowed(&[Role::Admin]));
        assert!(Role::Candidate.is_allowed(&[]));
    }

    #[test]
    fn hr_passes_hr_gate_but_not_admin_gate() {
        assert!(Role::Hr.is_allowed(&[Role::Admin, Role::Hr]));
        assert!(!Role::Hr.is_allowed(&[Role::Admin]));
    }

    #[test]
    fn serialized_user_never_contains_password() {
        let user = User {
            id: Uuid::new_v4(),
            name: "An Nguyen".into(),
            email: "an@test.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            phone: Some("0912345678".into()),
            birth_year: Some(1995),
            role: Role::Candidate,
            is_active: true,
            qualification: Some(Qualification::University),
            country: Some(Country::Vietnam),
            experience: None,
            skills: Some(vec!["welding".into()]),
            expected_salary: None,
            available_date: None,
            preferred_location: None,
            language_skills: None,
            lead_id: None,
            reset_password_token: Some("token".into()),
            reset_password_expires: None,
            last_login: None,
            login_count: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("reset_password_token"));
        assert!(json.contains("an@test.com"));
    }
}
