use crate::dto::lead_dto::{LeadListQuery, LeadStats, StatusCount, UpdateLeadPayload};
use crate::dto::{Pagination, SortOrder};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::lead::{Lead, LeadNote, LeadSource, LeadStatus};
use crate::models::user::User;
use crate::utils::crypto::hash_password;
use crate::utils::token::generate_temp_password;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

/// Request-scoped origin metadata the handlers stamp onto a submission.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    pub source: LeadSource,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub birth_year: Option<i32>,
    pub qualification: crate::models::lead::Qualification,
    pub country: crate::models::lead::Country,
    pub message: Option<String>,
    pub zalo_info: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct LeadService {
    pool: PgPool,
}

impl LeadService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Advisory duplicate lookup by phone OR email. The unique indexes are
    /// the real guard; this exists to answer with the existing lead instead
    /// of a bare constraint error.
    async fn find_existing(&self, phone: &str, email: &str) -> Result<Option<(Uuid, LeadStatus)>> {
        let row: Option<(Uuid, LeadStatus)> =
            sqlx::query_as("SELECT id, status FROM leads WHERE phone = $1 OR email = $2")
                .bind(phone)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn create(&self, input: NewLead, ctx: SubmissionContext) -> Result<Lead> {
        let name = input.name.trim().to_string();
        let phone = input.phone.trim().to_string();
        let email = input.email.trim().to_lowercase();
        let message = input.message.map(|m| m.trim().to_string());

        if let Some((lead_id, status)) = self.find_existing(&phone, &email).await? {
            return Err(Error::DuplicateLead { lead_id, status });
        }

        let insert = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads
                (name, phone, email, birth_year, qualification, country, message,
                 zalo_info, source, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&phone)
        .bind(&email)
        .bind(input.birth_year)
        .bind(input.qualification)
        .bind(input.country)
        .bind(&message)
        .bind(&input.zalo_info)
        .bind(ctx.source)
        .bind(&ctx.ip_address)
        .bind(&ctx.user_agent)
        .fetch_one(&self.pool)
        .await;

        match insert {
            Ok(lead) => Ok(lead),
            // A concurrent submission can slip past the advisory check; the
            // unique index catches it and we answer the same way.
            Err(err) if is_unique_violation(&err) => {
                match self.find_existing(&phone, &email).await? {
                    Some((lead_id, status)) => Err(Error::DuplicateLead { lead_id, status }),
                    None => Err(Error::Duplicate(
                        "Lead already exists with this phone number or email".to_string(),
                    )),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list(&self, query: &LeadListQuery) -> Result<(Vec<Lead>, Pagination)> {
        // Upper bound keeps (page - 1) * limit well inside i64.
        let page = query.page.unwrap_or(1).clamp(1, 1_000_000);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);

        let mut filters = QueryBuilder::new("SELECT * FROM leads WHERE 1=1");
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM leads WHERE 1=1");
        for builder in [&mut filters, &mut count] {
            if let Some(status) = query.status {
                builder.push(" AND status = ").push_bind(status);
            }
            if let Some(priority) = query.priority {
                builder.push(" AND priority = ").push_bind(priority);
            }
            if let Some(assigned_to) = query.assigned_to {
                builder.push(" AND assigned_to = ").push_bind(assigned_to);
            }
            if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = format!("%{}%", search.trim());
                builder
                    .push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR phone ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR email ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        // Sort column is whitelisted, never interpolated from raw input.
        let sort_by = match query.sort_by.as_deref() {
            Some("name") => "name",
            Some("status") => "status",
            Some("priority") => "priority",
            Some("updated_at") => "updated_at",
            _ => "created_at",
        };
        let sort_order = match query.sort_order {
            Some(SortOrder::Asc) => "ASC",
            _ => "DESC",
        };
        filters.push(format!(" ORDER BY {} {}", sort_by, sort_order));
        filters
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind((page - 1) * limit);

        let leads = filters
            .build_query_as::<Lead>()
            .fetch_all(&self.pool)
            .await?;
        Ok((leads, Pagination::new(page, limit, total)))
    }

    pub async fn get(&self, id: Uuid) -> Result<Lead> {
        sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Lead not found".to_string()))
    }

    pub async fn update(&self, id: Uuid, patch: UpdateLeadPayload) -> Result<Lead> {
        // Existence check first so a missing id is a 404, not a silent no-op.
        let existing = self.get(id).await?;

        // Conversion is permanent and only happens through convert_to_user: a
        // patch can neither mark a lead converted nor move one back out.
        if existing.converted_to_user.is_some() {
            if patch.status.is_some_and(|s| s != LeadStatus::Converted) {
                return Err(Error::BadRequest(
                    "A converted lead cannot change status".to_string(),
                ));
            }
        } else if patch.status == Some(LeadStatus::Converted) {
            return Err(Error::BadRequest(
                "Leads are converted through the conversion endpoint, not a status update"
                    .to_string(),
            ));
        }

        let name = patch.name.map(|v| v.trim().to_string());
        let phone = patch.phone.map(|v| v.trim().to_string());
        let email = patch.email.map(|v| v.trim().to_lowercase());
        let message = patch.message.map(|v| v.trim().to_string());

        let updated = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                birth_year = COALESCE($5, birth_year),
                qualification = COALESCE($6, qualification),
                country = COALESCE($7, country),
                message = COALESCE($8, message),
                status = COALESCE($9, status),
                priority = COALESCE($10, priority),
                assigned_to = COALESCE($11, assigned_to),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(patch.birth_year)
        .bind(patch.qualification)
        .bind(patch.country)
        .bind(message)
        .bind(patch.status)
        .bind(patch.priority)
        .bind(patch.assigned_to)
        .fetch_one(&self.pool)
        .await;

        match updated {
            Ok(lead) => Ok(lead),
            Err(err) if is_unique_violation(&err) => Err(Error::Duplicate(
                "Another lead already uses this phone number or email".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Lead not found".to_string()));
        }
        Ok(())
    }

    pub async fn add_note(&self, lead_id: Uuid, content: &str, author: Uuid) -> Result<LeadNote> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::BadRequest(
                "Note content must not be empty".to_string(),
            ));
        }
        self.get(lead_id).await?;

        let note = sqlx::query_as::<_, LeadNote>(
            r#"
            INSERT INTO lead_notes (lead_id, content, created_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .bind(content)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    pub async fn list_notes(&self, lead_id: Uuid) -> Result<Vec<LeadNote>> {
        let notes = sqlx::query_as::<_, LeadNote>(
            "SELECT * FROM lead_notes WHERE lead_id = $1 ORDER BY created_at",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    /// One-way conversion into a candidate account. The status flip is a
    /// conditional update so two racing requests produce exactly one user:
    /// the loser sees zero claimed rows and fails with AlreadyConverted.
    pub async fn convert_to_user(&self, lead_id: Uuid) -> Result<(User, String)> {
        // Fast path for the common non-race case, and for the 404.
        let lead = self.get(lead_id).await?;
        if lead.converted_to_user.is_some() {
            return Err(Error::AlreadyConverted);
        }

        let temp_password = generate_temp_password();
        let password_hash = hash_password(&temp_password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET status = 'converted', converted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND converted_to_user IS NULL
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(lead) = claimed else {
            return Err(Error::AlreadyConverted);
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (name, email, password_hash, phone, birth_year, role,
                 qualification, country, lead_id)
            VALUES ($1, $2, $3, $4, $5, 'candidate', $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&password_hash)
        .bind(&lead.phone)
        .bind(lead.birth_year)
        .bind(lead.qualification)
        .bind(lead.country)
        .bind(lead_id)
        .fetch_one(&mut *tx)
        .await;

        let user = match user {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::Duplicate(
                    "A user already exists with this lead's email".to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        sqlx::query("UPDATE leads SET converted_to_user = $2 WHERE id = $1")
            .bind(lead_id)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((user, temp_password))
    }

    pub async fn stats(&self) -> Result<LeadStats> {
        let rows: Vec<(LeadStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM leads GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let status_breakdown = rows
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();

        let total_leads: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await?;
        let recent_leads: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM leads WHERE created_at > NOW() - INTERVAL '7 days'",
        )
        .fetch_one(&self.pool)
        .await?;
        let converted_leads: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE status = 'converted'")
                .fetch_one(&self.pool)
                .await?;

        Ok(LeadStats {
            total_leads,
            recent_leads,
            converted_leads,
            status_breakdown,
        })
    }
}
