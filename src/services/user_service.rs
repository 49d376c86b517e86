use crate::dto::user_dto::{
    CreateUserPayload, RoleCount, UpdateUserPayload, UserListQuery, UserStats,
};
use crate::dto::{Pagination, SortOrder};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::user::{Role, User};
use crate::utils::crypto::hash_password;
use crate::utils::token::generate_temp_password;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        let email = payload.email.trim().to_lowercase();
        let password_hash = hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;
        let language_skills = payload
            .language_skills
            .map(serde_json::to_value)
            .transpose()?;

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (name, email, password_hash, phone, birth_year, role,
                 qualification, country, experience, skills, expected_salary,
                 available_date, preferred_location, language_skills, lead_id)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'candidate'), $7, $8, $9,
                    $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(&payload.phone)
        .bind(payload.birth_year)
        .bind(payload.role)
        .bind(payload.qualification)
        .bind(payload.country)
        .bind(&payload.experience)
        .bind(&payload.skills)
        .bind(payload.expected_salary)
        .bind(payload.available_date)
        .bind(&payload.preferred_location)
        .bind(&language_skills)
        .bind(payload.lead_id)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(err) if is_unique_violation(&err) => Err(Error::Duplicate(
                "A user already exists with this email".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list(&self, query: &UserListQuery) -> Result<(Vec<User>, Pagination)> {
        // Upper bound keeps (page - 1) * limit well inside i64.
        let page = query.page.unwrap_or(1).clamp(1, 1_000_000);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);

        let mut filters = QueryBuilder::new("SELECT * FROM users WHERE 1=1");
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1=1");
        for builder in [&mut filters, &mut count] {
            if let Some(role) = query.role {
                builder.push(" AND role = ").push_bind(role);
            }
            if let Some(is_active) = query.is_active {
                builder.push(" AND is_active = ").push_bind(is_active);
            }
            if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = format!("%{}%", search.trim());
                builder
                    .push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR email ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let sort_by = match query.sort_by.as_deref() {
            Some("name") => "name",
            Some("email") => "email",
            Some("last_login") => "last_login",
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

        let users = filters
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;
        Ok((users, Pagination::new(page, limit, total)))
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Users whose originating lead is assigned to the given HR account.
    pub async fn list_by_hr(&self, hr_id: Uuid) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN leads l ON u.lead_id = l.id
            WHERE l.assigned_to = $1
            ORDER BY u.created_at DESC
            "#,
        )
        .bind(hr_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn update(&self, id: Uuid, patch: UpdateUserPayload) -> Result<User> {
        self.get(id).await?;

        let email = patch.email.map(|v| v.trim().to_lowercase());
        let language_skills = patch
            .language_skills
            .map(serde_json::to_value)
            .transpose()?;

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                birth_year = COALESCE($5, birth_year),
                role = COALESCE($6, role),
                is_active = COALESCE($7, is_active),
                qualification = COALESCE($8, qualification),
                country = COALESCE($9, country),
                experience = COALESCE($10, experience),
                skills = COALESCE($11, skills),
                expected_salary = COALESCE($12, expected_salary),
                available_date = COALESCE($13, available_date),
                preferred_location = COALESCE($14, preferred_location),
                language_skills = COALESCE($15, language_skills),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.map(|v| v.trim().to_string()))
        .bind(email)
        .bind(patch.phone)
        .bind(patch.birth_year)
        .bind(patch.role)
        .bind(patch.is_active)
        .bind(patch.qualification)
        .bind(patch.country)
        .bind(patch.experience)
        .bind(patch.skills)
        .bind(patch.expected_salary)
        .bind(patch.available_date)
        .bind(patch.preferred_location)
        .bind(language_skills)
        .fetch_one(&self.pool)
        .await;

        match updated {
            Ok(user) => Ok(user),
            Err(err) if is_unique_violation(&err) => Err(Error::Duplicate(
                "Another user already uses this email".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Hard delete. Admin accounts are never deleted; they are disabled via
    /// `is_active` instead, so the last admin cannot lock everyone out.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let target = self.get(id).await?;
        if target.role == Role::Admin {
            return Err(Error::BadRequest(
                "Admin accounts cannot be deleted, disable them instead".to_string(),
            ));
        }
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_password(&self, id: Uuid, new_password: &str) -> Result<()> {
        self.get(id).await?;
        let password_hash = hash_password(new_password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                reset_password_token = NULL,
                reset_password_expires = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Admin reset: replaces the password with a fresh random one and returns
    /// it once, for handing to the user out of band.
    pub async fn reset_password(&self, id: Uuid) -> Result<String> {
        let new_password = generate_temp_password();
        self.set_password(id, &new_password).await?;
        Ok(new_password)
    }

    pub async fn stats(&self) -> Result<UserStats> {
        let rows: Vec<(Role, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
                .fetch_all(&self.pool)
                .await?;
        let role_breakdown = rows
            .into_iter()
            .map(|(role, count)| RoleCount { role, count })
            .collect();

        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let active_users: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = true")
                .fetch_one(&self.pool)
                .await?;
        let converted_from_leads: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE lead_id IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(UserStats {
            total_users,
            active_users,
            converted_from_leads,
            role_breakdown,
        })
    }
}
