use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::get_config;
use crate::dto::auth_dto::{RegisterPayload, UpdateProfilePayload};
use crate::error::{is_unique_violation, Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::{generate_reset_token, tokens_match};

/// Burned on login attempts against unknown emails so the response time does
/// not reveal whether the account exists.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("invalid-password-placeholder").unwrap_or_default());

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const RESET_TOKEN_TTL_MINUTES: i64 = 10;

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unknown email and wrong password produce the exact same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let email = email.trim().to_lowercase();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user) = user else {
            let _ = verify_password(password, &DUMMY_HASH);
            return Err(Error::unauthorized("INVALID_CREDENTIALS", INVALID_CREDENTIALS));
        };

        if !user.is_active {
            return Err(Error::unauthorized(
                "ACCOUNT_DISABLED",
                "Account has been disabled",
            ));
        }

        let ok = verify_password(password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?;
        if !ok {
            return Err(Error::unauthorized("INVALID_CREDENTIALS", INVALID_CREDENTIALS));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_login = NOW(), login_count = login_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        let token = self.issue_token(user.id)?;
        Ok((user, token))
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String> {
        let config = get_config();
        let exp = Utc::now() + Duration::days(config.jwt_expire_days);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("Token signing failed: {}", e)))
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        let email = payload.email.trim().to_lowercase();
        let password_hash = hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, COALESCE($4, 'candidate'))
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(payload.role)
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

    /// Self-service profile update. Role, activation and password have their
    /// own guarded paths and are not touchable from here.
    pub async fn update_profile(&self, user_id: Uuid, patch: UpdateProfilePayload) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                birth_year = COALESCE($4, birth_year),
                preferred_location = COALESCE($5, preferred_location),
                experience = COALESCE($6, experience),
                skills = COALESCE($7, skills),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(patch.name.map(|v| v.trim().to_string()))
        .bind(patch.phone)
        .bind(patch.birth_year)
        .bind(patch.preferred_location)
        .bind(patch.experience)
        .bind(patch.skills)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let ok = verify_password(current_password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?;
        if !ok {
            return Err(Error::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = hash_password(new_password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .bind(&password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Stores a single-use reset token with a 10-minute expiry. The return is
    /// Some(token) only when the email matched an account; the route answers
    /// identically either way and only echoes the token in development mode.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        let email = email.trim().to_lowercase();
        let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        let Some((user_id,)) = user else {
            return Ok(None);
        };

        let token = generate_reset_token();
        let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        sqlx::query(
            r#"
            UPDATE users
            SET reset_password_token = $2, reset_password_expires = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&token)
        .bind(expires)
        .execute(&self.pool)
        .await?;
        Ok(Some(token))
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE reset_password_token = $1 AND reset_password_expires > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        // The SQL equality already selected the row; re-check in constant
        // time before acting on it.
        let matched = user.filter(|u| {
            u.reset_password_token
                .as_deref()
                .is_some_and(|stored| tokens_match(stored, token))
        });
        let Some(user) = matched else {
            return Err(Error::BadRequest(
                "Reset token is invalid or has expired".to_string(),
            ));
        };

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
        .bind(user.id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
