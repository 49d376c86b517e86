use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::models::user::{Role, User};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Bearer token from the Authorization header, with a cookie fallback for the
/// HR dashboard.
fn extract_token(req: &Request) -> Option<String> {
    if let Some(header) = req.headers().get(axum::http::header::AUTHORIZATION) {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    let cookies = req.headers().get(axum::http::header::COOKIE)?;
    let cookies = cookies.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|c| c.strip_prefix("token="))
        .map(|t| t.to_string())
}

/// Verifies the JWT, loads the account, and rejects disabled users. The full
/// user row is inserted as a request extension so handlers can gate on role
/// without another lookup.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&req) else {
        return Error::unauthorized("NO_TOKEN", "Authentication required, please log in")
            .into_response();
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = match decode::<Claims>(
        &token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(err) => {
            let (code, message) = match err.kind() {
                ErrorKind::ExpiredSignature => {
                    ("TOKEN_EXPIRED", "Token has expired, please log in again")
                }
                _ => ("INVALID_TOKEN", "Invalid token"),
            };
            return Error::unauthorized(code, message).into_response();
        }
    };

    let Ok(user_id) = claims.sub.parse::<Uuid>() else {
        return Error::unauthorized("INVALID_TOKEN", "Invalid token").into_response();
    };

    let user = match sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Error::unauthorized("USER_NOT_FOUND", "Invalid token, user does not exist")
                .into_response();
        }
        Err(err) => return Error::from(err).into_response(),
    };

    if !user.is_active {
        return Error::unauthorized("USER_INACTIVE", "Account has been disabled").into_response();
    }

    req.extensions_mut().insert(user);
    next.run(req).await
}

/// Role gate run after `require_auth`. 401 is decided before role is looked
/// at, so an unauthenticated request never sees a 403.
pub fn require_role(user: &User, allowed: &[Role]) -> crate::error::Result<()> {
    if user.role.is_allowed(allowed) {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "Role {} is not permitted to access this resource",
            user.role.as_str()
        )))
    }
}
