use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::dto::auth_dto::{
    ChangePasswordPayload, ForgotPasswordPayload, LoginPayload, RegisterPayload,
    ResetPasswordPayload, UpdateProfilePayload,
};
use crate::middleware::auth::require_role;
use crate::models::user::{Role, User};
use crate::AppState;

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let (user, token) = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Logged in",
        "data": { "token": token, "user": user },
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<RegisterPayload>,
) -> crate::error::Result<Response> {
    require_role(&user, &[Role::Admin])?;
    payload.validate()?;
    let created = state.auth_service.register(payload).await?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Account created",
            "data": created,
        })),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn get_profile(Extension(user): Extension<User>) -> crate::error::Result<Response> {
    Ok(Json(json!({ "success": true, "data": user })).into_response())
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfilePayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let updated = state.auth_service.update_profile(user.id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Profile updated",
        "data": updated,
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<ChangePasswordPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    state
        .auth_service
        .change_password(&user, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(json!({ "success": true, "message": "Password changed" })).into_response())
}

/// Always answers the same way so the endpoint cannot be used to probe which
/// emails have accounts. The token itself is only echoed in development.
#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let token = state.auth_service.forgot_password(&payload.email).await?;

    let development = crate::config::CONFIG
        .get()
        .map(|c| c.is_development())
        .unwrap_or(false);
    let data = match token {
        Some(token) if development => json!({ "resetToken": token }),
        _ => json!(null),
    };
    Ok(Json(json!({
        "success": true,
        "message": "If the email is registered, a reset link has been sent",
        "data": data,
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    state
        .auth_service
        .reset_password(&payload.token, &payload.new_password)
        .await?;
    Ok(Json(json!({ "success": true, "message": "Password has been reset" })).into_response())
}

/// Tokens are stateless; logout is the client discarding its copy.
#[axum::debug_handler]
pub async fn logout() -> crate::error::Result<Response> {
    Ok(Json(json!({ "success": true, "message": "Logged out" })).into_response())
}
