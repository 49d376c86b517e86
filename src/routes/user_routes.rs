use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::{
    ChangeUserPasswordPayload, CreateUserPayload, UpdateUserPayload, UserListQuery,
};
use crate::middleware::auth::require_role;
use crate::models::user::{Role, User};
use crate::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Hr];

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<UserListQuery>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    let (users, pagination) = state.user_service.list(&query).await?;
    Ok(Json(json!({
        "success": true,
        "data": users,
        "pagination": pagination,
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn get_user_stats(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    let stats = state.user_service.stats().await?;
    Ok(Json(json!({ "success": true, "data": stats })).into_response())
}

/// Users converted out of leads assigned to the given HR account.
#[axum::debug_handler]
pub async fn list_users_by_hr(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(hr_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    let users = state.user_service.list_by_hr(hr_id).await?;
    Ok(Json(json!({ "success": true, "data": users })).into_response())
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    let target = state.user_service.get(id).await?;
    Ok(Json(json!({ "success": true, "data": target })).into_response())
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateUserPayload>,
) -> crate::error::Result<Response> {
    require_role(&user, &[Role::Admin])?;
    payload.validate()?;
    let created = state.user_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User created",
            "data": created,
        })),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    payload.validate()?;
    let updated = state.user_service.update(id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User updated",
        "data": updated,
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    require_role(&user, &[Role::Admin])?;
    state.user_service.delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "User deleted" })).into_response())
}

#[axum::debug_handler]
pub async fn set_user_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeUserPasswordPayload>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    payload.validate()?;
    state
        .user_service
        .set_password(id, &payload.new_password)
        .await?;
    Ok(Json(json!({ "success": true, "message": "Password updated" })).into_response())
}

/// Admin-issued reset: the fresh password is returned exactly once.
#[axum::debug_handler]
pub async fn reset_user_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    require_role(&user, &[Role::Admin])?;
    let new_password = state.user_service.reset_password(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Password reset",
        "data": { "newPassword": new_password },
    }))
    .into_response())
}
