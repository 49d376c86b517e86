use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::lead_dto::{
    AddNotePayload, ConvertLeadData, CreateLeadPayload, LeadCreatedData, LeadListQuery,
    UpdateLeadPayload,
};
use crate::middleware::auth::require_role;
use crate::models::lead::LeadSource;
use crate::models::user::{Role, User};
use crate::services::lead_service::{NewLead, SubmissionContext};
use crate::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Hr];

/// Public form submission endpoint.
#[axum::debug_handler]
pub async fn create_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateLeadPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;

    let ctx = SubmissionContext {
        source: payload.source.unwrap_or(LeadSource::Website),
        ip_address: super::client_ip(&headers),
        user_agent: super::client_user_agent(&headers),
    };
    let lead = state
        .lead_service
        .create(
            NewLead {
                name: payload.name,
                phone: payload.phone,
                email: payload.email,
                birth_year: payload.birth_year,
                qualification: payload.qualification,
                country: payload.country,
                message: payload.message,
                zalo_info: payload.zalo_info,
            },
            ctx,
        )
        .await?;

    let data = LeadCreatedData {
        lead_id: lead.id,
        name: lead.name,
        phone: lead.phone,
        email: lead.email,
        status: lead.status,
        created_at: lead.created_at,
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Thank you! We will contact you shortly",
            "data": data,
        })),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<LeadListQuery>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    let (leads, pagination) = state.lead_service.list(&query).await?;
    Ok(Json(json!({
        "success": true,
        "data": leads,
        "pagination": pagination,
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn get_lead_stats(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    let stats = state.lead_service.stats().await?;
    Ok(Json(json!({ "success": true, "data": stats })).into_response())
}

#[axum::debug_handler]
pub async fn get_lead(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    let lead = state.lead_service.get(id).await?;
    let notes = state.lead_service.list_notes(id).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "lead": lead, "notes": notes },
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn update_lead(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    payload.validate()?;
    let lead = state.lead_service.update(id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Lead updated",
        "data": lead,
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    require_role(&user, &[Role::Admin])?;
    state.lead_service.delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Lead deleted" })).into_response())
}

#[axum::debug_handler]
pub async fn convert_lead(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    let (created, temp_password) = state.lead_service.convert_to_user(id).await?;
    let data = ConvertLeadData {
        user_id: created.id,
        email: created.email,
        temp_password,
        lead_id: id,
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Lead converted to user",
            "data": data,
        })),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn add_note(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddNotePayload>,
) -> crate::error::Result<Response> {
    require_role(&user, STAFF)?;
    payload.validate()?;
    let note = state
        .lead_service
        .add_note(id, &payload.content, user.id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Note added",
            "data": note,
        })),
    )
        .into_response())
}
