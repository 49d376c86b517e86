use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use validator::Validate;

use crate::dto::zalo_dto::{
    ProcessTokenPayload, ValidateQuery, ZaloCreateLeadPayload, ZaloUserInfoPayload,
};
use crate::error::Error;
use crate::models::lead::LeadSource;
use crate::services::lead_service::{NewLead, SubmissionContext};
use crate::services::zalo_service::ZaloService;
use crate::utils::validation::PHONE_RE;
use crate::AppState;

/// Token-bearing fields the Mini App has been seen to use in its payload.
const TOKEN_FIELDS: &[&str] = &["token", "accessToken", "access_token", "code"];

/// Confirms the caller is inside the Zalo webview, from the query parameters
/// or the request's own user agent.
#[axum::debug_handler]
pub async fn validate(
    Query(query): Query<ValidateQuery>,
    headers: HeaderMap,
) -> crate::error::Result<Response> {
    let header_ua = super::client_user_agent(&headers);
    let user_agent = query.user_agent.as_deref().or(header_ua.as_deref());
    let is_zalo = ZaloService::validate_environment(user_agent, query.url.as_deref());
    Ok(Json(json!({
        "success": true,
        "data": { "isZalo": is_zalo },
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn zalo_health() -> crate::error::Result<Response> {
    let has_credentials = crate::config::CONFIG
        .get()
        .map(|c| c.zalo_app_id.is_some() && c.zalo_app_secret.is_some())
        .unwrap_or(false);
    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "apiLookupEnabled": has_credentials,
        },
    }))
    .into_response())
}

/// Mines the social-login payload for a phone number. Never fails outward:
/// an empty result is `success: true` with a null phone.
#[axum::debug_handler]
pub async fn user_info(
    State(state): State<AppState>,
    Json(payload): Json<ZaloUserInfoPayload>,
) -> crate::error::Result<Response> {
    let Some(zalo_data) = payload.zalo_data else {
        return Err(Error::BadRequest("zaloData is required".to_string()));
    };

    let mut phone = ZaloService::extract_from_payload(&zalo_data);

    if phone.is_none() {
        for field in TOKEN_FIELDS {
            let Some(token) = zalo_data.get(field).and_then(|v| v.as_str()) else {
                continue;
            };
            phone = state.zalo_service.process_token(token).await;
            if phone.is_some() {
                break;
            }
        }
    }

    let message = if phone.is_some() {
        "Phone number extracted"
    } else {
        "No phone number could be extracted"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "data": { "phone": phone },
    }))
    .into_response())
}

#[axum::debug_handler]
pub async fn process_token(
    State(state): State<AppState>,
    Json(payload): Json<ProcessTokenPayload>,
) -> crate::error::Result<Response> {
    let Some(token) = payload.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Err(Error::BadRequest("Token is required".to_string()));
    };

    let phone = state.zalo_service.process_token(token).await;
    let message = if phone.is_some() {
        "Phone number extracted"
    } else {
        "No phone number could be extracted"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "data": { "phone": phone },
    }))
    .into_response())
}

/// Lead submission from the Mini App. The phone may be missing from the form;
/// the extraction heuristic fills it from the attached social payload before
/// the usual duplicate checks run.
#[axum::debug_handler]
pub async fn create_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ZaloCreateLeadPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;

    let mut phone = payload
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string());

    if phone.is_none() {
        if let Some(zalo_data) = &payload.zalo_data {
            phone = ZaloService::extract_from_payload(zalo_data);
            if phone.is_none() {
                for field in TOKEN_FIELDS {
                    let Some(token) = zalo_data.get(field).and_then(|v| v.as_str()) else {
                        continue;
                    };
                    phone = state.zalo_service.process_token(token).await;
                    if phone.is_some() {
                        break;
                    }
                }
            }
        }
    }

    let Some(phone) = phone else {
        return Err(Error::BadRequest(
            "Phone number is required and could not be extracted".to_string(),
        ));
    };
    if !(10..=15).contains(&phone.len()) || !PHONE_RE.is_match(&phone) {
        return Err(Error::BadRequest("Invalid phone number".to_string()));
    }

    let ctx = SubmissionContext {
        source: LeadSource::Zalo,
        ip_address: payload.ip_address.or_else(|| super::client_ip(&headers)),
        user_agent: payload
            .user_agent
            .or_else(|| super::client_user_agent(&headers)),
    };
    let lead = state
        .lead_service
        .create(
            NewLead {
                name: payload.name,
                phone,
                email: payload.email,
                birth_year: payload.birth_year,
                qualification: payload.qualification,
                country: payload.country,
                message: payload.message,
                zalo_info: payload.zalo_data,
            },
            ctx,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Thank you! We will contact you shortly",
            "data": {
                "leadId": lead.id,
                "phone": lead.phone,
                "status": lead.status,
            },
        })),
    )
        .into_response())
}
