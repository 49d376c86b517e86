use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::utils::time::uptime_seconds;

#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let environment = crate::config::CONFIG
        .get()
        .map(|c| c.environment.as_str())
        .unwrap_or("unknown");
    let body = json!({
        "success": true,
        "message": "OK",
        "data": {
            "status": "ok",
            "uptime": uptime_seconds(),
            "environment": environment,
        },
    });
    (StatusCode::OK, Json(body))
}

/// Root index so a bare GET / answers with the endpoint map instead of a 404.
#[axum::debug_handler]
pub async fn index() -> impl IntoResponse {
    let body = json!({
        "success": true,
        "message": "Recruitment lead API",
        "data": {
            "endpoints": {
                "health": "/api/health",
                "leads": "/api/leads",
                "users": "/api/users",
                "auth": "/api/auth",
                "zalo": "/api/zalo",
            },
        },
    });
    (StatusCode::OK, Json(body))
}
