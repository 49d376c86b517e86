pub mod auth_routes;
pub mod health;
pub mod lead_routes;
pub mod user_routes;
pub mod zalo_routes;

use axum::http::HeaderMap;

/// Client address as seen through the reverse proxy.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    for header in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = headers.get(header) {
            if let Ok(value) = value.to_str() {
                if let Some(ip) = value.split(',').next() {
                    let ip = ip.trim();
                    if !ip.is_empty() {
                        return Some(ip.to_string());
                    }
                }
            }
        }
    }
    None
}

pub(crate) fn client_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
