use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Wildcard-aware origin match. A `*` in the pattern spans one arbitrary
/// segment (`https://*.zalo.me` matches any subdomain); a pattern without a
/// wildcard matches exactly or as a prefix, which is how the Mini App's
/// per-app URLs (`https://h5.zdn.vn/zapps/<id>`) stay covered.
pub fn origin_matches(origin: &str, pattern: &str) -> bool {
    if let Some(star) = pattern.find('*') {
        let (prefix, suffix) = (&pattern[..star], &pattern[star + 1..]);
        origin.len() >= prefix.len() + suffix.len()
            && origin.starts_with(prefix)
            && origin.ends_with(suffix)
    } else {
        // Prefix continuation must be a path boundary so an allowed host
        // cannot be extended into another domain (zalo.me.evil.com).
        origin == pattern
            || origin
                .strip_prefix(pattern)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

pub fn origin_allowed(origin: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| origin_matches(origin, p))
}

/// CORS layer for the Zalo webview + dashboard. Requests without an Origin
/// header (curl, native apps) bypass CORS entirely, matching browser rules.
pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin
                    .to_str()
                    .map(|o| origin_allowed(o, &allowed_origins))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
            header::HeaderName::from_static("x-zalo-app-id"),
            header::HeaderName::from_static("x-zalo-version"),
            header::HeaderName::from_static("x-zalo-platform"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Vec<String> {
        vec![
            "http://localhost:3000".to_string(),
            "https://zalo.me".to_string(),
            "https://*.zalo.me".to_string(),
            "https://*.zdn.vn".to_string(),
        ]
    }

    #[test]
    fn exact_origin_allowed() {
        assert!(origin_allowed("http://localhost:3000", &patterns()));
        assert!(origin_allowed("https://zalo.me", &patterns()));
    }

    #[test]
    fn wildcard_matches_subdomains() {
        assert!(origin_allowed("https://zmp.zalo.me", &patterns()));
        assert!(origin_allowed("https://h5.zdn.vn", &patterns()));
    }

    #[test]
    fn prefix_covers_per_app_urls() {
        assert!(origin_allowed(
            "https://zalo.me/s/1396606563538150743",
            &patterns()
        ));
    }

    #[test]
    fn unrelated_origins_blocked() {
        assert!(!origin_allowed("https://evil.example.com", &patterns()));
        assert!(!origin_allowed("https://zalo.me.evil.com", &patterns()));
        assert!(!origin_allowed("http://localhost:9999", &patterns()));
    }
}
