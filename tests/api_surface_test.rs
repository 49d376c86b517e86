mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_status_and_environment() {
    let app = common::app();
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
    assert_eq!(body["data"]["environment"], json!("test"));
}

#[tokio::test]
async fn index_lists_endpoint_groups() {
    let app = common::app();
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["endpoints"]["leads"], json!("/api/leads"));
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let app = common::app();
    let response = app
        .oneshot(Request::get("/api/leads").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("NO_TOKEN"));
}

#[tokio::test]
async fn garbage_bearer_token_is_invalid() {
    let app = common::app();
    let response = app
        .oneshot(
            Request::get("/api/leads")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], json!("INVALID_TOKEN"));
}

#[tokio::test]
async fn expired_token_reports_expiry() {
    common::init();
    let claims = json!({
        "sub": uuid::Uuid::new_v4().to_string(),
        "exp": (Utc::now().timestamp() - 7200),
    });
    let secret = leadhub_backend::config::get_config().jwt_secret.as_bytes();
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap();

    let app = common::app();
    let response = app
        .oneshot(
            Request::get("/api/leads")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], json!("TOKEN_EXPIRED"));
}

#[tokio::test]
async fn invalid_lead_submission_is_rejected_before_storage() {
    let app = common::app();
    let payload = json!({
        "name": "An Nguyen",
        "phone": "0912345678",
        "email": "not-an-email",
        "qualification": "university",
        "country": "vietnam",
    });
    let response = app
        .oneshot(json_request(Method::POST, "/api/leads", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn zalo_validate_detects_webview() {
    let app = common::app();
    let response = app
        .oneshot(
            Request::get("/api/zalo/validate?userAgent=Mozilla%2F5.0%20Zalo%2F23.0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["isZalo"], json!(true));

    let app = common::app();
    let response = app
        .oneshot(
            Request::get("/api/zalo/validate?userAgent=Mozilla%2F5.0%20Chrome")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["isZalo"], json!(false));
}

#[tokio::test]
async fn zalo_user_info_without_data_answers_in_envelope() {
    let app = common::app();
    let response = app
        .oneshot(json_request(Method::POST, "/api/zalo/user-info", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn auth_endpoints_are_throttled_per_ip() {
    common::init();
    let limit = leadhub_backend::config::get_config().auth_rate_limit;

    let app = common::app();
    for _ in 0..limit {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/login",
                json!({ "email": "x@test.com", "password": "short" }),
            ))
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "email": "x@test.com", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn cors_preflight_allows_zalo_origin() {
    let app = common::app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/leads")
                .header(header::ORIGIN, "https://zmp.zalo.me")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://zmp.zalo.me")
    );
}

#[tokio::test]
async fn cors_preflight_blocks_lookalike_origin() {
    let app = common::app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/leads")
                .header(header::ORIGIN, "https://zalo.me.evil.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
