use base64::{engine::general_purpose, Engine};
use leadhub_backend::services::zalo_service::ZaloService;
use serde_json::json;

// No Zalo credentials are configured in these tests, so the external API step
// of the chain is skipped entirely; everything below resolves locally.

#[tokio::test]
async fn token_with_embedded_number_resolves_without_network() {
    let svc = ZaloService::new().unwrap();
    assert_eq!(
        svc.process_token("abcXYZ0912345678def").await,
        Some("0912345678".to_string())
    );
}

#[tokio::test]
async fn vn_prefixed_number_beats_generic_digit_runs() {
    let svc = ZaloService::new().unwrap();
    assert_eq!(
        svc.process_token("ref=12345678901;phone=+84912345678").await,
        Some("+84912345678".to_string())
    );
}

#[tokio::test]
async fn base64_wrapped_token_is_decoded_and_scanned() {
    let svc = ZaloService::new().unwrap();
    let token = general_purpose::STANDARD.encode("user:an;phone:0912345678;exp:soon");
    assert_eq!(
        svc.process_token(&token).await,
        Some("0912345678".to_string())
    );
}

#[tokio::test]
async fn long_digit_run_is_the_last_resort() {
    // Nine digits with no VN prefix: too short for the phone-shaped passes,
    // but the final digit-run sweep still surfaces it.
    let svc = ZaloService::new().unwrap();
    assert_eq!(
        svc.process_token("sess123456789end").await,
        Some("123456789".to_string())
    );
}

#[tokio::test]
async fn hopeless_tokens_yield_none() {
    let svc = ZaloService::new().unwrap();
    assert_eq!(svc.process_token("opaque-session-handle").await, None);
    assert_eq!(svc.process_token("").await, None);
    assert_eq!(svc.process_token("   ").await, None);
}

#[test]
fn structured_payload_fields_win_over_everything() {
    let data = json!({
        "id": "999888777666",
        "user": { "phoneNumber": "0912345678" },
    });
    assert_eq!(
        ZaloService::extract_from_payload(&data),
        Some("0912345678".to_string())
    );
}

#[test]
fn payload_without_phone_material_yields_none() {
    let data = json!({ "name": "An Nguyen", "avatar": "https://cdn.example/a.png" });
    assert_eq!(ZaloService::extract_from_payload(&data), None);
}
