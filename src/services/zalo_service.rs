use base64::{engine::general_purpose, Engine};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::utils::validation::PHONE_RE;

const ZALO_PHONE_API: &str = "https://graph.zalo.me/v2.0/me/phonenumber";
const EXTERNAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Field names the Mini App SDK and the Graph API have been observed to put
/// a phone number under.
const DIRECT_PHONE_FIELDS: &[&str] = &[
    "phoneNumber",
    "phone",
    "mobile",
    "tel",
    "phone_number",
    "phoneNumberMasked",
    "phoneNumberUnmasked",
    "userPhone",
    "userPhoneNumber",
    "contactPhone",
    "contactPhoneNumber",
    "phoneNumberFormatted",
    "phoneNumberRaw",
    "phoneNumberDisplay",
];

static VN_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\+84|84|0)[0-9]{9,10}").unwrap());
static BARE_PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{10,11}").unwrap());
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{9,}").unwrap());

#[derive(Clone)]
pub struct ZaloService {
    http: Client,
}

impl ZaloService {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(EXTERNAL_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("HTTP client init failed: {}", e)))?;
        Ok(Self { http })
    }

    /// Pulls a phone number out of the structured payload the Mini App sends
    /// after social login. Purely local, no network.
    pub fn extract_from_payload(data: &JsonValue) -> Option<String> {
        if let Some(phone) = direct_fields(data) {
            return Some(phone);
        }
        for key in ["user", "profile", "contact"] {
            if let Some(phone) = phone_field(&data[key], "phoneNumber") {
                return Some(phone);
            }
        }
        contacts_scan(data)
    }

    /// Decodes an opaque token into a phone number, trying progressively
    /// blunter instruments. Every external failure falls through to the next
    /// step; None means the whole chain came up empty.
    pub async fn process_token(&self, token: &str) -> Option<String> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        if let Some(phone) = scan_text(token) {
            return Some(phone);
        }
        if let Some(phone) = base64_scan(token) {
            return Some(phone);
        }
        if let Some(phone) = self.query_phone_api(token).await {
            return Some(phone);
        }
        longest_digit_run(token)
    }

    /// Asks the Zalo Graph API to resolve the token. The API has shipped
    /// several credential conventions over time, so three permutations are
    /// tried in sequence, each absorbed on failure.
    async fn query_phone_api(&self, token: &str) -> Option<String> {
        let config = crate::config::CONFIG.get()?;
        let (app_id, app_secret) = match (&config.zalo_app_id, &config.zalo_app_secret) {
            (Some(id), Some(secret)) => (id.as_str(), secret.as_str()),
            _ => return None,
        };

        let attempts = [
            self.http.get(ZALO_PHONE_API).query(&[
                ("access_token", token),
                ("app_id", app_id),
                ("app_secret", app_secret),
            ]),
            self.http.get(ZALO_PHONE_API).query(&[
                ("access_token", token),
                ("code", token),
                ("secret_key", app_secret),
            ]),
            self.http
                .get(ZALO_PHONE_API)
                .header("access_token", token)
                .header("code", token)
                .header("secret_key", app_secret),
        ];

        for (i, request) in attempts.into_iter().enumerate() {
            let response = match request.send().await {
                Ok(r) => r,
                Err(err) => {
                    debug!(attempt = i, error = %err, "zalo phone api unreachable");
                    continue;
                }
            };
            if !response.status().is_success() {
                debug!(attempt = i, status = %response.status(), "zalo phone api rejected");
                continue;
            }
            let body: JsonValue = match response.json().await {
                Ok(b) => b,
                Err(err) => {
                    debug!(attempt = i, error = %err, "zalo phone api body unreadable");
                    continue;
                }
            };
            if !body["error"].is_null() && body["error"] != JsonValue::from(0) {
                debug!(attempt = i, "zalo phone api returned an error body");
                continue;
            }
            if let Some(phone) = mine_api_response(&body) {
                return Some(phone);
            }
        }
        None
    }

    /// Zalo webview detection: the Mini App runtime stamps its user agent,
    /// and its URLs live on the zalo host family.
    pub fn validate_environment(user_agent: Option<&str>, url: Option<&str>) -> bool {
        let ua_hit = user_agent.is_some_and(|ua| ua.contains("Zalo"));
        let url_hit = url.is_some_and(|u| {
            let u = u.to_lowercase();
            u.contains("zaloapp") || u.contains("zalo.me") || u.contains("zalo")
        });
        ua_hit || url_hit
    }
}

fn phone_field(obj: &JsonValue, field: &str) -> Option<String> {
    let value = obj.get(field)?.as_str()?.trim();
    if !value.is_empty() && PHONE_RE.is_match(value) {
        Some(value.to_string())
    } else {
        None
    }
}

fn direct_fields(obj: &JsonValue) -> Option<String> {
    DIRECT_PHONE_FIELDS
        .iter()
        .find_map(|field| phone_field(obj, field))
}

fn contacts_scan(data: &JsonValue) -> Option<String> {
    data.get("contacts")?
        .as_array()?
        .iter()
        .find_map(direct_fields)
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Longest match of `re` carrying at least 9 digits.
fn longest_match(re: &Regex, text: &str) -> Option<String> {
    re.find_iter(text)
        .map(|m| m.as_str())
        .filter(|m| digit_count(m) >= 9)
        .max_by_key(|m| digit_count(m))
        .map(|m| m.to_string())
}

/// Vietnamese-prefixed numbers first, then any bare 10-11 digit run.
fn scan_text(text: &str) -> Option<String> {
    longest_match(&VN_PHONE_RE, text).or_else(|| longest_match(&BARE_PHONE_RE, text))
}

/// Some tokens are base64-wrapped JSON or query strings; decode and re-scan.
fn base64_scan(token: &str) -> Option<String> {
    let decoded = general_purpose::STANDARD
        .decode(token)
        .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(token))
        .ok()?;
    scan_text(&String::from_utf8_lossy(&decoded))
}

fn longest_digit_run(text: &str) -> Option<String> {
    longest_match(&DIGIT_RUN_RE, text)
}

/// Digs through a 200 body from the Graph API: known fields, known nesting,
/// and finally a regex sweep over every string in the tree.
fn mine_api_response(body: &JsonValue) -> Option<String> {
    if let Some(phone) = direct_fields(body) {
        return Some(phone);
    }
    for key in ["data", "user", "profile"] {
        let nested = &body[key];
        if let Some(phone) = direct_fields(nested) {
            return Some(phone);
        }
    }
    if let Some(phone) = contacts_scan(body) {
        return Some(phone);
    }
    tree_walk(body)
}

fn tree_walk(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => scan_text(s),
        JsonValue::Array(items) => items.iter().find_map(tree_walk),
        JsonValue::Object(map) => map.values().find_map(tree_walk),
        JsonValue::Number(n) => scan_text(&n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_field_wins() {
        let data = json!({ "phoneNumber": "0912345678", "name": "An" });
        assert_eq!(
            ZaloService::extract_from_payload(&data),
            Some("0912345678".to_string())
        );
    }

    #[test]
    fn direct_field_order_is_fixed() {
        let data = json!({ "mobile": "0900000001", "phone": "0900000002" });
        // "phone" precedes "mobile" in the field list.
        assert_eq!(
            ZaloService::extract_from_payload(&data),
            Some("0900000002".to_string())
        );
    }

    #[test]
    fn non_phone_shaped_values_skipped() {
        let data = json!({ "phone": "call me maybe", "mobile": "0912345678" });
        assert_eq!(
            ZaloService::extract_from_payload(&data),
            Some("0912345678".to_string())
        );
    }

    #[test]
    fn nested_profile_searched() {
        let data = json!({ "profile": { "phoneNumber": "+84912345678" } });
        assert_eq!(
            ZaloService::extract_from_payload(&data),
            Some("+84912345678".to_string())
        );
    }

    #[test]
    fn contacts_array_searched() {
        let data = json!({ "contacts": [ { "name": "x" }, { "phoneNumber": "0987654321" } ] });
        assert_eq!(
            ZaloService::extract_from_payload(&data),
            Some("0987654321".to_string())
        );
    }

    #[test]
    fn empty_payload_yields_none() {
        assert_eq!(ZaloService::extract_from_payload(&json!({})), None);
        assert_eq!(ZaloService::extract_from_payload(&json!(null)), None);
    }

    #[test]
    fn token_scan_finds_embedded_number() {
        assert_eq!(
            scan_text("abcXYZ0912345678def"),
            Some("0912345678".to_string())
        );
    }

    #[test]
    fn token_scan_prefers_vn_prefix() {
        assert_eq!(
            scan_text("id=12345678901 phone=+84912345678"),
            Some("+84912345678".to_string())
        );
    }

    #[test]
    fn token_scan_ignores_short_runs() {
        assert_eq!(scan_text("order 12345 ref 678"), None);
    }

    #[test]
    fn base64_wrapped_token_decoded() {
        let token = general_purpose::STANDARD.encode(r#"{"phone":"0912345678"}"#);
        assert_eq!(base64_scan(&token), Some("0912345678".to_string()));
    }

    #[test]
    fn digit_run_is_the_last_resort() {
        assert_eq!(
            longest_digit_run("session-123456789012345-end"),
            Some("123456789012345".to_string())
        );
        assert_eq!(longest_digit_run("no digits here"), None);
    }

    #[test]
    fn api_response_mined_through_nesting() {
        let body = json!({ "data": { "number": "0912345678" } });
        assert_eq!(mine_api_response(&body), Some("0912345678".to_string()));

        let body = json!({ "data": { "phoneNumber": "0912345678" } });
        assert_eq!(mine_api_response(&body), Some("0912345678".to_string()));
    }

    #[test]
    fn zalo_environment_detection() {
        assert!(ZaloService::validate_environment(
            Some("Mozilla/5.0 ZaloTheme/light Zalo/23.0"),
            None
        ));
        assert!(ZaloService::validate_environment(
            None,
            Some("https://h5.zdn.vn/zapps/123?from=zalo")
        ));
        assert!(!ZaloService::validate_environment(
            Some("Mozilla/5.0 Chrome/120"),
            Some("https://example.com")
        ));
        assert!(!ZaloService::validate_environment(None, None));
    }
}
