//! Input validation shared by the vote handler: device-id gate, device-info
//! sanitization, and the blocked-word / model-name filters. All functions are
//! pure and total over arbitrary client input.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

pub const DEVICE_ID_MAX_LEN: usize = 64;
pub const DEVICE_INFO_MAX_RAW_LEN: usize = 8192;

const MAX_STRING_LEN: usize = 500;
const MAX_FILTER_INPUT_LEN: usize = 1000;
const MAX_SCAN_DEPTH: usize = 4;

const BLOCK_MESSAGE: &str = "Njan ninta thandha";
const MODEL_REJECT_EXACT: &str = "Poyi Tharathil Poyi kalikkada";
const MODEL_REJECT_OTHER: &str = "This device or model cannot submit.";

/// Text-only model names excluded from the "only text" rejection.
const ALLOWED_TEXT_MODELS: [&str; 4] = ["iphone", "mac", "linux", "windows"];

/// Detail keys kept by the sanitizer; everything else is dropped.
const DETAIL_KEYS: [&str; 9] = [
    "userAgent",
    "platform",
    "language",
    "timeZone",
    "screenWidth",
    "screenHeight",
    "brands",
    "mobile",
    "platformVersion",
];

static UUID_V4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-4[0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$",
    )
    .unwrap()
});

static DEVICE_ID_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

/// Accepts a v4 UUID or the constrained fallback alphabet, nothing else.
pub fn is_valid_device_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= DEVICE_ID_MAX_LEN
        && (UUID_V4.is_match(value) || DEVICE_ID_FALLBACK.is_match(value))
}

fn truncate_chars(value: &str, cap: usize) -> String {
    value.chars().take(cap).collect()
}

/// Coerce a JSON scalar to a capped string the way the stored form expects:
/// null becomes empty, numbers and booleans render as text.
fn coerce_str(value: &Value, cap: usize) -> String {
    let s = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    truncate_chars(&s, cap)
}

/// Lowercase, fold fullwidth forms to ASCII, strip all whitespace.
fn normalize_for_filter(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '\u{ff01}'..='\u{ff5e}' => char::from_u32(c as u32 - 0xfee0).unwrap_or(c),
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// True if the text contains "poda" in any form, including spaced or split
/// variants ("P O D A", "Po da") and fullwidth characters.
fn contains_blocked_word(value: &str) -> bool {
    normalize_for_filter(&truncate_chars(value, MAX_FILTER_INPUT_LEN)).contains("poda")
}

/// Walks the device-info value tree (depth-limited) looking for the blocked
/// word in any string, number, or boolean leaf.
pub fn device_info_rejection(info: &Map<String, Value>) -> Option<&'static str> {
    if info.values().any(|value| scan_for_blocked(value, 1)) {
        Some(BLOCK_MESSAGE)
    } else {
        None
    }
}

fn scan_for_blocked(value: &Value, depth: usize) -> bool {
    if depth > MAX_SCAN_DEPTH {
        return false;
    }
    match value {
        Value::String(s) => contains_blocked_word(s),
        Value::Number(n) => contains_blocked_word(&n.to_string()),
        Value::Bool(b) => contains_blocked_word(&b.to_string()),
        Value::Array(items) => items.iter().any(|v| scan_for_blocked(v, depth + 1)),
        Value::Object(map) => map.values().any(|v| scan_for_blocked(v, depth + 1)),
        Value::Null => false,
    }
}

/// Returns the rejection message for a model name, or None if allowed.
/// Phone model numbers ("iPhone 14", "SM-G991B", "Pixel 7") are allowed;
/// text-only names outside the allow-set are not.
pub fn model_rejection(model_name: Option<&str>) -> Option<&'static str> {
    let model = truncate_chars(model_name.unwrap_or(""), MAX_FILTER_INPUT_LEN);
    let model = model.trim();
    if model.is_empty() {
        return None;
    }
    let lower = model.to_lowercase();
    if lower == "poda" {
        return Some(MODEL_REJECT_EXACT);
    }
    if is_only_text(model) && !ALLOWED_TEXT_MODELS.contains(&lower.as_str()) {
        return Some(MODEL_REJECT_OTHER);
    }
    None
}

// A letter and no digit, e.g. "gibberish" but not "SM-G991B".
fn is_only_text(value: &str) -> bool {
    let has_letter = value.chars().any(char::is_alphabetic);
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    has_letter && !has_digit
}

/// Copy-with-filter over the raw device info: keeps deviceName, modelName,
/// and whitelisted detail keys; coerces screen dimensions to finite numbers,
/// keeps `mobile` only when boolean, truncates everything else to strings.
pub fn sanitize_device_info(raw: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    if let Some(Value::String(s)) = raw.get("deviceName") {
        out.insert(
            "deviceName".to_string(),
            Value::String(truncate_chars(s, MAX_STRING_LEN)),
        );
    }
    if let Some(Value::String(s)) = raw.get("modelName") {
        out.insert(
            "modelName".to_string(),
            Value::String(truncate_chars(s, MAX_STRING_LEN)),
        );
    }
    if let Some(Value::Object(details)) = raw.get("details") {
        let mut kept = Map::new();
        for key in DETAIL_KEYS {
            let Some(value) = details.get(key) else {
                continue;
            };
            match key {
                "screenWidth" | "screenHeight" => {
                    if let Some(n) = to_finite_number(value) {
                        kept.insert(key.to_string(), n);
                    }
                }
                "mobile" => {
                    if let Value::Bool(b) = value {
                        kept.insert(key.to_string(), Value::Bool(*b));
                    }
                }
                _ => {
                    kept.insert(
                        key.to_string(),
                        Value::String(coerce_str(value, MAX_STRING_LEN)),
                    );
                }
            }
        }
        out.insert("details".to_string(), Value::Object(kept));
    }
    Value::Object(out)
}

fn to_finite_number(value: &Value) -> Option<Value> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    Number::from_f64(n).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn device_id_accepts_v4_uuid() {
        assert!(is_valid_device_id("9f1c7e1e-4b2a-4c3d-8e5f-012345678abc"));
    }

    #[test]
    fn device_id_accepts_fallback_alphabet() {
        assert!(is_valid_device_id("dev_abc-123"));
        assert!(is_valid_device_id("a"));
    }

    #[test]
    fn device_id_rejects_bad_input() {
        assert!(!is_valid_device_id(""));
        assert!(!is_valid_device_id(&"x".repeat(65)));
        assert!(!is_valid_device_id("has space"));
        assert!(!is_valid_device_id("semi;colon"));
    }

    #[test]
    fn blocked_word_matches_split_and_spaced_forms() {
        for input in ["poda", "PODA", "p o d a", "Po da", "po\tda", "xxpodaxx"] {
            assert!(
                device_info_rejection(&obj(json!({ "deviceName": input }))).is_some(),
                "expected rejection for {input:?}"
            );
        }
    }

    #[test]
    fn blocked_word_matches_fullwidth_forms() {
        assert!(device_info_rejection(&obj(json!({ "deviceName": "ＰＯＤＡ" }))).is_some());
    }

    #[test]
    fn blocked_word_ignores_near_misses() {
        for input in ["pod", "", "my phone", "p.o.d"] {
            assert!(
                device_info_rejection(&obj(json!({ "deviceName": input }))).is_none(),
                "unexpected rejection for {input:?}"
            );
        }
    }

    #[test]
    fn blocked_word_found_in_nested_details() {
        let info = json!({
            "deviceName": "fine",
            "details": { "userAgent": "Mozilla p o d a build" }
        });
        assert_eq!(device_info_rejection(&obj(info)), Some(BLOCK_MESSAGE));
    }

    #[test]
    fn scan_stops_at_depth_limit() {
        let deep = json!({ "a": { "b": { "c": { "d": { "e": { "f": "poda" } } } } } });
        assert!(device_info_rejection(&obj(deep)).is_none());
    }

    #[test]
    fn model_exact_poda_gets_dedicated_message() {
        assert_eq!(model_rejection(Some("poda")), Some(MODEL_REJECT_EXACT));
        assert_eq!(model_rejection(Some("  PoDa ")), Some(MODEL_REJECT_EXACT));
    }

    #[test]
    fn model_text_only_rejected_unless_allowed() {
        assert_eq!(model_rejection(Some("gibberish")), Some(MODEL_REJECT_OTHER));
        assert_eq!(model_rejection(Some("iPhone")), None);
        assert_eq!(model_rejection(Some("Windows")), None);
    }

    #[test]
    fn model_numbers_are_allowed() {
        assert_eq!(model_rejection(Some("iPhone 14")), None);
        assert_eq!(model_rejection(Some("SM-G991B")), None);
        assert_eq!(model_rejection(Some("Pixel 7")), None);
        assert_eq!(model_rejection(None), None);
        assert_eq!(model_rejection(Some("   ")), None);
    }

    #[test]
    fn sanitize_drops_unknown_keys() {
        let raw = json!({
            "deviceName": "My Phone",
            "injected": "nope",
            "details": { "userAgent": "UA", "evil": "nope" }
        });
        let clean = sanitize_device_info(&obj(raw));
        assert_eq!(clean["deviceName"], "My Phone");
        assert!(clean.get("injected").is_none());
        assert_eq!(clean["details"]["userAgent"], "UA");
        assert!(clean["details"].get("evil").is_none());
    }

    #[test]
    fn sanitize_coerces_screen_dimensions() {
        let raw = json!({
            "details": {
                "screenWidth": "1920",
                "screenHeight": 1080,
                "mobile": "yes"
            }
        });
        let clean = sanitize_device_info(&obj(raw));
        assert_eq!(clean["details"]["screenWidth"], json!(1920.0));
        assert_eq!(clean["details"]["screenHeight"], json!(1080.0));
        // non-boolean mobile is dropped
        assert!(clean["details"].get("mobile").is_none());
    }

    #[test]
    fn sanitize_truncates_long_strings() {
        let long = "x".repeat(600);
        let raw = json!({ "modelName": long, "details": { "brands": long } });
        let clean = sanitize_device_info(&obj(raw));
        assert_eq!(clean["modelName"].as_str().unwrap().len(), 500);
        assert_eq!(clean["details"]["brands"].as_str().unwrap().len(), 500);
    }

    #[test]
    fn sanitize_ignores_non_string_names() {
        let raw = json!({ "deviceName": 42, "modelName": ["a"] });
        let clean = sanitize_device_info(&obj(raw));
        assert!(clean.get("deviceName").is_none());
        assert!(clean.get("modelName").is_none());
    }
}
