use chrono::NaiveDateTime;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::diesel::prelude::*;
use serde_json::Value;

use crate::schema::{names, submissions};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = names)]
pub struct Name {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = names)]
pub struct NewName {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = submissions)]
pub struct Submission {
    pub id: i32,
    pub name_id: i32,
    pub device_id: String,
    pub device_info: Value,
    pub fingerprint_hash: Option<String>,
    pub submitted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = submissions)]
pub struct NewSubmission {
    pub name_id: i32,
    pub device_id: String,
    pub device_info: Value,
    pub fingerprint_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct CastVoteRequest {
    #[serde(default)]
    pub name_id: Option<i32>,
    #[serde(default)]
    pub device_id: Option<String>,
    /// JSON-encoded device info from the client, kept as a string so the raw
    /// length can be capped before parsing.
    #[serde(default)]
    pub device_info: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AddNameRequest {
    pub key: String,
    pub name: String,
}

/// Ok/error result consumed by the submitting page.
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        ActionResult {
            ok: true,
            error: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ActionResult {
            ok: false,
            error: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct NameCount {
    pub id: i32,
    pub name: String,
    pub votes: i64,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SubmissionResponse {
    pub id: i32,
    pub name: String,
    pub device_id: String,
    pub device_info: Value,
    pub fingerprint_hash: Option<String>,
    pub submitted_at: String,
}

#[cfg(test)]
mod tests {
    use super::ActionResult;

    #[test]
    fn ok_result_omits_error_field() {
        let json = serde_json::to_string(&ActionResult::ok()).unwrap();
        assert_eq!(json, r#"{"ok":true}"#);
    }

    #[test]
    fn error_result_carries_message() {
        let json = serde_json::to_string(&ActionResult::error("Enter a name.")).unwrap();
        assert_eq!(json, r#"{"ok":false,"error":"Enter a name."}"#);
    }
}
