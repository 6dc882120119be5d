use diesel::result::Error;
use log::error;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;
use serde_json::{Map, Value};

use crate::db::VotingDB;
use crate::fingerprint::ClientFingerprint;
use crate::models::{ActionResult, CastVoteRequest, Name, NewSubmission};
use crate::schema::{names, submissions};
use crate::validate;

const ERR_SELECT_NAME: &str = "Please select a name.";
const ERR_DEVICE_ID: &str = "Device ID is missing or invalid. Please refresh and try again.";
const ERR_INVALID_REQUEST: &str = "Invalid request.";
const ERR_DUPLICATE: &str = "You've already submitted this name from this device.";
const ERR_GENERIC: &str = "Something went wrong. Please try again.";

// Route to get the selectable names, ordered for the form
#[get("/names")]
pub async fn get_names(mut db: Connection<VotingDB>) -> Result<Json<Vec<Name>>, Status> {
    let results = names::table
        .order(names::name.asc())
        .load::<Name>(&mut db)
        .await
        .map_err(|e| {
            error!("Error loading names: {}", e);
            Status::InternalServerError
        })?;

    Ok(Json(results))
}

// Route to submit a vote. Validation happens up front so every rejection maps
// to one of the fixed user-facing messages; the database unique constraints
// stay authoritative for duplicates.
#[post("/vote", format = "json", data = "<vote_request>")]
pub async fn submit_vote(
    mut db: Connection<VotingDB>,
    fingerprint: ClientFingerprint,
    vote_request: Json<CastVoteRequest>,
) -> Result<Json<ActionResult>, Status> {
    let request = vote_request.into_inner();

    let Some(name_id) = request.name_id else {
        return Ok(Json(ActionResult::error(ERR_SELECT_NAME)));
    };

    let device_id = request.device_id.as_deref().unwrap_or("").trim();
    if !validate::is_valid_device_id(device_id) {
        return Ok(Json(ActionResult::error(ERR_DEVICE_ID)));
    }

    let mut device_info = Map::new();
    if let Some(raw) = request.device_info.as_deref() {
        if raw.len() > validate::DEVICE_INFO_MAX_RAW_LEN {
            return Ok(Json(ActionResult::error(ERR_INVALID_REQUEST)));
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => device_info = map,
            Ok(_) => {}
            Err(_) => return Ok(Json(ActionResult::error(ERR_INVALID_REQUEST))),
        }
    }

    if let Some(message) = validate::device_info_rejection(&device_info) {
        return Ok(Json(ActionResult::error(message)));
    }

    let model_name = device_info.get("modelName").and_then(Value::as_str);
    if let Some(message) = validate::model_rejection(model_name) {
        return Ok(Json(ActionResult::error(message)));
    }

    let stored_info = validate::sanitize_device_info(&device_info);

    // Selection must reference an existing name
    match names::table.find(name_id).first::<Name>(&mut db).await {
        Ok(_) => {}
        Err(Error::NotFound) => return Ok(Json(ActionResult::error(ERR_SELECT_NAME))),
        Err(e) => {
            error!("Error checking name {}: {}", name_id, e);
            return Ok(Json(ActionResult::error(ERR_GENERIC)));
        }
    }

    let ClientFingerprint(fingerprint_hash) = fingerprint;

    // Pre-checks exist only for the friendlier message; the race is resolved
    // by the unique constraints below.
    let device_count: i64 = submissions::table
        .filter(submissions::device_id.eq(device_id))
        .filter(submissions::name_id.eq(name_id))
        .count()
        .get_result(&mut db)
        .await
        .unwrap_or(0);

    if device_count > 0 {
        return Ok(Json(ActionResult::error(ERR_DUPLICATE)));
    }

    if let Some(hash) = fingerprint_hash.as_deref() {
        let fingerprint_count: i64 = submissions::table
            .filter(submissions::fingerprint_hash.eq(hash))
            .filter(submissions::name_id.eq(name_id))
            .count()
            .get_result(&mut db)
            .await
            .unwrap_or(0);

        if fingerprint_count > 0 {
            return Ok(Json(ActionResult::error(ERR_DUPLICATE)));
        }
    }

    let new_submission = NewSubmission {
        name_id,
        device_id: device_id.to_string(),
        device_info: stored_info,
        fingerprint_hash,
    };

    let result = diesel::insert_into(submissions::table)
        .values(&new_submission)
        .execute(&mut db)
        .await;

    match result {
        Ok(_) => Ok(Json(ActionResult::ok())),
        Err(Error::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, _)) => {
            Ok(Json(ActionResult::error(ERR_DUPLICATE)))
        }
        Err(e) => {
            error!("Error recording submission: {}", e);
            Ok(Json(ActionResult::error(ERR_GENERIC)))
        }
    }
}
