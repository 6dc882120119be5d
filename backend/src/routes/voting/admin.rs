use diesel::result::Error;
use log::error;
use rocket::State;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;

use crate::AppState;
use crate::db::VotingDB;
use crate::models::{
    ActionResult, AddNameRequest, Name, NameCount, NewName, Submission, SubmissionResponse,
};
use crate::schema::{names, submissions};

const ERR_UNAUTHORIZED: &str = "Unauthorized.";
const ERR_EMPTY_NAME: &str = "Enter a name.";
const ERR_NAME_EXISTS: &str = "That name already exists.";
const ERR_GENERIC: &str = "Something went wrong. Please try again.";

fn is_admin(key: Option<&str>, state: &AppState) -> bool {
    key == Some(state.admin_secret.as_str())
}

// Admin action to add a selectable name
#[post("/admin/names", format = "json", data = "<add_request>")]
pub async fn add_name(
    mut db: Connection<VotingDB>,
    state: &State<AppState>,
    add_request: Json<AddNameRequest>,
) -> Result<Json<ActionResult>, Status> {
    if !is_admin(Some(add_request.key.as_str()), state) {
        return Ok(Json(ActionResult::error(ERR_UNAUTHORIZED)));
    }

    let name = add_request.name.trim();
    if name.is_empty() {
        return Ok(Json(ActionResult::error(ERR_EMPTY_NAME)));
    }

    let new_name = NewName {
        name: name.to_string(),
    };

    let result = diesel::insert_into(names::table)
        .values(&new_name)
        .execute(&mut db)
        .await;

    match result {
        Ok(_) => Ok(Json(ActionResult::ok())),
        Err(Error::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, _)) => {
            Ok(Json(ActionResult::error(ERR_NAME_EXISTS)))
        }
        Err(e) => {
            error!("Error adding name: {}", e);
            Ok(Json(ActionResult::error(ERR_GENERIC)))
        }
    }
}

// Admin view: vote counts per name, most voted first
#[get("/admin/counts?<key>")]
pub async fn get_counts(
    mut db: Connection<VotingDB>,
    state: &State<AppState>,
    key: Option<&str>,
) -> Result<Json<Vec<NameCount>>, Status> {
    if !is_admin(key, state) {
        return Err(Status::Unauthorized);
    }

    use diesel::dsl::count;

    let mut results: Vec<NameCount> = names::table
        .left_join(submissions::table)
        .group_by((names::id, names::name))
        .select((names::id, names::name, count(submissions::id.nullable())))
        .load::<(i32, String, i64)>(&mut db)
        .await
        .map_err(|e| {
            error!("Error loading counts: {}", e);
            Status::InternalServerError
        })?
        .into_iter()
        .map(|(id, name, votes)| NameCount { id, name, votes })
        .collect();

    results.sort_by(|a, b| b.votes.cmp(&a.votes));

    Ok(Json(results))
}

// Admin view: raw submissions with the voted name, newest first
#[get("/admin/submissions?<key>")]
pub async fn get_submissions(
    mut db: Connection<VotingDB>,
    state: &State<AppState>,
    key: Option<&str>,
) -> Result<Json<Vec<SubmissionResponse>>, Status> {
    if !is_admin(key, state) {
        return Err(Status::Unauthorized);
    }

    let rows = submissions::table
        .inner_join(names::table.on(submissions::name_id.eq(names::id)))
        .select((Submission::as_select(), Name::as_select()))
        .order(submissions::submitted_at.desc())
        .load::<(Submission, Name)>(&mut db)
        .await
        .map_err(|e| {
            error!("Error loading submissions: {}", e);
            Status::InternalServerError
        })?;

    let response: Vec<SubmissionResponse> = rows
        .into_iter()
        .map(|(submission, name)| SubmissionResponse {
            id: submission.id,
            name: name.name,
            device_id: submission.device_id,
            device_info: submission.device_info,
            fingerprint_hash: submission.fingerprint_hash,
            submitted_at: submission
                .submitted_at
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        })
        .collect();

    Ok(Json(response))
}
