// Routes module - organizes all HTTP route handlers

pub mod voting;

use std::path::Path;

use rocket::Request;
use rocket::fs::NamedFile;
use rocket::http::Status;

use crate::AppState;

/// 404 error handler - serves custom 404.html page
#[catch(404)]
pub async fn not_found(request: &Request<'_>) -> Option<NamedFile> {
    let static_dir = request
        .rocket()
        .state::<AppState>()
        .map(|state| state.static_dir.as_str())
        .unwrap_or("static");
    NamedFile::open(Path::new(static_dir).join("404.html"))
        .await
        .ok()
}

#[catch(401)]
pub fn unauthorized() -> Status {
    Status::Unauthorized
}
