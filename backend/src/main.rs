// Main application entry point

#[macro_use]
extern crate rocket;

mod config;
mod db;
mod fingerprint;
mod models;
mod routes;
mod schema;
mod validate;

use rocket::fairing::AdHoc;
use rocket::fs::FileServer;
use rocket_db_pools::Database;

use config::AppConfig;
use db::VotingDB;
use routes::voting;

/// Configuration shared with request handlers.
pub struct AppState {
    pub admin_secret: String,
    pub fingerprint_secret: Option<String>,
    pub static_dir: String,
}

#[rocket::launch]
fn rocket() -> _ {
    let app_config = AppConfig::load();

    let figment = rocket::config::Config::figment()
        .merge(("port", app_config.rocket_port))
        .merge((
            "databases.voting_db",
            rocket_db_pools::Config {
                url: app_config.database_url.clone(),
                min_connections: None,
                max_connections: 1024,
                connect_timeout: 3,
                idle_timeout: None,
                extensions: None,
            },
        ));

    rocket::custom(figment)
        .attach(VotingDB::init())
        .attach(AdHoc::on_ignite("Database Migrations", db::run_migrations))
        .attach(AdHoc::on_ignite("Database Seeding", db::run_seeding))
        .manage(AppState {
            admin_secret: app_config.admin_secret.clone(),
            fingerprint_secret: app_config.fingerprint_secret.clone(),
            static_dir: app_config.static_dir.clone(),
        })
        .mount(
            "/api",
            routes![
                voting::client::get_names,
                voting::client::submit_vote,
                voting::admin::add_name,
                voting::admin::get_counts,
                voting::admin::get_submissions,
            ],
        )
        .mount("/", FileServer::from(app_config.static_dir.clone()))
        .register(
            "/",
            catchers![routes::not_found, routes::unauthorized],
        )
}
