use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers;
use crate::models::Roster;

pub fn doctor_routes(roster: Arc<Roster>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/summary", get(handlers::doctor_summary))
        .route("/{name}", get(handlers::get_doctor))
        .with_state(roster)
}
