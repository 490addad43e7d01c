use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::error::DoctorError;
use crate::models::{DoctorResponse, Roster};

#[axum::debug_handler]
pub async fn list_doctors(
    State(roster): State<Arc<Roster>>,
) -> Result<Json<Value>, AppError> {
    let doctors: Vec<DoctorResponse> = roster.doctors().iter().map(DoctorResponse::from).collect();

    Ok(Json(json!({
        "total": doctors.len(),
        "doctors": doctors,
    })))
}

/// Plain-text enumeration, identical to what the assistant shows in chat.
#[axum::debug_handler]
pub async fn doctor_summary(
    State(roster): State<Arc<Roster>>,
) -> String {
    roster.summary()
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(roster): State<Arc<Roster>>,
    Path(name): Path<String>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = roster
        .find(&name)
        .ok_or(DoctorError::UnknownDoctor(name))?;

    Ok(Json(DoctorResponse::from(doctor)))
}
