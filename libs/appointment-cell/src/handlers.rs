use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use doctor_cell::{AppointmentDate, DoctorError};
use shared_models::error::AppError;

use crate::error::BookingError;
use crate::models::{
    Appointment, Availability, AvailabilityQuery, AvailabilityResponse, BookAppointmentRequest,
};
use crate::services::BookingService;

#[axum::debug_handler]
pub async fn get_available_slots(
    State(service): State<Arc<BookingService>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date: AppointmentDate = query.date.parse()?;

    let slots = match service.availability_on(&query.doctor_name, date).await? {
        Availability::UnknownDoctor => {
            return Err(DoctorError::UnknownDoctor(query.doctor_name).into());
        }
        Availability::Slots(slots) => slots,
    };

    Ok(Json(AvailabilityResponse {
        doctor_name: query.doctor_name,
        date,
        total_slots: slots.len(),
        available_slots: slots,
    }))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(service): State<Arc<BookingService>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let date: AppointmentDate = query.date.parse()?;

    let appointments = service
        .ledger()
        .list_appointments(&query.doctor_name, date)
        .await
        .map_err(BookingError::from)?;

    Ok(Json(json!({
        "doctor_name": query.doctor_name,
        "date": date,
        "total": appointments.len(),
        "appointments": appointments,
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(service): State<Arc<BookingService>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = service.book(request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}
