use thiserror::Error;

use doctor_cell::{AppointmentDate, DoctorError, SlotTime};
use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Appointment storage unavailable: {0}")]
    Persistence(String),

    #[error("{time} on {date} is already booked for {doctor_name}")]
    SlotTaken {
        doctor_name: String,
        date: AppointmentDate,
        time: SlotTime,
    },
}

impl From<DatabaseError> for LedgerError {
    fn from(err: DatabaseError) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error(transparent)]
    Doctor(#[from] DoctorError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("{time} is not available for {doctor_name} on {date}")]
    SlotUnavailable {
        doctor_name: String,
        date: AppointmentDate,
        time: SlotTime,
        available: Vec<SlotTime>,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Doctor(inner) => inner.into(),
            BookingError::Ledger(LedgerError::Persistence(msg)) => AppError::Database(msg),
            BookingError::Ledger(taken @ LedgerError::SlotTaken { .. }) => {
                AppError::Conflict(taken.to_string())
            }
            unavailable @ BookingError::SlotUnavailable { .. } => {
                AppError::Conflict(unavailable.to_string())
            }
            BookingError::Validation(msg) => AppError::ValidationError(msg),
        }
    }
}
