use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DoctorError {
    #[error("Roster configuration error: {0}")]
    Configuration(String),

    #[error("Invalid date '{0}', expected dd/mm/yyyy")]
    InvalidDate(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("No doctor named '{0}'")]
    UnknownDoctor(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::Configuration(msg) => AppError::Internal(msg),
            DoctorError::InvalidDate(_) | DoctorError::InvalidTime(_) => {
                AppError::ValidationError(err.to_string())
            }
            DoctorError::UnknownDoctor(_) => AppError::NotFound(err.to_string()),
        }
    }
}
