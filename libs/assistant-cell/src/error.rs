use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    #[error("Unknown capability '{0}'")]
    UnknownCapability(String),

    #[error("Invalid arguments for {capability}: {message}")]
    InvalidArguments {
        capability: String,
        message: String,
    },

    #[error("No active conversation with id {0}")]
    UnknownSession(Uuid),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Assistant configuration error: {0}")]
    Configuration(String),
}

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::UnknownCapability(_) | AssistantError::InvalidArguments { .. } => {
                AppError::BadRequest(err.to_string())
            }
            AssistantError::UnknownSession(_) => AppError::NotFound(err.to_string()),
            AssistantError::Llm(msg) => AppError::ExternalService(msg),
            AssistantError::Configuration(msg) => AppError::Internal(msg),
        }
    }
}
