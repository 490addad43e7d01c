pub mod error;
pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

// Re-export all models and services for external use
pub use error::DoctorError;
pub use models::*;
pub use services::*;
