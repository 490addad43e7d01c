use async_trait::async_trait;

use doctor_cell::{AppointmentDate, SlotTime};

use crate::error::LedgerError;
use crate::models::{Appointment, NewAppointment};

/// Append-only store of booked appointments.
///
/// Implementations must refuse a second appointment for the same
/// `(doctor_name, date, time)` with [`LedgerError::SlotTaken`].
#[async_trait]
pub trait AppointmentLedger: Send + Sync {
    /// Times already booked for the doctor on `date`, ascending.
    async fn booked_slots(&self, doctor_name: &str, date: AppointmentDate) -> Result<Vec<SlotTime>, LedgerError>;

    /// Persist a booking, stamping `created_at` with the current time.
    async fn save(&self, appointment: NewAppointment) -> Result<Appointment, LedgerError>;

    async fn list_appointments(&self, doctor_name: &str, date: AppointmentDate) -> Result<Vec<Appointment>, LedgerError>;
}
