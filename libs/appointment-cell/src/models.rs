use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::{AppointmentDate, SlotTime};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub Uuid);

impl AppointmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted booking. Append-only: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub doctor_name: String,
    pub patient_name: String,
    pub appointment_date: AppointmentDate,
    pub appointment_time: SlotTime,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn occupies(&self, doctor_name: &str, date: AppointmentDate, time: SlotTime) -> bool {
        self.doctor_name == doctor_name && self.appointment_date == date && self.appointment_time == time
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub doctor_name: String,
    pub patient_name: String,
    pub appointment_date: AppointmentDate,
    pub appointment_time: SlotTime,
}

impl NewAppointment {
    pub(crate) fn into_appointment(self) -> Appointment {
        Appointment {
            id: AppointmentId::new(),
            doctor_name: self.doctor_name,
            patient_name: self.patient_name,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            created_at: Utc::now(),
        }
    }
}

// ==============================================================================
// REQUEST / RESPONSE DTOs
// ==============================================================================

/// Booking input as supplied by callers: date `dd/mm/yyyy`, time `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_name: String,
    pub patient_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_name: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub doctor_name: String,
    pub date: AppointmentDate,
    pub available_slots: Vec<SlotTime>,
    pub total_slots: usize,
}

/// Result of an availability lookup by doctor name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    UnknownDoctor,
    Slots(Vec<SlotTime>),
}

impl Availability {
    /// Unknown doctors have no slots.
    pub fn into_slots(self) -> Vec<SlotTime> {
        match self {
            Availability::UnknownDoctor => Vec::new(),
            Availability::Slots(slots) => slots,
        }
    }
}
