use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use doctor_cell::{available_slots, AppointmentDate, DoctorError, Roster, SlotTime};

use crate::error::{BookingError, LedgerError};
use crate::models::{Appointment, Availability, BookAppointmentRequest, NewAppointment};
use crate::services::ledger::AppointmentLedger;

/// Availability and booking over an injected roster and ledger.
#[derive(Clone)]
pub struct BookingService {
    roster: Arc<Roster>,
    ledger: Arc<dyn AppointmentLedger>,
}

impl BookingService {
    pub fn new(roster: Arc<Roster>, ledger: Arc<dyn AppointmentLedger>) -> Self {
        Self { roster, ledger }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ledger(&self) -> &dyn AppointmentLedger {
        self.ledger.as_ref()
    }

    /// Free slots for a doctor on a `dd/mm/yyyy` date, recomputed from the
    /// ledger on every call.
    pub async fn available_slots(&self, doctor_name: &str, date: &str) -> Result<Availability, BookingError> {
        let date: AppointmentDate = date.parse()?;
        self.availability_on(doctor_name, date).await
    }

    /// Same as [`available_slots`](Self::available_slots) for an already parsed date.
    pub async fn availability_on(&self, doctor_name: &str, date: AppointmentDate) -> Result<Availability, BookingError> {
        let Some(doctor) = self.roster.find(doctor_name) else {
            warn!("Availability requested for unknown doctor '{}'", doctor_name);
            return Ok(Availability::UnknownDoctor);
        };

        let booked: BTreeSet<SlotTime> = self
            .ledger
            .booked_slots(doctor_name, date)
            .await?
            .into_iter()
            .collect();

        let slots = available_slots(date, doctor, &booked);
        debug!("{} has {} free slots on {} ({} booked)", doctor_name, slots.len(), date, booked.len());

        Ok(Availability::Slots(slots))
    }

    /// Book a slot after re-checking that it is still free.
    pub async fn book(&self, request: BookAppointmentRequest) -> Result<Appointment, BookingError> {
        let date: AppointmentDate = request.appointment_date.parse()?;
        let time: SlotTime = request.appointment_time.parse()?;

        let patient_name = request.patient_name.trim();
        if patient_name.is_empty() {
            return Err(BookingError::Validation("patient name is required".to_string()));
        }

        let available = match self.availability_on(&request.doctor_name, date).await? {
            Availability::UnknownDoctor => {
                return Err(DoctorError::UnknownDoctor(request.doctor_name).into());
            }
            Availability::Slots(slots) => slots,
        };

        if !available.contains(&time) {
            warn!("Rejected booking of {} {} for {}: slot not available", date, time, request.doctor_name);
            return Err(BookingError::SlotUnavailable {
                doctor_name: request.doctor_name,
                date,
                time,
                available,
            });
        }

        let new_appointment = NewAppointment {
            doctor_name: request.doctor_name.clone(),
            patient_name: patient_name.to_string(),
            appointment_date: date,
            appointment_time: time,
        };

        match self.ledger.save(new_appointment).await {
            Ok(appointment) => {
                info!(
                    "Appointment {} saved: {} with {} on {} at {}",
                    appointment.id, appointment.patient_name, appointment.doctor_name, date, time
                );
                Ok(appointment)
            }
            // lost a race with another booking for the same slot
            Err(LedgerError::SlotTaken { doctor_name, date, time }) => Err(BookingError::SlotUnavailable {
                doctor_name,
                date,
                time,
                available: available.into_iter().filter(|slot| *slot != time).collect(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
