use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use doctor_cell::{AppointmentDate, SlotTime};

use crate::error::LedgerError;
use crate::models::{Appointment, NewAppointment};
use crate::services::ledger::AppointmentLedger;

/// Process-local ledger used when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.appointments.read().await.is_empty()
    }
}

#[async_trait]
impl AppointmentLedger for InMemoryLedger {
    async fn booked_slots(&self, doctor_name: &str, date: AppointmentDate) -> Result<Vec<SlotTime>, LedgerError> {
        let appointments = self.appointments.read().await;

        let mut times: Vec<SlotTime> = appointments
            .iter()
            .filter(|a| a.doctor_name == doctor_name && a.appointment_date == date)
            .map(|a| a.appointment_time)
            .collect();
        times.sort();

        Ok(times)
    }

    async fn save(&self, appointment: NewAppointment) -> Result<Appointment, LedgerError> {
        // check and insert under one write lock
        let mut appointments = self.appointments.write().await;

        let taken = appointments.iter().any(|a| {
            a.occupies(&appointment.doctor_name, appointment.appointment_date, appointment.appointment_time)
        });
        if taken {
            return Err(LedgerError::SlotTaken {
                doctor_name: appointment.doctor_name,
                date: appointment.appointment_date,
                time: appointment.appointment_time,
            });
        }

        let record = appointment.into_appointment();
        debug!("Stored appointment {} in memory", record.id);
        appointments.push(record.clone());

        Ok(record)
    }

    async fn list_appointments(&self, doctor_name: &str, date: AppointmentDate) -> Result<Vec<Appointment>, LedgerError> {
        let appointments = self.appointments.read().await;

        let mut matching: Vec<Appointment> = appointments
            .iter()
            .filter(|a| a.doctor_name == doctor_name && a.appointment_date == date)
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.appointment_time);

        Ok(matching)
    }
}
