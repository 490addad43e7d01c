use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use doctor_cell::{AppointmentDate, SlotTime};
use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

use crate::error::LedgerError;
use crate::models::{Appointment, NewAppointment};
use crate::services::ledger::AppointmentLedger;

#[derive(Debug, Deserialize)]
struct BookedTimeRow {
    appointment_time: String,
}

/// Ledger backed by a PostgREST table.
///
/// `appointment_date` is a `text` column holding `dd/mm/yyyy`, so equality
/// filters never go through PostgreSQL date parsing. `appointment_time` may be
/// `text` or `time`; both `HH:MM` and `HH:MM:SS` are read back.
///
/// Double-booking is refused by a unique index over
/// `(doctor_name, appointment_date, appointment_time)`; a 409 from the API is
/// reported as [`LedgerError::SlotTaken`].
pub struct SupabaseLedger {
    supabase: SupabaseClient,
    table: String,
}

impl SupabaseLedger {
    pub fn new(config: &AppConfig) -> Result<Self, LedgerError> {
        Ok(Self {
            supabase: SupabaseClient::new(config)?,
            table: config.appointments_table.clone(),
        })
    }

    fn query_path(&self, doctor_name: &str, date: AppointmentDate, select: &str) -> String {
        format!(
            "/rest/v1/{}?doctor_name=eq.{}&appointment_date=eq.{}&select={}&order=appointment_time.asc",
            self.table,
            urlencoding::encode(doctor_name),
            urlencoding::encode(&date.to_string()),
            select,
        )
    }
}

#[async_trait]
impl AppointmentLedger for SupabaseLedger {
    async fn booked_slots(&self, doctor_name: &str, date: AppointmentDate) -> Result<Vec<SlotTime>, LedgerError> {
        debug!("Fetching booked slots for {} on {}", doctor_name, date);

        let path = self.query_path(doctor_name, date, "appointment_time");
        let rows: Vec<BookedTimeRow> = self.supabase.request(Method::GET, &path, None).await?;

        // an unreadable row could hide a booking, so it fails the whole query
        let mut times = rows
            .iter()
            .map(|row| {
                SlotTime::parse_stored(&row.appointment_time).map_err(|_| {
                    error!("Unreadable stored appointment time '{}' for {}", row.appointment_time, doctor_name);
                    LedgerError::Persistence(format!(
                        "stored appointment time '{}' is not HH:MM",
                        row.appointment_time
                    ))
                })
            })
            .collect::<Result<Vec<SlotTime>, LedgerError>>()?;
        times.sort();

        Ok(times)
    }

    async fn save(&self, appointment: NewAppointment) -> Result<Appointment, LedgerError> {
        let record = appointment.into_appointment();
        debug!("Saving appointment {} for {} with {}", record.id, record.patient_name, record.doctor_name);

        let body = json!({
            "id": record.id,
            "doctor_name": record.doctor_name,
            "patient_name": record.patient_name,
            "appointment_date": record.appointment_date,
            "appointment_time": record.appointment_time,
            "created_at": record.created_at.to_rfc3339(),
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/{}", self.table);
        let result: Result<Vec<Value>, DatabaseError> = self
            .supabase
            .request_with_headers(Method::POST, &path, Some(body), Some(headers))
            .await;

        match result {
            Ok(rows) if rows.is_empty() => {
                error!("Insert of appointment {} returned no representation", record.id);
                Err(LedgerError::Persistence("write not acknowledged".to_string()))
            }
            Ok(_) => Ok(record),
            Err(DatabaseError::Conflict(_)) => Err(LedgerError::SlotTaken {
                doctor_name: record.doctor_name,
                date: record.appointment_date,
                time: record.appointment_time,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_appointments(&self, doctor_name: &str, date: AppointmentDate) -> Result<Vec<Appointment>, LedgerError> {
        let path = self.query_path(doctor_name, date, "*");
        let appointments: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(appointments)
    }
}
