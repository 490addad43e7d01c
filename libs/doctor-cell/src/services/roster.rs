use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Weekday;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::DoctorError;
use crate::models::{DoctorRecord, Roster, SlotTime};

// Wire shape of the roster document
#[derive(Debug, Deserialize)]
struct RosterDocument {
    doctor_list: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterEntry {
    name: String,
    department: String,
    available_days: Vec<String>,
    checkin_time: String,
    checkout_time: String,
    #[serde(rename = "appointmentSlotInMin")]
    appointment_slot_in_min: SlotLength,
}

// Some rosters carry the slot length as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SlotLength {
    Minutes(i64),
    Text(String),
}

pub struct RosterService;

impl RosterService {
    /// Read the roster document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Roster, DoctorError> {
        let path = path.as_ref();
        debug!("Loading doctor roster from {}", path.display());

        let raw = fs::read_to_string(path).map_err(|e| {
            DoctorError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        let roster = Self::parse(&raw)?;
        info!("Loaded {} doctors from {}", roster.len(), path.display());
        Ok(roster)
    }

    pub fn parse(raw: &str) -> Result<Roster, DoctorError> {
        let document: RosterDocument = serde_json::from_str(raw)
            .map_err(|e| DoctorError::Configuration(format!("malformed roster: {}", e)))?;

        let mut seen = HashSet::new();
        let mut doctors = Vec::with_capacity(document.doctor_list.len());

        for entry in document.doctor_list {
            let doctor = Self::into_record(entry)?;
            if !seen.insert(doctor.name.clone()) {
                return Err(DoctorError::Configuration(format!(
                    "duplicate doctor name '{}'",
                    doctor.name
                )));
            }
            doctors.push(doctor);
        }

        if doctors.is_empty() {
            warn!("Doctor roster is empty");
        }

        Ok(Roster::new(doctors))
    }

    fn into_record(entry: RosterEntry) -> Result<DoctorRecord, DoctorError> {
        let name = entry.name.trim().to_string();
        if name.is_empty() {
            return Err(DoctorError::Configuration("doctor with empty name".to_string()));
        }

        let available_days = entry
            .available_days
            .iter()
            .map(|day| {
                day.trim().parse::<Weekday>().map_err(|_| {
                    DoctorError::Configuration(format!("{}: unknown weekday '{}'", name, day))
                })
            })
            .collect::<Result<HashSet<_>, _>>()?;

        let checkin_time = Self::parse_time(&name, "checkinTime", &entry.checkin_time)?;
        let checkout_time = Self::parse_time(&name, "checkoutTime", &entry.checkout_time)?;

        let minutes = match entry.appointment_slot_in_min {
            SlotLength::Minutes(minutes) => Some(minutes),
            SlotLength::Text(text) => text.trim().parse::<i64>().ok(),
        };
        let appointment_slot_minutes = minutes
            .filter(|m| *m > 0)
            .and_then(|m| u32::try_from(m).ok())
            .ok_or_else(|| {
                DoctorError::Configuration(format!(
                    "{}: appointmentSlotInMin must be a positive number of minutes",
                    name
                ))
            })?;

        if checkin_time >= checkout_time {
            warn!("{} has no working window ({} - {})", name, checkin_time, checkout_time);
        }

        Ok(DoctorRecord {
            name,
            department: entry.department.trim().to_string(),
            available_days,
            checkin_time,
            checkout_time,
            appointment_slot_minutes,
        })
    }

    fn parse_time(name: &str, field: &str, raw: &str) -> Result<SlotTime, DoctorError> {
        raw.parse::<SlotTime>().map_err(|_| {
            DoctorError::Configuration(format!("{}: {} '{}' is not HH:MM", name, field, raw))
        })
    }
}
