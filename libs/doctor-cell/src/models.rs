use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DoctorError;

// ==============================================================================
// TIME AND DATE VALUES
// ==============================================================================

/// A 24-hour `HH:MM` time of day. Ordering is chronological, which matches
/// the lexicographic ordering of the rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::new(minutes / 60, minutes % 60)
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    /// A time as read back from storage: `HH:MM`, or `HH:MM:SS` the way a
    /// PostgreSQL `time` column renders it. Seconds must be zero.
    pub fn parse_stored(raw: &str) -> Result<Self, DoctorError> {
        let trimmed = raw.trim();
        if trimmed.matches(':').count() < 2 {
            return trimmed.parse();
        }

        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .ok()
            .filter(|time| time.second() == 0 && time.nanosecond() == 0)
            .map(Self)
            .ok_or_else(|| DoctorError::InvalidTime(raw.to_string()))
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for SlotTime {
    type Err = DoctorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        // chrono tolerates a single-digit minute; "HH:MM" does not
        let well_formed = matches!(
            trimmed.split_once(':'),
            Some((h, m)) if (1..=2).contains(&h.len()) && m.len() == 2
        );

        if !well_formed {
            return Err(DoctorError::InvalidTime(raw.to_string()));
        }

        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map(Self)
            .map_err(|_| DoctorError::InvalidTime(raw.to_string()))
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_stored(&raw).map_err(de::Error::custom)
    }
}

/// A calendar date exchanged with callers as `dd/mm/yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppointmentDate(NaiveDate);

impl AppointmentDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }
}

impl fmt::Display for AppointmentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d/%m/%Y"))
    }
}

impl FromStr for AppointmentDate {
    type Err = DoctorError;

    /// Day-first `dd/mm/yyyy` (single-digit day or month allowed), or ISO
    /// `yyyy-mm-dd`. Never reinterpreted month-first.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();

        let parsed = if trimmed.contains('/') {
            match trimmed.split('/').collect::<Vec<_>>().as_slice() {
                [_, _, year] if year.len() == 4 => {
                    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()
                }
                _ => None,
            }
        } else {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
        };

        parsed
            .map(Self)
            .ok_or_else(|| DoctorError::InvalidDate(raw.to_string()))
    }
}

impl Serialize for AppointmentDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AppointmentDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// ==============================================================================
// ROSTER MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorRecord {
    pub name: String,
    pub department: String,
    pub available_days: HashSet<Weekday>,
    pub checkin_time: SlotTime,
    pub checkout_time: SlotTime,
    pub appointment_slot_minutes: u32,
}

impl DoctorRecord {
    pub fn works_on(&self, weekday: Weekday) -> bool {
        self.available_days.contains(&weekday)
    }
}

/// The immutable doctor roster, shared by reference for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    doctors: Vec<DoctorRecord>,
}

impl Roster {
    pub fn new(doctors: Vec<DoctorRecord>) -> Self {
        Self { doctors }
    }

    /// Records in roster order.
    pub fn doctors(&self) -> &[DoctorRecord] {
        &self.doctors
    }

    /// Exact, case-sensitive name match.
    pub fn find(&self, name: &str) -> Option<&DoctorRecord> {
        self.doctors.iter().find(|doctor| doctor.name == name)
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }

    /// `"<n>. <name> - <department>"` lines, 1-indexed.
    pub fn summary(&self) -> String {
        self.doctors
            .iter()
            .enumerate()
            .map(|(i, doctor)| format!("{}. {} - {}", i + 1, doctor.name, doctor.department))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// DTO for the doctor listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorResponse {
    pub name: String,
    pub department: String,
    pub available_days: Vec<String>,
    pub checkin_time: SlotTime,
    pub checkout_time: SlotTime,
    pub appointment_slot_minutes: u32,
}

impl From<&DoctorRecord> for DoctorResponse {
    fn from(doctor: &DoctorRecord) -> Self {
        let mut days: Vec<Weekday> = doctor.available_days.iter().copied().collect();
        days.sort_by_key(|day| day.num_days_from_monday());

        Self {
            name: doctor.name.clone(),
            department: doctor.department.clone(),
            available_days: days.into_iter().map(weekday_name).map(str::to_string).collect(),
            checkin_time: doctor.checkin_time,
            checkout_time: doctor.checkout_time,
            appointment_slot_minutes: doctor.appointment_slot_minutes,
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
