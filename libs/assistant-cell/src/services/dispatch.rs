use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use appointment_cell::{Availability, BookAppointmentRequest, BookingError, BookingService, LedgerError};
use doctor_cell::{DoctorError, SlotTime};

use crate::error::AssistantError;

pub const LIST_DOCTORS: &str = "get_list_of_doctors";
pub const LIST_AVAILABLE_SLOTS: &str = "get_available_slots";
pub const BOOK_APPOINTMENT: &str = "save_appointment";

pub const BOOKING_CONFIRMED: &str = "Appointment saved successfully!";
pub const UNKNOWN_REQUEST: &str = "I am not sure how to help you with that.";

const DOCTOR_NAME_HINT: &str = "Name of the doctor. Use get_list_of_doctors to get the list of doctors. Send the name of the doctor from the list along with proper case.";
const DATE_HINT: &str = "Date of the appointment. convert it to the format 'dd/mm/yyyy'";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotQuery {
    pub doctor_name: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingArgs {
    pub doctor_name: String,
    pub patient_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
}

impl From<BookingArgs> for BookAppointmentRequest {
    fn from(args: BookingArgs) -> Self {
        BookAppointmentRequest {
            doctor_name: args.doctor_name,
            patient_name: args.patient_name,
            appointment_date: args.appointment_date,
            appointment_time: args.appointment_time,
        }
    }
}

/// The operations a language model may ask for. Anything it returns is
/// validated into one of these before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    ListDoctors,
    ListAvailableSlots(SlotQuery),
    BookAppointment(BookingArgs),
}

/// Declaration of one capability as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilitySchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::ListDoctors => LIST_DOCTORS,
            Capability::ListAvailableSlots(_) => LIST_AVAILABLE_SLOTS,
            Capability::BookAppointment(_) => BOOK_APPOINTMENT,
        }
    }

    /// Resolve a model-chosen call. `arguments` is the raw JSON text the model
    /// produced; an empty string counts as `{}`.
    pub fn from_call(name: &str, arguments: &str) -> Result<Self, AssistantError> {
        match name {
            LIST_DOCTORS => Ok(Capability::ListDoctors),
            LIST_AVAILABLE_SLOTS => parse_arguments(name, arguments).map(Capability::ListAvailableSlots),
            BOOK_APPOINTMENT => parse_arguments(name, arguments).map(Capability::BookAppointment),
            other => Err(AssistantError::UnknownCapability(other.to_string())),
        }
    }

    pub fn schemas() -> Vec<CapabilitySchema> {
        vec![
            CapabilitySchema {
                name: LIST_DOCTORS,
                description: "Get the doctor names and their departments",
                parameters: json!({ "type": "object", "properties": {} }),
            },
            CapabilitySchema {
                name: LIST_AVAILABLE_SLOTS,
                description: "Get the available slots for the doctor on the given date",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "doctor_name": { "type": "string", "description": DOCTOR_NAME_HINT },
                        "date": { "type": "string", "description": DATE_HINT }
                    },
                    "required": ["doctor_name", "date"]
                }),
            },
            CapabilitySchema {
                name: BOOK_APPOINTMENT,
                description: "Save the appointment details",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "doctor_name": { "type": "string", "description": DOCTOR_NAME_HINT },
                        "patient_name": { "type": "string", "description": "Name of the patient." },
                        "appointment_date": { "type": "string", "description": DATE_HINT },
                        "appointment_time": {
                            "type": "string",
                            "description": "Provide the slot time in 'hh:mm' format. Use get_available_slots to get the available slots. slot time to be available in available slots else reject."
                        }
                    },
                    "required": ["doctor_name", "patient_name", "appointment_date", "appointment_time"]
                }),
            },
        ]
    }
}

fn parse_arguments<T: DeserializeOwned>(capability: &str, arguments: &str) -> Result<T, AssistantError> {
    let raw = if arguments.trim().is_empty() { "{}" } else { arguments };
    serde_json::from_str(raw).map_err(|e| AssistantError::InvalidArguments {
        capability: capability.to_string(),
        message: e.to_string(),
    })
}

fn render_slots(slots: &[SlotTime]) -> String {
    slots.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Runs capabilities against the booking service and renders every outcome,
/// failures included, as chat text.
#[derive(Clone)]
pub struct Dispatcher {
    booking: Arc<BookingService>,
}

impl Dispatcher {
    pub fn new(booking: Arc<BookingService>) -> Self {
        Self { booking }
    }

    pub async fn dispatch_call(&self, name: &str, arguments: &str) -> String {
        match Capability::from_call(name, arguments) {
            Ok(capability) => self.dispatch(capability).await,
            Err(AssistantError::UnknownCapability(name)) => {
                warn!("Model requested unknown capability '{}'", name);
                UNKNOWN_REQUEST.to_string()
            }
            Err(e) => {
                warn!("Rejected capability call: {}", e);
                format!("I could not understand the details of that request ({}). Please try again.", e)
            }
        }
    }

    pub async fn dispatch(&self, capability: Capability) -> String {
        debug!("Dispatching {}", capability.name());

        match capability {
            Capability::ListDoctors => self.booking.roster().summary(),
            Capability::ListAvailableSlots(query) => self.list_available_slots(query).await,
            Capability::BookAppointment(args) => self.book_appointment(args).await,
        }
    }

    async fn list_available_slots(&self, query: SlotQuery) -> String {
        let SlotQuery { doctor_name, date } = query;

        match self.booking.available_slots(&doctor_name, &date).await.map(Availability::into_slots) {
            Ok(slots) if slots.is_empty() => {
                format!("No slots available for {} on {}. Please choose another date.", doctor_name, date)
            }
            Ok(slots) => format!("Available slots for {} on {} are: {}", doctor_name, date, render_slots(&slots)),
            Err(BookingError::Doctor(DoctorError::InvalidDate(raw))) => invalid_date(&raw),
            Err(e) => {
                error!("Availability lookup for {} on {} failed: {}", doctor_name, date, e);
                "I could not check the availability right now. Please try again later.".to_string()
            }
        }
    }

    async fn book_appointment(&self, args: BookingArgs) -> String {
        match self.booking.book(args.into()).await {
            Ok(appointment) => {
                info!("Booked appointment {} through the assistant", appointment.id);
                BOOKING_CONFIRMED.to_string()
            }
            Err(e) => render_booking_error(e),
        }
    }
}

fn invalid_date(raw: &str) -> String {
    format!("'{}' is not a valid date. Please provide the date as dd/mm/yyyy.", raw)
}

fn render_booking_error(err: BookingError) -> String {
    match err {
        BookingError::Doctor(DoctorError::InvalidDate(raw)) => invalid_date(&raw),
        BookingError::Doctor(DoctorError::InvalidTime(raw)) => {
            format!("'{}' is not a valid time. Please provide the time as hh:mm.", raw)
        }
        BookingError::Doctor(DoctorError::UnknownDoctor(name)) => {
            format!("There is no doctor named {}. Please choose a doctor from the list.", name)
        }
        BookingError::SlotUnavailable { doctor_name, date, time, available } if available.is_empty() => {
            format!(
                "{} is not available for {} on {}. No slots are free on that date, please choose another date.",
                time, doctor_name, date
            )
        }
        BookingError::SlotUnavailable { doctor_name, date, time, available } => {
            format!(
                "{} is not available for {} on {}. Available slots are: {}",
                time, doctor_name, date, render_slots(&available)
            )
        }
        BookingError::Ledger(LedgerError::SlotTaken { doctor_name, date, time }) => {
            format!("{} is no longer available for {} on {}.", time, doctor_name, date)
        }
        BookingError::Validation(msg) => format!("The appointment could not be booked: {}.", msg),
        e @ (BookingError::Ledger(LedgerError::Persistence(_)) | BookingError::Doctor(DoctorError::Configuration(_))) => {
            error!("Booking failed: {}", e);
            "The appointment could not be saved right now. Please try again later.".to_string()
        }
    }
}
