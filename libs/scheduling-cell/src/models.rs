use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_storage::StorageError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A booked clinical slot. `patient_name` and `price` are snapshots taken
/// at booking time: renaming the patient or repricing the consultation
/// type later never rewrites an existing appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub consultation_type_id: Uuid,
    pub price: f64,
    #[serde(default)]
    pub reminder_sent: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    /// Completed and canceled appointments never change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Canceled
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Canceled => write!(f, "canceled"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub consultation_type_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct RescheduleAppointmentRequest {
    pub appointment_id: Uuid,
    pub new_date: NaiveDate,
    pub new_time: NaiveTime,
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// Booking-calendar verdict for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayAvailability {
    pub is_past: bool,
    pub is_holiday: bool,
    pub is_full: bool,
    pub available_count: u32,
}

impl DayAvailability {
    pub fn is_bookable(&self) -> bool {
        !self.is_past && !self.is_holiday && !self.is_full
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid appointment time: {0}")]
    Temporal(String),

    #[error("Appointment conflicts with an existing booking")]
    Conflict,

    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
