use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scheduling_cell::SchedulingError;
use shared_storage::StorageError;

// ==============================================================================
// SESSION NOTE MODELS
// ==============================================================================

/// The four-level ordinal the practitioner assigns to every session,
/// tracked over time for trend reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Evaluation {
    Pessimo,
    Ruim,
    Bom,
    Otimo,
}

impl Evaluation {
    /// Position on the scale, 0 (pessimo) through 3 (otimo).
    pub fn rank(&self) -> u8 {
        match self {
            Evaluation::Pessimo => 0,
            Evaluation::Ruim => 1,
            Evaluation::Bom => 2,
            Evaluation::Otimo => 3,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Pessimo => write!(f, "pessimo"),
            Evaluation::Ruim => write!(f, "ruim"),
            Evaluation::Bom => write!(f, "bom"),
            Evaluation::Otimo => write!(f, "otimo"),
        }
    }
}

/// A dated clinical note. `appointment_id` links the note to the
/// appointment it documents; the documentation gate looks for that link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNote {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub date: DateTime<Utc>,
    pub content: String,
    pub appointment_id: Option<Uuid>,
    pub evaluation: Option<Evaluation>,
}

/// First phase of the two-phase note save: content captured, evaluation
/// still pending. Nothing persists until the draft is committed with an
/// evaluation.
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub content: String,
}

// ==============================================================================
// SESSION LIFECYCLE MODELS
// ==============================================================================

/// The consultation session's own state machine, separate from the
/// appointment status it eventually drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Ended,
    AwaitingPayment,
    ReceiptOffered,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Active => write!(f, "active"),
            SessionState::Ended => write!(f, "ended"),
            SessionState::AwaitingPayment => write!(f, "awaiting_payment"),
            SessionState::ReceiptOffered => write!(f, "receipt_offered"),
        }
    }
}

/// What the finalize gate found for the open patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentationStatus {
    pub anamnesis_complete: bool,
    pub todays_note_saved: bool,
}

impl DocumentationStatus {
    pub fn is_complete(&self) -> bool {
        self.anamnesis_complete && self.todays_note_saved
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.anamnesis_complete {
            missing.push("anamnesis");
        }
        if !self.todays_note_saved {
            missing.push("today's session note");
        }
        missing
    }
}

/// Data needed to offer the receipt after payment is confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub patient_name: String,
    pub amount: f64,
    pub method: String,
    pub date: NaiveDate,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConsultationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No patient record is open")]
    NoPatientOpen,

    #[error("No scheduled appointment for this patient today")]
    NoAppointmentToday,

    #[error("Session cannot leave the {0} state this way")]
    InvalidTransition(SessionState),

    #[error("Cannot finalize: missing {}", .missing.join(" and "))]
    IncompleteDocumentation { missing: Vec<&'static str> },

    #[error("Note content cannot be empty")]
    EmptyNote,

    #[error("A session note requires an evaluation before it is saved")]
    EvaluationRequired,

    #[error("Note not found")]
    NoteNotFound,

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
