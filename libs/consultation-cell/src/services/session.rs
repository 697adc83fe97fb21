use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use scheduling_cell::{Appointment, AppointmentBookingService};
use shared_models::{Anamnesis, Ledger, PatientDirectory, Transaction, TransactionKind};
use shared_utils::Clock;

use crate::models::{
    ConsultationError, DocumentationStatus, Evaluation, NoteDraft, PaymentReceipt, SessionNote,
    SessionState,
};
use crate::services::notes::SessionNoteService;
use crate::services::timer::SessionTimer;

/// Drives a single consultation from "record opened" to "paid and
/// receipted": Idle -> Active -> Ended -> AwaitingPayment ->
/// ReceiptOffered -> Idle. Clinical documentation must exist before the
/// payment step is reachable, and the payment step is the only place a
/// ledger entry is born.
pub struct ConsultationSessionController {
    patients: Arc<dyn PatientDirectory>,
    booking: Arc<AppointmentBookingService>,
    notes: SessionNoteService,
    ledger: Arc<dyn Ledger>,
    clock: Arc<dyn Clock>,

    state: SessionState,
    patient_id: Option<Uuid>,
    todays_appointment: Option<Appointment>,
    timer: Option<SessionTimer>,
    last_elapsed: u64,
    receipt: Option<PaymentReceipt>,
}

impl ConsultationSessionController {
    pub fn new(
        patients: Arc<dyn PatientDirectory>,
        booking: Arc<AppointmentBookingService>,
        notes: SessionNoteService,
        ledger: Arc<dyn Ledger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            patients,
            booking,
            notes,
            ledger,
            clock,
            state: SessionState::Idle,
            patient_id: None,
            todays_appointment: None,
            timer: None,
            last_elapsed: 0,
            receipt: None,
        }
    }

    /// Opens a patient's record in consultation mode, resolving their
    /// appointment for today (scheduled only — a completed one no longer
    /// shows up here). Replaces any session in progress.
    pub fn open(&mut self, patient_id: Uuid) -> Result<(), ConsultationError> {
        self.close();

        let patient = self
            .patients
            .find_by_id(patient_id)
            .ok_or_else(|| ConsultationError::Validation("unknown patient".to_string()))?;
        self.todays_appointment = self
            .booking
            .scheduled_for_patient_on(patient.id, self.clock.today())?;
        self.patient_id = Some(patient.id);

        debug!(
            "Record opened for {} (today's appointment: {})",
            patient.name,
            self.todays_appointment.is_some()
        );
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn todays_appointment(&self) -> Option<&Appointment> {
        self.todays_appointment.as_ref()
    }

    /// Seconds on the session clock: live while Active, frozen afterward.
    pub fn elapsed_secs(&self) -> u64 {
        self.timer
            .as_ref()
            .map(|timer| timer.elapsed_secs())
            .unwrap_or(self.last_elapsed)
    }

    /// The start action is only offered when today's appointment exists
    /// and the session has not begun.
    pub fn can_start(&self) -> bool {
        self.state == SessionState::Idle && self.todays_appointment.is_some()
    }

    pub fn start(&mut self) -> Result<(), ConsultationError> {
        self.require_open_patient()?;
        if self.state != SessionState::Idle {
            return Err(ConsultationError::InvalidTransition(self.state));
        }
        if self.todays_appointment.is_none() {
            return Err(ConsultationError::NoAppointmentToday);
        }

        self.timer = Some(SessionTimer::start());
        self.last_elapsed = 0;
        self.state = SessionState::Active;
        info!("Consultation started");
        Ok(())
    }

    /// Stops the clock. The appointment status is untouched; whether the
    /// session can be finalized is decided separately.
    pub fn end(&mut self) -> Result<(), ConsultationError> {
        if self.state != SessionState::Active {
            return Err(ConsultationError::InvalidTransition(self.state));
        }
        if let Some(timer) = self.timer.take() {
            self.last_elapsed = timer.stop();
        }
        self.state = SessionState::Ended;
        info!("Consultation ended after {}s", self.last_elapsed);
        Ok(())
    }

    /// What the finalize gate currently sees for the open patient.
    pub fn documentation_status(&self) -> Result<DocumentationStatus, ConsultationError> {
        let patient_id = self.require_open_patient()?;

        // Re-read the patient: the anamnesis may have been filled in since
        // the record was opened.
        let anamnesis_complete = self
            .patients
            .find_by_id(patient_id)
            .and_then(|patient| patient.anamnesis)
            .map(|anamnesis| anamnesis.has_any_content())
            .unwrap_or(false);

        let todays_note_saved = match &self.todays_appointment {
            Some(appointment) => self.notes.has_note_for_appointment(appointment.id)?,
            None => false,
        };

        Ok(DocumentationStatus {
            anamnesis_complete,
            todays_note_saved,
        })
    }

    pub fn can_finalize(&self) -> bool {
        self.state == SessionState::Ended
            && self
                .documentation_status()
                .map(|status| status.is_complete())
                .unwrap_or(false)
    }

    /// Ended -> AwaitingPayment, but only with the documentation gate
    /// satisfied; otherwise the error names exactly what is missing.
    pub fn request_finalize(&mut self) -> Result<(), ConsultationError> {
        if self.state != SessionState::Ended {
            return Err(ConsultationError::InvalidTransition(self.state));
        }
        if self.todays_appointment.is_none() {
            return Err(ConsultationError::NoAppointmentToday);
        }

        let status = self.documentation_status()?;
        if !status.is_complete() {
            let missing = status.missing();
            warn!("Finalize blocked, missing: {}", missing.join(", "));
            return Err(ConsultationError::IncompleteDocumentation { missing });
        }

        self.state = SessionState::AwaitingPayment;
        Ok(())
    }

    /// The payment confirmation: completes the appointment, emits the one
    /// income transaction for its snapshotted price, and readies the
    /// receipt. There is no way back from AwaitingPayment — the only
    /// remaining choice is whether to print the receipt.
    pub fn confirm_payment(&mut self, method: &str) -> Result<PaymentReceipt, ConsultationError> {
        if self.state != SessionState::AwaitingPayment {
            return Err(ConsultationError::InvalidTransition(self.state));
        }
        let appointment = self
            .todays_appointment
            .clone()
            .ok_or(ConsultationError::NoAppointmentToday)?;

        // The status transition is the guarded step; once it commits, the
        // ledger entry and receipt follow unconditionally.
        let completed = self.booking.mark_completed(appointment.id)?;

        self.ledger.append(Transaction {
            id: Uuid::new_v4(),
            description: format!("Consulta - {} ({})", completed.patient_name, method),
            amount: completed.price,
            kind: TransactionKind::Income,
            date: completed.date,
            patient_id: Some(completed.patient_id),
        });

        let receipt = PaymentReceipt {
            patient_name: completed.patient_name.clone(),
            amount: completed.price,
            method: method.to_string(),
            date: completed.date,
        };

        info!(
            "Consultation finalized for {}: {:.2} via {}",
            completed.patient_name, completed.price, method
        );

        self.timer = None;
        self.todays_appointment = Some(completed);
        self.receipt = Some(receipt.clone());
        self.state = SessionState::ReceiptOffered;
        Ok(receipt)
    }

    /// Accepting the offer hands back the receipt data for rendering;
    /// either way the session is over.
    pub fn accept_receipt(&mut self) -> Result<PaymentReceipt, ConsultationError> {
        if self.state != SessionState::ReceiptOffered {
            return Err(ConsultationError::InvalidTransition(self.state));
        }
        let receipt = self
            .receipt
            .take()
            .ok_or(ConsultationError::InvalidTransition(self.state))?;
        self.close();
        Ok(receipt)
    }

    pub fn decline_receipt(&mut self) -> Result<(), ConsultationError> {
        if self.state != SessionState::ReceiptOffered {
            return Err(ConsultationError::InvalidTransition(self.state));
        }
        self.close();
        Ok(())
    }

    /// Navigation-away exit: valid from every state, idempotent, and the
    /// timer never survives it.
    pub fn close(&mut self) {
        self.timer = None;
        self.last_elapsed = 0;
        self.state = SessionState::Idle;
        self.patient_id = None;
        self.todays_appointment = None;
        self.receipt = None;
    }

    // ==============================================================================
    // DOCUMENTATION DURING THE SESSION
    // ==============================================================================

    /// Phase one of the note save: capture the text for the open patient,
    /// linked to today's appointment when there is one.
    pub fn draft_note(&self, content: &str) -> Result<NoteDraft, ConsultationError> {
        let patient_id = self.require_open_patient()?;
        let appointment_id = self.todays_appointment.as_ref().map(|a| a.id);
        self.notes.begin_note(patient_id, appointment_id, content)
    }

    /// Phase two: the evaluation pick persists the draft.
    pub fn save_note(
        &self,
        draft: NoteDraft,
        evaluation: Option<Evaluation>,
    ) -> Result<SessionNote, ConsultationError> {
        self.notes.commit_note(draft, evaluation)
    }

    pub fn edit_note(
        &self,
        note_id: Uuid,
        content: &str,
        evaluation: Option<Evaluation>,
    ) -> Result<SessionNote, ConsultationError> {
        self.notes.edit_note(note_id, content, evaluation)
    }

    pub fn patient_notes(&self) -> Result<Vec<SessionNote>, ConsultationError> {
        let patient_id = self.require_open_patient()?;
        self.notes.notes_for_patient(patient_id)
    }

    /// Writes the reduced anamnesis back through the patient directory.
    pub fn save_anamnesis(&self, anamnesis: Anamnesis) -> Result<(), ConsultationError> {
        let patient_id = self.require_open_patient()?;
        if !self.patients.update_anamnesis(patient_id, anamnesis) {
            return Err(ConsultationError::Validation("unknown patient".to_string()));
        }
        info!("Anamnesis updated for patient {}", patient_id);
        Ok(())
    }

    fn require_open_patient(&self) -> Result<Uuid, ConsultationError> {
        self.patient_id.ok_or(ConsultationError::NoPatientOpen)
    }
}
