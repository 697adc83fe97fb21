use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use shared_storage::Collection;
use shared_utils::Clock;

use crate::models::{ConsultationError, Evaluation, NoteDraft, SessionNote};

/// Session-note bookkeeping with the two-phase save the practice insists
/// on: text first, then a mandatory evaluation pick, and only then does
/// anything persist.
pub struct SessionNoteService {
    notes: Collection<SessionNote>,
    clock: Arc<dyn Clock>,
}

impl SessionNoteService {
    pub fn new(notes: Collection<SessionNote>, clock: Arc<dyn Clock>) -> Self {
        Self { notes, clock }
    }

    /// Phase one: capture the text. Rejects blank content; writes nothing.
    pub fn begin_note(
        &self,
        patient_id: Uuid,
        appointment_id: Option<Uuid>,
        content: &str,
    ) -> Result<NoteDraft, ConsultationError> {
        if content.trim().is_empty() {
            return Err(ConsultationError::EmptyNote);
        }
        Ok(NoteDraft {
            patient_id,
            appointment_id,
            content: content.to_string(),
        })
    }

    /// Phase two: the evaluation pick. Without one the draft is refused
    /// and nothing persists.
    pub fn commit_note(
        &self,
        draft: NoteDraft,
        evaluation: Option<Evaluation>,
    ) -> Result<SessionNote, ConsultationError> {
        let evaluation = evaluation.ok_or(ConsultationError::EvaluationRequired)?;

        let note = SessionNote {
            id: Uuid::new_v4(),
            patient_id: draft.patient_id,
            date: self.clock.instant(),
            content: draft.content,
            appointment_id: draft.appointment_id,
            evaluation: Some(evaluation),
        };

        let mut notes = self.notes.load()?;
        notes.insert(0, note.clone());
        self.notes.replace(&notes)?;

        info!(
            "Session note {} saved for patient {} (evaluation: {})",
            note.id, note.patient_id, evaluation
        );
        Ok(note)
    }

    /// Later edits touch content and evaluation only — the patient and
    /// appointment links are fixed at creation — and do not re-run the
    /// evaluation gate: clearing the evaluation stores none.
    pub fn edit_note(
        &self,
        note_id: Uuid,
        content: &str,
        evaluation: Option<Evaluation>,
    ) -> Result<SessionNote, ConsultationError> {
        if content.trim().is_empty() {
            return Err(ConsultationError::EmptyNote);
        }

        let mut notes = self.notes.load()?;
        let note = notes
            .iter_mut()
            .find(|note| note.id == note_id)
            .ok_or(ConsultationError::NoteNotFound)?;

        note.content = content.to_string();
        note.evaluation = evaluation;
        let updated = note.clone();
        self.notes.replace(&notes)?;

        info!("Session note {} updated", updated.id);
        Ok(updated)
    }

    /// All of a patient's notes, newest first.
    pub fn notes_for_patient(&self, patient_id: Uuid) -> Result<Vec<SessionNote>, ConsultationError> {
        let mut notes: Vec<_> = self
            .notes
            .load()?
            .into_iter()
            .filter(|note| note.patient_id == patient_id)
            .collect();
        notes.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(notes)
    }

    /// Whether any note documents the given appointment — the second half
    /// of the finalize gate.
    pub fn has_note_for_appointment(&self, appointment_id: Uuid) -> Result<bool, ConsultationError> {
        Ok(self
            .notes
            .load()?
            .iter()
            .any(|note| note.appointment_id == Some(appointment_id)))
    }
}
