use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use consultation_cell::{
    ConsultationError, ConsultationSessionController, Evaluation, SessionNoteService, SessionState,
};
use scheduling_cell::{
    AppointmentBookingService, AppointmentStatus, BookAppointmentRequest, SchedulingError,
};
use shared_models::{Anamnesis, Patient, TransactionKind};
use shared_storage::{Collection, KeyValueStore, MemoryStore};
use shared_utils::test_utils::{
    init_tracing, minimally_filled_anamnesis, sample_consultation_type, sample_patient, FixedClock,
    InMemoryCatalog, InMemoryPatients, RecordingLedger,
};

struct Fixture {
    controller: ConsultationSessionController,
    booking: Arc<AppointmentBookingService>,
    catalog: Arc<InMemoryCatalog>,
    ledger: Arc<RecordingLedger>,
    patient: Patient,
    consultation_type_id: Uuid,
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn fixture() -> Fixture {
    init_tracing();
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let patient = sample_patient("Beatriz Ramos");
    let consultation_type = sample_consultation_type("Sessão de análise", 150.0);

    let patients = Arc::new(InMemoryPatients::with(vec![patient.clone()]));
    let catalog = Arc::new(InMemoryCatalog::with(vec![consultation_type.clone()]));
    let ledger = Arc::new(RecordingLedger::default());
    let clock = Arc::new(FixedClock::at(today(), time(13, 0)));

    let booking = Arc::new(AppointmentBookingService::new(
        Collection::new(store.clone(), "appointments"),
        patients.clone(),
        catalog.clone(),
        clock.clone(),
    ));
    let notes = SessionNoteService::new(Collection::new(store, "notes"), clock.clone());

    Fixture {
        controller: ConsultationSessionController::new(
            patients,
            booking.clone(),
            notes,
            ledger.clone(),
            clock,
        ),
        booking,
        catalog,
        ledger,
        patient,
        consultation_type_id: consultation_type.id,
    }
}

fn book_today(fixture: &Fixture) -> Uuid {
    fixture
        .booking
        .create(BookAppointmentRequest {
            patient_id: fixture.patient.id,
            date: today(),
            time: time(14, 0),
            consultation_type_id: fixture.consultation_type_id,
        })
        .unwrap()
        .id
}

#[tokio::test]
async fn start_needs_todays_appointment() {
    let mut fixture = fixture();
    fixture.controller.open(fixture.patient.id).unwrap();

    assert!(!fixture.controller.can_start());
    assert_matches!(
        fixture.controller.start(),
        Err(ConsultationError::NoAppointmentToday)
    );
    assert_eq!(fixture.controller.state(), SessionState::Idle);
}

#[tokio::test]
async fn open_rejects_unknown_patients() {
    let mut fixture = fixture();
    assert_matches!(
        fixture.controller.open(Uuid::new_v4()),
        Err(ConsultationError::Validation(_))
    );
}

#[tokio::test(start_paused = true)]
async fn full_session_books_exactly_one_income_transaction() {
    let mut fixture = fixture();
    let appointment_id = book_today(&fixture);

    fixture.controller.open(fixture.patient.id).unwrap();
    assert!(fixture.controller.can_start());

    fixture.controller.start().unwrap();
    assert_eq!(fixture.controller.state(), SessionState::Active);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(fixture.controller.elapsed_secs(), 2);

    fixture.controller.end().unwrap();
    assert_eq!(fixture.controller.state(), SessionState::Ended);

    // Nothing documented yet: the gate names both missing pieces.
    let blocked = fixture.controller.request_finalize();
    assert_matches!(
        blocked,
        Err(ConsultationError::IncompleteDocumentation { ref missing })
            if missing.contains(&"anamnesis") && missing.len() == 2
    );
    assert_eq!(fixture.controller.state(), SessionState::Ended);

    // Fill the anamnesis; the note is still missing.
    fixture
        .controller
        .save_anamnesis(minimally_filled_anamnesis())
        .unwrap();
    let status = fixture.controller.documentation_status().unwrap();
    assert!(status.anamnesis_complete);
    assert!(!status.todays_note_saved);

    // Save today's note through the two-phase flow.
    let draft = fixture.controller.draft_note("Sessão produtiva.").unwrap();
    let note = fixture.controller.save_note(draft, Some(Evaluation::Bom)).unwrap();
    assert_eq!(note.appointment_id, Some(appointment_id));

    fixture.controller.request_finalize().unwrap();
    assert_eq!(fixture.controller.state(), SessionState::AwaitingPayment);

    // A catalog price change after booking must not leak into the charge.
    fixture.catalog.set_price(fixture.consultation_type_id, 480.0);

    let receipt = fixture.controller.confirm_payment("Pix").unwrap();
    assert_eq!(receipt.amount, 150.0);
    assert_eq!(receipt.method, "Pix");
    assert_eq!(receipt.patient_name, "Beatriz Ramos");
    assert_eq!(fixture.controller.state(), SessionState::ReceiptOffered);

    let transactions = fixture.ledger.transactions();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, 150.0);
    assert_eq!(transactions[0].kind, TransactionKind::Income);
    assert!(transactions[0].description.contains("Beatriz Ramos"));
    assert!(transactions[0].description.contains("Pix"));
    assert_eq!(transactions[0].patient_id, Some(fixture.patient.id));

    let stored = fixture.booking.find(appointment_id).unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
    assert!(!stored.reminder_sent);

    let printed = fixture.controller.accept_receipt().unwrap();
    assert_eq!(printed, receipt);
    assert_eq!(fixture.controller.state(), SessionState::Idle);
}

#[tokio::test]
async fn all_empty_anamnesis_fails_the_gate_citing_anamnesis() {
    let mut fixture = fixture();
    book_today(&fixture);

    fixture.controller.open(fixture.patient.id).unwrap();
    fixture.controller.start().unwrap();

    // An anamnesis record exists but every field is blank or false.
    fixture.controller.save_anamnesis(Anamnesis::default()).unwrap();
    let draft = fixture.controller.draft_note("Primeira sessão.").unwrap();
    fixture
        .controller
        .save_note(draft, Some(Evaluation::Otimo))
        .unwrap();

    fixture.controller.end().unwrap();
    let err = fixture.controller.request_finalize().unwrap_err();
    assert_matches!(
        err,
        ConsultationError::IncompleteDocumentation { ref missing }
            if missing.as_slice() == ["anamnesis"]
    );
    assert!(err.to_string().contains("anamnesis"));
}

#[tokio::test]
async fn note_save_requires_an_evaluation() {
    let mut fixture = fixture();
    book_today(&fixture);
    fixture.controller.open(fixture.patient.id).unwrap();

    let draft = fixture.controller.draft_note("Anotação da sessão.").unwrap();
    assert_matches!(
        fixture.controller.save_note(draft.clone(), None),
        Err(ConsultationError::EvaluationRequired)
    );
    // Nothing persisted by the refused draft.
    assert!(fixture.controller.patient_notes().unwrap().is_empty());

    let note = fixture
        .controller
        .save_note(draft, Some(Evaluation::Ruim))
        .unwrap();
    assert_eq!(note.evaluation, Some(Evaluation::Ruim));
    assert_eq!(fixture.controller.patient_notes().unwrap().len(), 1);
}

#[tokio::test]
async fn editing_a_note_skips_the_evaluation_gate() {
    let mut fixture = fixture();
    book_today(&fixture);
    fixture.controller.open(fixture.patient.id).unwrap();

    let draft = fixture.controller.draft_note("Texto original.").unwrap();
    let note = fixture
        .controller
        .save_note(draft, Some(Evaluation::Bom))
        .unwrap();

    // Clearing the evaluation on edit stores none instead of re-prompting.
    let edited = fixture
        .controller
        .edit_note(note.id, "Texto revisado.", None)
        .unwrap();
    assert_eq!(edited.content, "Texto revisado.");
    assert_eq!(edited.evaluation, None);
    assert_eq!(edited.appointment_id, note.appointment_id);

    assert_matches!(
        fixture.controller.edit_note(note.id, "   ", None),
        Err(ConsultationError::EmptyNote)
    );
}

#[tokio::test]
async fn blank_drafts_are_refused() {
    let mut fixture = fixture();
    book_today(&fixture);
    fixture.controller.open(fixture.patient.id).unwrap();
    assert_matches!(
        fixture.controller.draft_note("   "),
        Err(ConsultationError::EmptyNote)
    );
}

#[tokio::test]
async fn transitions_outside_the_happy_path_are_rejected() {
    let mut fixture = fixture();
    book_today(&fixture);
    fixture.controller.open(fixture.patient.id).unwrap();

    // end before start
    assert_matches!(
        fixture.controller.end(),
        Err(ConsultationError::InvalidTransition(SessionState::Idle))
    );

    fixture.controller.start().unwrap();
    // finalize while still running
    assert_matches!(
        fixture.controller.request_finalize(),
        Err(ConsultationError::InvalidTransition(SessionState::Active))
    );
    // double start
    assert_matches!(
        fixture.controller.start(),
        Err(ConsultationError::InvalidTransition(SessionState::Active))
    );

    fixture.controller.end().unwrap();
    // payment without passing the gate first
    assert_matches!(
        fixture.controller.confirm_payment("Pix"),
        Err(ConsultationError::InvalidTransition(SessionState::Ended))
    );
}

#[tokio::test]
async fn close_is_a_safe_exit_from_any_state() {
    let mut fixture = fixture();
    book_today(&fixture);
    fixture.controller.open(fixture.patient.id).unwrap();
    fixture.controller.start().unwrap();

    fixture.controller.close();
    assert_eq!(fixture.controller.state(), SessionState::Idle);
    assert_eq!(fixture.controller.elapsed_secs(), 0);

    // Idempotent, including with nothing open.
    fixture.controller.close();
    assert_eq!(fixture.controller.state(), SessionState::Idle);
    assert!(fixture.ledger.transactions().is_empty());
}

#[tokio::test]
async fn completed_appointment_cannot_be_finalized_twice() {
    let mut fixture = fixture();
    let appointment_id = book_today(&fixture);

    fixture.controller.open(fixture.patient.id).unwrap();
    fixture.controller.start().unwrap();
    fixture
        .controller
        .save_anamnesis(minimally_filled_anamnesis())
        .unwrap();
    let draft = fixture.controller.draft_note("Sessão.").unwrap();
    fixture
        .controller
        .save_note(draft, Some(Evaluation::Bom))
        .unwrap();
    fixture.controller.end().unwrap();
    fixture.controller.request_finalize().unwrap();
    fixture.controller.confirm_payment("Dinheiro").unwrap();

    // Re-opening the record finds no scheduled appointment for today and
    // the session cannot start again.
    fixture.controller.open(fixture.patient.id).unwrap();
    assert!(fixture.controller.todays_appointment().is_none());
    assert!(!fixture.controller.can_start());

    // A direct second completion is a status error, not a second charge.
    assert_matches!(
        fixture.booking.mark_completed(appointment_id),
        Err(SchedulingError::InvalidStatusTransition(
            AppointmentStatus::Completed
        ))
    );
    assert_eq!(fixture.ledger.transactions().len(), 1);
}
