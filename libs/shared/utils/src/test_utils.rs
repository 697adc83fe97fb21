//! Shared test fixtures: a settable clock and in-memory stand-ins for the
//! external collaborators, used by every cell's tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use shared_models::{
    Anamnesis, ConsultationCatalog, ConsultationType, EmergencyContact, Ledger, NotificationLog,
    NotificationLogEntry, Patient, PatientDirectory, Transaction,
};

use crate::clock::Clock;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A clock pinned to an explicit date/time, advanced manually.
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            now: Mutex::new(date.and_time(time)),
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self::at(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap())
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }

    fn instant(&self) -> DateTime<Utc> {
        self.now().and_utc()
    }
}

/// Patient registry double backed by a plain vector.
#[derive(Default)]
pub struct InMemoryPatients {
    patients: Mutex<Vec<Patient>>,
}

impl InMemoryPatients {
    pub fn with(patients: Vec<Patient>) -> Self {
        Self {
            patients: Mutex::new(patients),
        }
    }

    pub fn add(&self, patient: Patient) {
        self.patients.lock().unwrap().push(patient);
    }
}

impl PatientDirectory for InMemoryPatients {
    fn find_by_id(&self, id: Uuid) -> Option<Patient> {
        self.patients
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn list_active(&self) -> Vec<Patient> {
        self.patients
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect()
    }

    fn update_anamnesis(&self, patient_id: Uuid, anamnesis: Anamnesis) -> bool {
        let mut patients = self.patients.lock().unwrap();
        match patients.iter_mut().find(|p| p.id == patient_id) {
            Some(patient) => {
                patient.anamnesis = Some(anamnesis);
                true
            }
            None => false,
        }
    }
}

/// Catalog double; prices can be edited mid-test to prove bookings keep
/// their snapshot.
#[derive(Default)]
pub struct InMemoryCatalog {
    types: Mutex<Vec<ConsultationType>>,
}

impl InMemoryCatalog {
    pub fn with(types: Vec<ConsultationType>) -> Self {
        Self {
            types: Mutex::new(types),
        }
    }

    pub fn set_price(&self, id: Uuid, price: f64) {
        let mut types = self.types.lock().unwrap();
        if let Some(consultation_type) = types.iter_mut().find(|t| t.id == id) {
            consultation_type.price = price;
        }
    }
}

impl ConsultationCatalog for InMemoryCatalog {
    fn find_by_id(&self, id: Uuid) -> Option<ConsultationType> {
        self.types.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }
}

/// Ledger sink that records what was appended.
#[derive(Default)]
pub struct RecordingLedger {
    entries: Mutex<Vec<Transaction>>,
}

impl RecordingLedger {
    pub fn transactions(&self) -> Vec<Transaction> {
        self.entries.lock().unwrap().clone()
    }
}

impl Ledger for RecordingLedger {
    fn append(&self, transaction: Transaction) {
        self.entries.lock().unwrap().push(transaction);
    }
}

/// Notification audit sink that records what was appended.
#[derive(Default)]
pub struct RecordingNotificationLog {
    entries: Mutex<Vec<NotificationLogEntry>>,
}

impl RecordingNotificationLog {
    pub fn entries(&self) -> Vec<NotificationLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl NotificationLog for RecordingNotificationLog {
    fn append(&self, entry: NotificationLogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

pub fn sample_patient(name: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: "(11) 99999-0000".to_string(),
        join_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
        date_of_birth: NaiveDate::from_ymd_opt(1988, 11, 23).unwrap(),
        address: "Rua das Acácias, 120".to_string(),
        occupation: "professora".to_string(),
        emergency_contact: EmergencyContact {
            name: "Contato".to_string(),
            phone: "(11) 98888-0000".to_string(),
        },
        anamnesis: None,
        is_active: true,
    }
}

pub fn sample_consultation_type(name: &str, price: f64) -> ConsultationType {
    ConsultationType {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
    }
}

/// An anamnesis with exactly one filled field, the minimum that passes the
/// completeness gate.
pub fn minimally_filled_anamnesis() -> Anamnesis {
    Anamnesis {
        main_reason: "ansiedade no trabalho".to_string(),
        ..Anamnesis::default()
    }
}
