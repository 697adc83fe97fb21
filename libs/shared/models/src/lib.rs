pub mod anamnesis;
pub mod catalog;
pub mod collaborators;
pub mod notification;
pub mod patient;
pub mod transaction;

pub use anamnesis::{Anamnesis, MainSymptoms, SubstanceFlag, SubstanceUse};
pub use catalog::ConsultationType;
pub use collaborators::{ConsultationCatalog, Ledger, NotificationLog, PatientDirectory};
pub use notification::{DeliveryStatus, NotificationChannel, NotificationLogEntry};
pub use patient::{EmergencyContact, Patient};
pub use transaction::{Transaction, TransactionKind};
