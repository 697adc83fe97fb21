//! In-process contracts for the modules that live outside this core.
//! Lookups return `Option`; sinks are fire-and-forget. These stand in for
//! the patient-management, financial, and notification modules, which own
//! their data and their own failure handling.

use uuid::Uuid;

use crate::anamnesis::Anamnesis;
use crate::catalog::ConsultationType;
use crate::notification::NotificationLogEntry;
use crate::patient::Patient;
use crate::transaction::Transaction;

/// Read access to the patient registry, plus write access to the one blob
/// this core maintains: the anamnesis.
pub trait PatientDirectory: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Option<Patient>;

    fn list_active(&self) -> Vec<Patient>;

    /// Replaces the patient's anamnesis. Returns false when the patient id
    /// is unknown, in which case nothing is written.
    fn update_anamnesis(&self, patient_id: Uuid, anamnesis: Anamnesis) -> bool;
}

/// The billable service definitions maintained in the settings module.
pub trait ConsultationCatalog: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Option<ConsultationType>;
}

/// Write-only sink into the financial module.
pub trait Ledger: Send + Sync {
    fn append(&self, transaction: Transaction);
}

/// Write-only sink into the notification audit trail.
pub trait NotificationLog: Send + Sync {
    fn append(&self, entry: NotificationLogEntry);
}
