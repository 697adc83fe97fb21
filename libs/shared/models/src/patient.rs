use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anamnesis::Anamnesis;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// A patient record as exposed by the patient-management collaborator.
/// This core never creates or deletes patients; it reads them and writes
/// back the anamnesis blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub join_date: NaiveDate,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub occupation: String,
    pub emergency_contact: EmergencyContact,
    pub anamnesis: Option<Anamnesis>,
    pub is_active: bool,
}

impl Patient {
    /// True when the patient's birth month and day match the given date.
    /// The birth year is irrelevant here.
    pub fn has_birthday_on(&self, date: NaiveDate) -> bool {
        self.date_of_birth.month() == date.month() && self.date_of_birth.day() == date.day()
    }
}
