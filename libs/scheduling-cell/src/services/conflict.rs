use chrono::{NaiveDate, NaiveTime};
use tracing::warn;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};

/// Decides whether a candidate (date, time) collides with the scheduled
/// appointments in a snapshot. Completed and canceled appointments never
/// block a slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictService;

impl ConflictService {
    pub fn new() -> Self {
        Self
    }

    /// `exclude_appointment_id` carves the appointment being rescheduled
    /// out of the check so it cannot collide with itself.
    pub fn has_conflict(
        &self,
        appointments: &[Appointment],
        date: NaiveDate,
        time: NaiveTime,
        exclude_appointment_id: Option<Uuid>,
    ) -> bool {
        let conflict = appointments.iter().any(|appointment| {
            appointment.status == AppointmentStatus::Scheduled
                && appointment.date == date
                && appointment.time == time
                && Some(appointment.id) != exclude_appointment_id
        });

        if conflict {
            warn!("Slot {} {} already taken by a scheduled appointment", date, time);
        }

        conflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(date: NaiveDate, time: NaiveTime, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: "Paciente".to_string(),
            date,
            time,
            status,
            consultation_type_id: Uuid::new_v4(),
            price: 150.0,
            reminder_sent: false,
        }
    }

    fn slot() -> (NaiveDate, NaiveTime) {
        (
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        )
    }

    #[test]
    fn scheduled_appointment_blocks_its_slot() {
        let (date, time) = slot();
        let existing = vec![appointment(date, time, AppointmentStatus::Scheduled)];
        assert!(ConflictService::new().has_conflict(&existing, date, time, None));
    }

    #[test]
    fn terminal_appointments_free_the_slot() {
        let (date, time) = slot();
        let existing = vec![
            appointment(date, time, AppointmentStatus::Completed),
            appointment(date, time, AppointmentStatus::Canceled),
        ];
        assert!(!ConflictService::new().has_conflict(&existing, date, time, None));
    }

    #[test]
    fn reschedule_ignores_its_own_slot() {
        let (date, time) = slot();
        let existing = vec![appointment(date, time, AppointmentStatus::Scheduled)];
        let own_id = existing[0].id;
        assert!(!ConflictService::new().has_conflict(&existing, date, time, Some(own_id)));
        assert!(ConflictService::new().has_conflict(
            &existing,
            date,
            time,
            Some(Uuid::new_v4())
        ));
    }
}
