use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::{ConsultationCatalog, PatientDirectory};
use shared_storage::Collection;
use shared_utils::Clock;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, RescheduleAppointmentRequest,
    SchedulingError,
};
use crate::services::conflict::ConflictService;

/// The system of record for appointments. Every mutation loads the stored
/// set, derives the next set, and replaces it in one write, so a rejected
/// request leaves storage untouched.
pub struct AppointmentBookingService {
    appointments: Collection<Appointment>,
    patients: Arc<dyn PatientDirectory>,
    catalog: Arc<dyn ConsultationCatalog>,
    conflict_service: ConflictService,
    clock: Arc<dyn Clock>,
}

impl AppointmentBookingService {
    pub fn new(
        appointments: Collection<Appointment>,
        patients: Arc<dyn PatientDirectory>,
        catalog: Arc<dyn ConsultationCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            patients,
            catalog,
            conflict_service: ConflictService::new(),
            clock,
        }
    }

    /// Book a new appointment. The consultation type's current price is
    /// snapshotted onto the appointment; later catalog edits do not touch
    /// existing bookings.
    pub fn create(&self, request: BookAppointmentRequest) -> Result<Appointment, SchedulingError> {
        debug!(
            "Booking appointment for patient {} on {} at {}",
            request.patient_id, request.date, request.time
        );

        let patient = self
            .patients
            .find_by_id(request.patient_id)
            .ok_or_else(|| SchedulingError::Validation("unknown patient".to_string()))?;
        let consultation_type = self
            .catalog
            .find_by_id(request.consultation_type_id)
            .ok_or_else(|| SchedulingError::Validation("unknown consultation type".to_string()))?;

        self.validate_timing(request.date, request.time)?;

        let appointments = self.appointments.load()?;
        if self
            .conflict_service
            .has_conflict(&appointments, request.date, request.time, None)
        {
            return Err(SchedulingError::Conflict);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            patient_name: patient.name,
            date: request.date,
            time: request.time,
            status: AppointmentStatus::Scheduled,
            consultation_type_id: consultation_type.id,
            price: consultation_type.price,
            reminder_sent: false,
        };

        let mut next = appointments;
        next.push(appointment.clone());
        self.appointments.replace(&next)?;

        info!(
            "Appointment {} booked for {} on {} at {}",
            appointment.id, appointment.patient_name, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// Move a scheduled appointment to a new slot. Patient, consultation
    /// type, and the snapshotted price are carried over unchanged; the
    /// appointment's own slot is excluded from the conflict check.
    pub fn reschedule(
        &self,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        self.validate_timing(request.new_date, request.new_time)?;

        let mut appointments = self.appointments.load()?;
        let position = appointments
            .iter()
            .position(|appointment| appointment.id == request.appointment_id)
            .ok_or(SchedulingError::NotFound)?;

        if appointments[position].status != AppointmentStatus::Scheduled {
            return Err(SchedulingError::InvalidStatusTransition(
                appointments[position].status,
            ));
        }

        if self.conflict_service.has_conflict(
            &appointments,
            request.new_date,
            request.new_time,
            Some(request.appointment_id),
        ) {
            return Err(SchedulingError::Conflict);
        }

        appointments[position].date = request.new_date;
        appointments[position].time = request.new_time;
        let rescheduled = appointments[position].clone();
        self.appointments.replace(&appointments)?;

        info!(
            "Appointment {} rescheduled to {} at {}",
            rescheduled.id, rescheduled.date, rescheduled.time
        );
        Ok(rescheduled)
    }

    pub fn mark_completed(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.transition(appointment_id, AppointmentStatus::Completed)
    }

    pub fn mark_canceled(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.transition(appointment_id, AppointmentStatus::Canceled)
    }

    /// Flag a reminder as delivered. Idempotent and status-independent:
    /// the flag survives completion or cancellation.
    pub fn mark_reminder_sent(&self, appointment_id: Uuid) -> Result<(), SchedulingError> {
        let mut appointments = self.appointments.load()?;
        let appointment = appointments
            .iter_mut()
            .find(|appointment| appointment.id == appointment_id)
            .ok_or(SchedulingError::NotFound)?;

        if appointment.reminder_sent {
            return Ok(());
        }
        appointment.reminder_sent = true;
        self.appointments.replace(&appointments)?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.appointments.load()?)
    }

    pub fn find(&self, appointment_id: Uuid) -> Result<Option<Appointment>, SchedulingError> {
        Ok(self
            .appointments
            .load()?
            .into_iter()
            .find(|appointment| appointment.id == appointment_id))
    }

    /// Scheduled appointments on a day, time-ascending.
    pub fn scheduled_on(&self, date: NaiveDate) -> Result<Vec<Appointment>, SchedulingError> {
        let mut on_day: Vec<_> = self
            .appointments
            .load()?
            .into_iter()
            .filter(|appointment| {
                appointment.date == date && appointment.status == AppointmentStatus::Scheduled
            })
            .collect();
        on_day.sort_by_key(|appointment| appointment.time);
        Ok(on_day)
    }

    /// The one scheduled appointment a patient holds on a given day, if
    /// any. Slot conflicts guarantee there cannot be two at the same time;
    /// the earliest wins if data predating that rule holds several.
    pub fn scheduled_for_patient_on(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Appointment>, SchedulingError> {
        Ok(self
            .scheduled_on(date)?
            .into_iter()
            .find(|appointment| appointment.patient_id == patient_id))
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    /// Scheduled -> {Completed, Canceled}; both targets terminal.
    fn transition(
        &self,
        appointment_id: Uuid,
        next_status: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        let mut appointments = self.appointments.load()?;
        let appointment = appointments
            .iter_mut()
            .find(|appointment| appointment.id == appointment_id)
            .ok_or(SchedulingError::NotFound)?;

        if appointment.status != AppointmentStatus::Scheduled {
            return Err(SchedulingError::InvalidStatusTransition(appointment.status));
        }

        appointment.status = next_status;
        let updated = appointment.clone();
        self.appointments.replace(&appointments)?;

        info!("Appointment {} marked {}", updated.id, updated.status);
        Ok(updated)
    }

    fn validate_timing(&self, date: NaiveDate, time: NaiveTime) -> Result<(), SchedulingError> {
        let today = self.clock.today();
        if date < today {
            return Err(SchedulingError::Temporal(
                "date cannot be earlier than today".to_string(),
            ));
        }
        if date == today && time < self.clock.time_of_day() {
            return Err(SchedulingError::Temporal(
                "time of day has already passed".to_string(),
            ));
        }
        Ok(())
    }
}
