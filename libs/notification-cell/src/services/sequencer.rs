use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use scheduling_cell::AppointmentBookingService;
use shared_config::AppConfig;
use shared_models::{
    DeliveryStatus, NotificationChannel, NotificationLog, NotificationLogEntry, PatientDirectory,
};
use shared_utils::Clock;

use crate::models::{
    NotificationError, NotificationPrompt, NotificationStep, OnboardingSnapshot,
};

/// The post-login check chain as explicit data: the four steps of
/// [`NotificationStep::CHAIN`] are walked by a driver loop, each predicate
/// evaluated against live data at its turn. A step with nothing to show
/// falls through immediately; a shown step parks the chain until it is
/// dismissed. One instance serves one login — the chain never re-runs on
/// navigation.
pub struct NotificationSequencer {
    patients: Arc<dyn PatientDirectory>,
    booking: Arc<AppointmentBookingService>,
    log: Arc<dyn NotificationLog>,
    clock: Arc<dyn Clock>,
    default_access_code: String,

    cursor: usize,
    started: bool,
    onboarding: Option<OnboardingSnapshot>,
}

impl NotificationSequencer {
    pub fn new(
        patients: Arc<dyn PatientDirectory>,
        booking: Arc<AppointmentBookingService>,
        log: Arc<dyn NotificationLog>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Self {
        Self {
            patients,
            booking,
            log,
            clock,
            default_access_code: config.default_access_code.clone(),
            cursor: 0,
            started: false,
            onboarding: None,
        }
    }

    /// Kicks off the chain right after authentication. Calling it again on
    /// the same instance yields nothing: the chain is one-shot per login.
    pub fn begin(
        &mut self,
        onboarding: OnboardingSnapshot,
    ) -> Result<Option<NotificationPrompt>, NotificationError> {
        if self.started {
            debug!("notification chain already ran this login");
            return Ok(None);
        }
        self.started = true;
        self.onboarding = Some(onboarding);
        self.advance()
    }

    /// Called when the current prompt is dismissed; surfaces the next
    /// non-empty step, or nothing once the chain is exhausted.
    pub fn dismiss(&mut self) -> Result<Option<NotificationPrompt>, NotificationError> {
        if !self.started {
            return Ok(None);
        }
        self.advance()
    }

    /// Flips the reminder flag on the appointment and records the outbound
    /// notification, both before the chain moves on.
    pub fn mark_reminder_sent(&self, appointment_id: Uuid) -> Result<(), NotificationError> {
        let appointment = self
            .booking
            .find(appointment_id)?
            .ok_or(scheduling_cell::SchedulingError::NotFound)?;
        self.booking.mark_reminder_sent(appointment_id)?;

        self.log.append(NotificationLogEntry {
            id: Uuid::new_v4(),
            date: self.clock.instant(),
            patient_name: appointment.patient_name.clone(),
            channel: NotificationChannel::Sms,
            status: DeliveryStatus::Sent,
            details: "Enviado via verificação diária.".to_string(),
        });

        info!("Reminder marked sent for {}", appointment.patient_name);
        Ok(())
    }

    fn advance(&mut self) -> Result<Option<NotificationPrompt>, NotificationError> {
        while self.cursor < NotificationStep::CHAIN.len() {
            let step = NotificationStep::CHAIN[self.cursor];
            self.cursor += 1;
            if let Some(prompt) = self.evaluate(step)? {
                info!("Notification chain showing {:?}", step);
                return Ok(Some(prompt));
            }
            debug!("Notification step {:?} has nothing to show", step);
        }
        Ok(None)
    }

    fn evaluate(
        &self,
        step: NotificationStep,
    ) -> Result<Option<NotificationPrompt>, NotificationError> {
        let today = self.clock.today();
        match step {
            NotificationStep::Onboarding => {
                let Some(snapshot) = &self.onboarding else {
                    return Ok(None);
                };
                let access_code_changed = snapshot.access_code != self.default_access_code;
                if access_code_changed && snapshot.has_profile_image {
                    return Ok(None);
                }
                Ok(Some(NotificationPrompt::Onboarding {
                    access_code_changed,
                    profile_image_set: snapshot.has_profile_image,
                }))
            }
            NotificationStep::Birthdays => {
                let celebrating: Vec<_> = self
                    .patients
                    .list_active()
                    .into_iter()
                    .filter(|patient| patient.has_birthday_on(today))
                    .collect();
                Ok((!celebrating.is_empty()).then_some(NotificationPrompt::Birthdays(celebrating)))
            }
            NotificationStep::Reminders => {
                let tomorrow = today + Duration::days(1);
                let pending: Vec<_> = self
                    .booking
                    .scheduled_on(tomorrow)?
                    .into_iter()
                    .filter(|appointment| !appointment.reminder_sent)
                    .collect();
                Ok((!pending.is_empty()).then_some(NotificationPrompt::Reminders(pending)))
            }
            NotificationStep::TodayAgenda => {
                let agenda = self.booking.scheduled_on(today)?;
                Ok((!agenda.is_empty()).then_some(NotificationPrompt::TodayAgenda(agenda)))
            }
        }
    }
}
