use scheduling_cell::{Appointment, SchedulingError};
use shared_models::Patient;

/// The four checks of the post-login chain, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStep {
    Onboarding,
    Birthdays,
    Reminders,
    TodayAgenda,
}

impl NotificationStep {
    pub const CHAIN: [NotificationStep; 4] = [
        NotificationStep::Onboarding,
        NotificationStep::Birthdays,
        NotificationStep::Reminders,
        NotificationStep::TodayAgenda,
    ];
}

/// One prompt of the chain, carrying everything needed to render it.
#[derive(Debug, Clone)]
pub enum NotificationPrompt {
    /// Account setup still pending; the flags say which tasks remain.
    Onboarding {
        access_code_changed: bool,
        profile_image_set: bool,
    },
    /// Active patients whose birthday is today.
    Birthdays(Vec<Patient>),
    /// Tomorrow's scheduled appointments still waiting for a reminder,
    /// time-ascending.
    Reminders(Vec<Appointment>),
    /// Today's scheduled appointments, time-ascending.
    TodayAgenda(Vec<Appointment>),
}

impl NotificationPrompt {
    pub fn step(&self) -> NotificationStep {
        match self {
            NotificationPrompt::Onboarding { .. } => NotificationStep::Onboarding,
            NotificationPrompt::Birthdays(_) => NotificationStep::Birthdays,
            NotificationPrompt::Reminders(_) => NotificationStep::Reminders,
            NotificationPrompt::TodayAgenda(_) => NotificationStep::TodayAgenda,
        }
    }
}

/// Account-setup state captured right after authentication. The auth
/// module owns the credential; the chain only compares it against the
/// configured default.
#[derive(Debug, Clone)]
pub struct OnboardingSnapshot {
    pub access_code: String,
    pub has_profile_image: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}
