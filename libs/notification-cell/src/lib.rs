pub mod models;
pub mod services;

pub use models::{NotificationError, NotificationPrompt, NotificationStep, OnboardingSnapshot};
pub use services::sequencer::NotificationSequencer;
