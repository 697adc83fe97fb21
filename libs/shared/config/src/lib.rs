use std::env;

use chrono::NaiveTime;
use tracing::warn;

/// Practice-wide configuration. Every tunable the scheduling and session
/// cells depend on lives here so the cells stay free of ambient globals.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Start of the bookable working window.
    pub work_day_start: NaiveTime,
    /// End of the bookable working window (exclusive).
    pub work_day_end: NaiveTime,
    /// Size of one bookable increment, in minutes.
    pub slot_minutes: u32,
    /// A day counts as full once scheduled appointments reach
    /// `overbook_factor x` the nominal slot count. Deliberately above 1.0:
    /// the practice allows squeezing extra sessions into a day.
    pub overbook_factor: f64,
    /// The factory access code; accounts still on it are treated as not
    /// yet onboarded.
    pub default_access_code: String,
    /// Display name printed on receipts.
    pub practitioner_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            work_day_start: parse_time_var("CLINIC_WORK_DAY_START", "08:00"),
            work_day_end: parse_time_var("CLINIC_WORK_DAY_END", "18:00"),
            slot_minutes: parse_u32_var("CLINIC_SLOT_MINUTES", 30),
            overbook_factor: parse_f64_var("CLINIC_OVERBOOK_FACTOR", 1.5),
            default_access_code: env::var("CLINIC_DEFAULT_ACCESS_CODE")
                .unwrap_or_else(|_| "2577".to_string()),
            practitioner_name: env::var("CLINIC_PRACTITIONER_NAME")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_PRACTITIONER_NAME not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Practice not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.practitioner_name.is_empty()
            && self.slot_minutes > 0
            && self.work_day_start < self.work_day_end
    }

    /// Nominal number of bookable increments in one working day.
    pub fn nominal_slot_count(&self) -> u32 {
        let window = self.work_day_end - self.work_day_start;
        (window.num_minutes().max(0) as u32) / self.slot_minutes.max(1)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            work_day_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            work_day_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            slot_minutes: 30,
            overbook_factor: 1.5,
            default_access_code: "2577".to_string(),
            practitioner_name: String::new(),
        }
    }
}

fn parse_time_var(name: &str, default: &str) -> NaiveTime {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    NaiveTime::parse_from_str(&raw, "%H:%M").unwrap_or_else(|_| {
        warn!("{} is not a valid HH:MM time, using default {}", name, default);
        NaiveTime::parse_from_str(default, "%H:%M").unwrap()
    })
}

fn parse_u32_var(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn parse_f64_var(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
