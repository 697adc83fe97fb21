use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;

use shared_config::AppConfig;
use shared_utils::Clock;

use crate::models::{Appointment, AppointmentStatus, DayAvailability};
use crate::services::holidays::HolidayCalendar;

/// Computes per-day booking capacity from the configured working window.
/// Pure over the appointment snapshot it is handed; the only ambient input
/// is the injected clock.
pub struct AvailabilityService {
    config: Arc<AppConfig>,
    holidays: HolidayCalendar,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            holidays: HolidayCalendar::new(),
            clock,
        }
    }

    /// The bookable increments of one working day, e.g. 08:00, 08:30, ...
    pub fn slot_times(&self) -> Vec<NaiveTime> {
        let step = Duration::minutes(i64::from(self.config.slot_minutes.max(1)));
        (0..self.config.nominal_slot_count())
            .map(|index| self.config.work_day_start + step * index as i32)
            .collect()
    }

    pub fn day_availability(
        &self,
        date: NaiveDate,
        appointments: &[Appointment],
    ) -> DayAvailability {
        let capacity = self.config.nominal_slot_count();
        let taken = appointments
            .iter()
            .filter(|appointment| {
                appointment.date == date && appointment.status == AppointmentStatus::Scheduled
            })
            .count() as u32;

        // The full threshold sits above nominal capacity on purpose: the
        // practice tolerates overbooking up to the configured factor.
        let is_full = f64::from(taken) >= f64::from(capacity) * self.config.overbook_factor;

        let availability = DayAvailability {
            is_past: date < self.clock.today(),
            is_holiday: self.holidays.is_holiday(date),
            is_full,
            available_count: capacity.saturating_sub(taken),
        };

        debug!(
            "Availability for {}: {} of {} slots free (full: {})",
            date, availability.available_count, capacity, availability.is_full
        );

        availability
    }
}
