use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Injectable "now" source. Every temporal decision in the cells — past-date
/// checks, today's-appointment resolution, birthday matching — reads the
/// clock it was constructed with, never the ambient system time, so
/// date-boundary behavior is testable.
pub trait Clock: Send + Sync {
    /// Current wall-clock date and time in the practice's local zone.
    fn now(&self) -> NaiveDateTime;

    /// Current instant for timestamps that outlive the session.
    fn instant(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn instant(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
