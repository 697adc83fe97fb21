use chrono::{Datelike, Duration, NaiveDate};

/// Answers whether a date is blocked for booking because of a Brazilian
/// national holiday. Pure lookup, no state: the fixed-date holidays plus
/// the three Easter-derived ones (Carnival, Good Friday, Corpus Christi).
#[derive(Debug, Clone, Copy, Default)]
pub struct HolidayCalendar;

const FIXED_HOLIDAYS: &[(u32, u32, &str)] = &[
    (1, 1, "Confraternização Universal"),
    (4, 21, "Tiradentes"),
    (5, 1, "Dia do Trabalho"),
    (9, 7, "Independência do Brasil"),
    (10, 12, "Nossa Senhora Aparecida"),
    (11, 2, "Finados"),
    (11, 15, "Proclamação da República"),
    (12, 25, "Natal"),
];

impl HolidayCalendar {
    pub fn new() -> Self {
        Self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&'static str> {
        if let Some((_, _, name)) = FIXED_HOLIDAYS
            .iter()
            .find(|(month, day, _)| date.month() == *month && date.day() == *day)
        {
            return Some(name);
        }

        let easter = easter_sunday(date.year())?;
        if date == easter - Duration::days(47) {
            Some("Carnaval")
        } else if date == easter - Duration::days(2) {
            Some("Sexta-feira Santa")
        } else if date == easter + Duration::days(60) {
            Some("Corpus Christi")
        } else {
            None
        }
    }
}

/// Anonymous Gregorian computus.
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn computus_matches_known_years() {
        assert_eq!(easter_sunday(2024), Some(date(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(date(2025, 4, 20)));
        assert_eq!(easter_sunday(2026), Some(date(2026, 4, 5)));
    }

    #[test]
    fn fixed_holidays_are_blocked_every_year() {
        let calendar = HolidayCalendar::new();
        assert_eq!(calendar.holiday_name(date(2024, 12, 25)), Some("Natal"));
        assert_eq!(calendar.holiday_name(date(2031, 4, 21)), Some("Tiradentes"));
        assert!(!calendar.is_holiday(date(2024, 6, 10)));
    }

    #[test]
    fn movable_holidays_follow_easter() {
        let calendar = HolidayCalendar::new();
        assert_eq!(calendar.holiday_name(date(2024, 2, 13)), Some("Carnaval"));
        assert_eq!(
            calendar.holiday_name(date(2024, 3, 29)),
            Some("Sexta-feira Santa")
        );
        assert_eq!(
            calendar.holiday_name(date(2024, 5, 30)),
            Some("Corpus Christi")
        );
    }
}
