use std::fmt::Display;

use chrono::{DateTime, Duration, TimeZone, Utc};

/// This is the standard way of turning an instant into a ledger key. Same calendar day in the same
/// zone always produces the same key.
pub fn format_calendar_date<Tz: TimeZone>(instant: DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: Display,
{
    instant.with_timezone(zone).format("%Y%m%d").to_string()
}

/// Local wall clock time in the `HH:MM` 24 hour format.
pub fn format_clock_time<Tz: TimeZone>(instant: DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: Display,
{
    instant.with_timezone(zone).format("%H:%M").to_string()
}

pub fn format_day_heading<Tz: TimeZone>(instant: DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: Display,
{
    instant.with_timezone(zone).format("%Y-%m-%d").to_string()
}

const MINUTE_MS: f64 = 60_000.;
const HOUR_MS: f64 = 60. * MINUTE_MS;

/// Coarse human readable duration. Anything under an hour is shown in minutes, everything else in
/// hours. Both are rounded half away from zero.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.num_milliseconds() as f64;
    if duration < Duration::minutes(60) {
        format!("{} minutes", (ms / MINUTE_MS).round() as i64)
    } else {
        format!("{} hours", (ms / HOUR_MS).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone, Utc};
    use rstest::rstest;

    use super::{format_calendar_date, format_clock_time, format_day_heading, format_duration};

    #[rstest]
    #[case::zero(Duration::zero(), "0 minutes")]
    #[case::under_half_minute(Duration::seconds(29), "0 minutes")]
    #[case::half_minute_rounds_up(Duration::seconds(30), "1 minutes")]
    #[case::plain_minutes(Duration::minutes(45), "45 minutes")]
    #[case::just_under_hour(Duration::seconds(59 * 60 + 40), "60 minutes")]
    #[case::exactly_hour(Duration::minutes(60), "1 hours")]
    #[case::hour_and_a_half(Duration::minutes(90), "2 hours")]
    #[case::below_half_hour(Duration::minutes(149), "2 hours")]
    #[case::long_day(Duration::hours(9) + Duration::minutes(31), "10 hours")]
    fn test_format_duration(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(duration), expected);
    }

    #[test]
    fn clock_time_in_utc() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 9, 5, 0).unwrap();
        assert_eq!(format_clock_time(instant, &Utc), "09:05");
    }

    #[test]
    fn clock_time_follows_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_clock_time(instant, &zone), "01:30");
    }

    #[test]
    fn calendar_date_is_zero_padded() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_calendar_date(instant, &Utc), "20240102");
        assert_eq!(format_day_heading(instant, &Utc), "2024-01-02");
    }

    #[test]
    fn calendar_date_depends_on_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 22, 0, 0).unwrap();
        let east = FixedOffset::east_opt(3 * 3600).unwrap();
        let west = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(format_calendar_date(instant, &east), "20240103");
        assert_eq!(format_calendar_date(instant, &west), "20240102");
    }
}
