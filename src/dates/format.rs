//! Human-readable dates and durations.
//!
//! Every function here is total: bad input turns into a sentinel string from
//! the [`Locale`], never a panic or an `Err`.

use super::calendar::{DateDifference, date_difference, now, parse_date};
use super::locale::{AgoUnit, CalendarUnit, Locale};
use chrono::NaiveDateTime;

/// Output shape for [`format_date`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// `DD.MM.YYYY`
    #[default]
    Short,
    /// Weekday, day, month name, year.
    Long,
    /// "5 min ago" relative to now.
    Relative,
    /// `HH:MM`
    Time,
    /// `DD.MM.YYYY, HH:MM`
    DateTime,
}

impl From<&str> for DateFormat {
    /// Unknown names fall back to [`DateFormat::Short`].
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "long" => DateFormat::Long,
            "relative" => DateFormat::Relative,
            "time" => DateFormat::Time,
            "datetime" => DateFormat::DateTime,
            _ => DateFormat::Short,
        }
    }
}

/// `DD.MM.YYYY`
pub fn format_short(dt: &NaiveDateTime) -> String {
    dt.format("%d.%m.%Y").to_string()
}

/// Format a date string. Empty input gives an empty string; unparseable
/// input gives the locale's invalid-date sentinel.
pub fn format_date(input: &str, format: DateFormat, locale: Locale) -> String {
    format_date_at(input, format, locale, &now())
}

/// [`format_date`] against an explicit clock (used by `Relative`).
pub fn format_date_at(
    input: &str,
    format: DateFormat,
    locale: Locale,
    now: &NaiveDateTime,
) -> String {
    if input.trim().is_empty() {
        return String::new();
    }
    let Some(dt) = parse_date(input) else {
        return locale.invalid_date().to_string();
    };

    match format {
        DateFormat::Short => format_short(&dt),
        DateFormat::Long => locale.long_date(&dt),
        DateFormat::Relative => relative_time((*now - dt).num_milliseconds(), locale),
        DateFormat::Time => dt.format("%H:%M").to_string(),
        DateFormat::DateTime => dt.format("%d.%m.%Y, %H:%M").to_string(),
    }
}

/// Bucket an elapsed duration: "just now", "N min ago", … "N years ago".
///
/// Each count is floor-divided; the first bucket that matches wins. A month
/// is 30 days and a year 365 for bucketing. Negative input is "just now".
pub fn relative_time(diff_ms: i64, locale: Locale) -> String {
    let seconds = diff_ms.div_euclid(1000);
    let minutes = seconds.div_euclid(60);
    let hours = minutes.div_euclid(60);
    let days = hours.div_euclid(24);
    let weeks = days.div_euclid(7);
    let months = days.div_euclid(30);
    let years = days.div_euclid(365);

    if seconds < 60 {
        locale.just_now().to_string()
    } else if minutes < 60 {
        locale.ago(AgoUnit::Minutes, minutes)
    } else if hours < 24 {
        locale.ago(AgoUnit::Hours, hours)
    } else if days < 7 {
        locale.ago(AgoUnit::Days, days)
    } else if weeks < 4 {
        locale.ago(AgoUnit::Weeks, weeks)
    } else if months < 12 {
        locale.ago(AgoUnit::Months, months)
    } else {
        locale.ago(AgoUnit::Years, years)
    }
}

/// "2 года, 3 месяца и 15 дней" since `start`, or the less-than-a-day
/// sentinel. Unparseable input renders as the sentinel too, and so does a
/// start that lies after `now`.
pub fn relationship_duration(start: &str, locale: Locale) -> String {
    relationship_duration_at(start, &now(), locale)
}

pub fn relationship_duration_at(start: &str, now: &NaiveDateTime, locale: Locale) -> String {
    describe_difference(&elapsed_since_at(start, now), locale)
}

/// Calendar span from `start` up to `now`. All zeros when `start` does not
/// parse or lies after `now`.
pub fn elapsed_since_at(start: &str, now: &NaiveDateTime) -> DateDifference {
    parse_date(start)
        .filter(|start| start <= now)
        .map(|start| date_difference(&start, now))
        .unwrap_or_default()
}

/// Render the positive calendar components of a difference, pluralized and
/// joined: one part alone, two as "A and B", three as "A, B and C".
pub fn describe_difference(diff: &DateDifference, locale: Locale) -> String {
    let parts: Vec<String> = [
        (diff.years, CalendarUnit::Year),
        (diff.months, CalendarUnit::Month),
        (diff.days, CalendarUnit::Day),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, unit)| {
        let n = i64::from(n);
        format!("{} {}", n, locale.unit_forms(unit).select(n))
    })
    .collect();

    match parts.as_slice() {
        [] => locale.less_than_a_day().to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} {} {}", init.join(", "), locale.and(), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::at;

    const MINUTE: i64 = 60_000;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    // =========================================================================
    // format_date
    // =========================================================================

    #[test]
    fn format_short_mode() {
        let now = at("2024-06-01 00:00");
        assert_eq!(
            format_date_at("2024-02-14T18:30", DateFormat::Short, Locale::Ru, &now),
            "14.02.2024"
        );
    }

    #[test]
    fn format_long_mode_per_locale() {
        let now = at("2024-06-01 00:00");
        assert_eq!(
            format_date_at("2024-02-14", DateFormat::Long, Locale::Ru, &now),
            "среда, 14 февраля 2024 г."
        );
        assert_eq!(
            format_date_at("2024-02-14", DateFormat::Long, Locale::En, &now),
            "Wednesday, February 14, 2024"
        );
    }

    #[test]
    fn format_time_and_datetime() {
        let now = at("2024-06-01 00:00");
        assert_eq!(
            format_date_at("2024-02-14T08:05", DateFormat::Time, Locale::En, &now),
            "08:05"
        );
        assert_eq!(
            format_date_at("2024-02-14T08:05", DateFormat::DateTime, Locale::En, &now),
            "14.02.2024, 08:05"
        );
    }

    #[test]
    fn format_relative_uses_clock() {
        let now = at("2024-06-01 12:00");
        assert_eq!(
            format_date_at("2024-06-01T09:00", DateFormat::Relative, Locale::En, &now),
            "3 h ago"
        );
    }

    #[test]
    fn format_invalid_returns_sentinel() {
        let now = at("2024-06-01 00:00");
        assert_eq!(
            format_date_at("banana", DateFormat::Short, Locale::En, &now),
            "Invalid date"
        );
        assert_eq!(
            format_date("32.13.2020", DateFormat::Long, Locale::Ru),
            "Неверная дата"
        );
    }

    #[test]
    fn format_empty_returns_empty() {
        assert_eq!(format_date("", DateFormat::Short, Locale::Ru), "");
    }

    #[test]
    fn unknown_format_name_is_short() {
        assert_eq!(DateFormat::from("fancy"), DateFormat::Short);
        assert_eq!(DateFormat::from("LONG"), DateFormat::Long);
    }

    // =========================================================================
    // relative_time
    // =========================================================================

    #[test]
    fn relative_minute_boundary() {
        assert_eq!(relative_time(59_999, Locale::En), "just now");
        assert_eq!(relative_time(60_000, Locale::En), "1 min ago");
    }

    #[test]
    fn relative_each_bucket() {
        assert_eq!(relative_time(59 * MINUTE, Locale::En), "59 min ago");
        assert_eq!(relative_time(HOUR, Locale::En), "1 h ago");
        assert_eq!(relative_time(23 * HOUR, Locale::En), "23 h ago");
        assert_eq!(relative_time(DAY, Locale::En), "1 days ago");
        assert_eq!(relative_time(7 * DAY, Locale::En), "1 weeks ago");
        assert_eq!(relative_time(27 * DAY, Locale::En), "3 weeks ago");
        assert_eq!(relative_time(28 * DAY, Locale::En), "0 months ago");
        assert_eq!(relative_time(30 * DAY, Locale::En), "1 months ago");
        assert_eq!(relative_time(359 * DAY, Locale::En), "11 months ago");
        assert_eq!(relative_time(360 * DAY, Locale::En), "0 years ago");
        assert_eq!(relative_time(800 * DAY, Locale::En), "2 years ago");
    }

    #[test]
    fn relative_russian() {
        assert_eq!(relative_time(10_000, Locale::Ru), "только что");
        assert_eq!(relative_time(5 * MINUTE, Locale::Ru), "5 мин. назад");
        assert_eq!(relative_time(3 * DAY, Locale::Ru), "3 дн. назад");
    }

    #[test]
    fn relative_future_is_just_now() {
        assert_eq!(relative_time(-5 * DAY, Locale::En), "just now");
    }

    // =========================================================================
    // relationship_duration
    // =========================================================================

    #[test]
    fn duration_equal_dates_is_sentinel() {
        let now = at("2020-01-01 00:00");
        assert_eq!(
            relationship_duration_at("2020-01-01", &now, Locale::En),
            "less than a day"
        );
        assert_eq!(
            relationship_duration_at("2020-01-01", &now, Locale::Ru),
            "меньше дня"
        );
    }

    #[test]
    fn duration_three_parts_russian() {
        let now = at("2024-04-16 10:00");
        assert_eq!(
            relationship_duration_at("2022-01-01", &now, Locale::Ru),
            "2 года, 3 месяца и 15 дней"
        );
    }

    #[test]
    fn duration_two_parts_skip_zero() {
        let now = at("2023-01-06 00:00");
        assert_eq!(
            relationship_duration_at("2022-01-01", &now, Locale::En),
            "1 year and 5 days"
        );
    }

    #[test]
    fn duration_single_part() {
        let now = at("2021-03-01 00:00");
        assert_eq!(
            relationship_duration_at("2021-01-01", &now, Locale::Ru),
            "2 месяца"
        );
    }

    #[test]
    fn duration_plural_exceptions() {
        let eleven = DateDifference {
            years: 11,
            ..Default::default()
        };
        let twenty_one = DateDifference {
            years: 21,
            days: 1,
            ..Default::default()
        };
        assert_eq!(describe_difference(&eleven, Locale::Ru), "11 лет");
        assert_eq!(describe_difference(&eleven, Locale::En), "11 years");
        assert_eq!(
            describe_difference(&twenty_one, Locale::Ru),
            "21 год и 1 день"
        );
        assert_eq!(
            describe_difference(&twenty_one, Locale::En),
            "21 year and 1 day"
        );
    }

    #[test]
    fn duration_invalid_start_is_sentinel() {
        let now = at("2024-01-01 00:00");
        assert_eq!(
            relationship_duration_at("whenever", &now, Locale::En),
            "less than a day"
        );
    }

    #[test]
    fn duration_future_start_is_sentinel() {
        let now = at("2024-01-01 00:00");
        assert_eq!(
            relationship_duration_at("2024-02-01", &now, Locale::En),
            "less than a day"
        );
        assert_eq!(
            elapsed_since_at("2025-01-01", &now),
            DateDifference::default()
        );
    }

    #[test]
    fn elapsed_since_counts_up_to_now() {
        let now = at("2023-03-01 00:00");
        assert_eq!(
            elapsed_since_at("2023-01-31", &now),
            date_difference(&at("2023-01-31 00:00"), &now)
        );
    }
}
