//! Date parsing and calendar arithmetic.
//!
//! Everything works on local wall-clock time (`NaiveDateTime`): the archive
//! cares about "the 14th of February", not about instants, and tests stay
//! independent of the machine's time zone.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// Current local wall-clock time.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse a user- or store-supplied date.
///
/// Accepts ISO dates and date-times (with `T` or a space), RFC 3339 with an
/// offset (converted to local time), `DD.MM.YYYY`, a bare four-digit year
/// (1 January, midnight), and integer epoch milliseconds. Returns `None` for
/// anything else.
pub fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.len() == 4 && input.bytes().all(|b| b.is_ascii_digit()) {
        return input
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .map(|d| d.and_time(NaiveTime::MIN));
    }

    if let Ok(millis) = input.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .map(|utc| utc.with_timezone(&Local).naive_local());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Calendar-aware span between two points in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DateDifference {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    /// Straight elapsed days, rounded up; independent of the fields above.
    pub total_days: i64,
}

impl DateDifference {
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

/// Subtract `start` from `end` component-wise on the calendar.
///
/// Days are subtracted first. A negative day count borrows the month before
/// `end`'s month: the start day is clamped into that month, so 31 January to
/// 1 March is one month and one day. A negative month count borrows a year.
/// `total_days` is `ceil(|end - start| / 1 day)`.
pub fn date_difference(start: &NaiveDateTime, end: &NaiveDateTime) -> DateDifference {
    let elapsed_ms = (*end - *start).num_milliseconds().abs();
    let total_days = (elapsed_ms + MS_PER_DAY - 1) / MS_PER_DAY;

    let mut years = end.year() - start.year();
    let mut months = end.month() as i32 - start.month() as i32;
    let mut days = end.day() as i32 - start.day() as i32;

    if days < 0 {
        months -= 1;
        let (year, month) = prior_month(end.year(), end.month());
        let borrowed = days_in_month(year, month) as i32;
        days = borrowed - (start.day() as i32).min(borrowed) + end.day() as i32;
    }

    if months < 0 {
        years -= 1;
        months += 12;
    }

    DateDifference {
        years,
        months,
        days,
        total_days,
    }
}

/// String front end for [`date_difference`]. `end = None` means now.
///
/// Unparseable input yields an all-zero difference.
pub fn date_difference_str(start: &str, end: Option<&str>) -> DateDifference {
    let start = parse_date(start);
    let end = match end {
        Some(s) => parse_date(s),
        None => Some(now()),
    };
    match (start, end) {
        (Some(start), Some(end)) => date_difference(&start, &end),
        _ => DateDifference::default(),
    }
}

fn prior_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in a month (1 = January). Months past 12 roll into following years;
/// month 0 is December of the previous year.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (year, month) = match month {
        0 => (year - 1, 12),
        m => (year + ((m - 1) / 12) as i32, (m - 1) % 12 + 1),
    };
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Years from `current_year` down to `start_year`, inclusive.
pub fn years_range(start_year: i32, current_year: i32) -> Vec<i32> {
    (start_year..=current_year).rev().collect()
}

pub fn is_today(date: &NaiveDateTime, now: &NaiveDateTime) -> bool {
    date.date() == now.date()
}

pub fn is_yesterday(date: &NaiveDateTime, now: &NaiveDateTime) -> bool {
    now.date().pred_opt() == Some(date.date())
}

/// 00:00:00.000 on the same day.
pub fn start_of_day(date: &NaiveDateTime) -> NaiveDateTime {
    date.date().and_time(NaiveTime::MIN)
}

/// 23:59:59.999 on the same day.
pub fn end_of_day(date: &NaiveDateTime) -> NaiveDateTime {
    start_of_day(date) + TimeDelta::milliseconds(MS_PER_DAY - 1)
}
