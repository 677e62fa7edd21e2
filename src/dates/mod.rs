//! Date and duration formatting.
//!
//! | Function | Output |
//! |---|---|
//! | [`format_date`] | `14.02.2024`, `среда, 14 февраля 2024 г.`, `08:05`, … |
//! | [`date_difference`] | `{years, months, days, total_days}` on the calendar |
//! | [`relationship_duration`] | `2 года, 3 месяца и 15 дней` |
//! | [`relative_time`] | `5 мин. назад` / `5 min ago` |
//!
//! Nothing here returns an error. Unparseable dates become a fixed sentinel
//! string from the [`Locale`] so callers can drop results straight into UI
//! text.

mod calendar;
mod format;
mod locale;
mod plural;

pub use calendar::{
    DateDifference, date_difference, date_difference_str, days_in_month, end_of_day,
    is_leap_year, is_today, is_yesterday, now, parse_date, start_of_day, years_range,
};
pub use format::{
    DateFormat, describe_difference, elapsed_since_at, format_date, format_date_at,
    format_short, relationship_duration, relationship_duration_at, relative_time,
};
pub use locale::{AgoUnit, CalendarUnit, Locale};
pub use plural::{PluralCategory, PluralForms, plural_category};
