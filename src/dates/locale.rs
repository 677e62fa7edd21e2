//! Per-language strings for the date formatter.

use super::plural::PluralForms;
use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output language. Russian is the archive's native language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" | "ru-ru" => Ok(Locale::Ru),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        })
    }
}

/// Calendar components of a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarUnit {
    Year,
    Month,
    Day,
}

/// Buckets used by relative times ("5 min ago").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgoUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

const RU_WEEKDAYS: [&str; 7] = [
    "понедельник",
    "вторник",
    "среда",
    "четверг",
    "пятница",
    "суббота",
    "воскресенье",
];

const EN_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// Genitive: "1 января".
const RU_MONTHS: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Locale {
    pub fn invalid_date(self) -> &'static str {
        match self {
            Locale::Ru => "Неверная дата",
            Locale::En => "Invalid date",
        }
    }

    pub fn less_than_a_day(self) -> &'static str {
        match self {
            Locale::Ru => "меньше дня",
            Locale::En => "less than a day",
        }
    }

    pub fn just_now(self) -> &'static str {
        match self {
            Locale::Ru => "только что",
            Locale::En => "just now",
        }
    }

    /// Final-element conjunction for lists: "A, B and C".
    pub fn and(self) -> &'static str {
        match self {
            Locale::Ru => "и",
            Locale::En => "and",
        }
    }

    pub fn unit_forms(self, unit: CalendarUnit) -> PluralForms {
        match (self, unit) {
            (Locale::Ru, CalendarUnit::Year) => PluralForms::new("год", "года", "лет"),
            (Locale::Ru, CalendarUnit::Month) => PluralForms::new("месяц", "месяца", "месяцев"),
            (Locale::Ru, CalendarUnit::Day) => PluralForms::new("день", "дня", "дней"),
            (Locale::En, CalendarUnit::Year) => PluralForms::new("year", "years", "years"),
            (Locale::En, CalendarUnit::Month) => PluralForms::new("month", "months", "months"),
            (Locale::En, CalendarUnit::Day) => PluralForms::new("day", "days", "days"),
        }
    }

    pub fn ago(self, unit: AgoUnit, n: i64) -> String {
        let suffix = match (self, unit) {
            (Locale::Ru, AgoUnit::Minutes) => "мин. назад",
            (Locale::Ru, AgoUnit::Hours) => "ч. назад",
            (Locale::Ru, AgoUnit::Days) => "дн. назад",
            (Locale::Ru, AgoUnit::Weeks) => "нед. назад",
            (Locale::Ru, AgoUnit::Months) => "мес. назад",
            (Locale::Ru, AgoUnit::Years) => "г. назад",
            (Locale::En, AgoUnit::Minutes) => "min ago",
            (Locale::En, AgoUnit::Hours) => "h ago",
            (Locale::En, AgoUnit::Days) => "days ago",
            (Locale::En, AgoUnit::Weeks) => "weeks ago",
            (Locale::En, AgoUnit::Months) => "months ago",
            (Locale::En, AgoUnit::Years) => "years ago",
        };
        format!("{n} {suffix}")
    }

    pub fn weekday_name(self, weekday: Weekday) -> &'static str {
        let idx = weekday.num_days_from_monday() as usize;
        match self {
            Locale::Ru => RU_WEEKDAYS[idx],
            Locale::En => EN_WEEKDAYS[idx],
        }
    }

    /// Month name as used inside a full date (genitive in Russian).
    pub fn month_name(self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::Ru => RU_MONTHS[idx],
            Locale::En => EN_MONTHS[idx],
        }
    }

    /// Weekday, day, month name and year.
    ///
    /// ru: `понедельник, 1 января 2024 г.`; en: `Monday, January 1, 2024`.
    pub fn long_date(self, dt: &NaiveDateTime) -> String {
        let weekday = self.weekday_name(dt.weekday());
        let month = self.month_name(dt.month());
        match self {
            Locale::Ru => format!("{}, {} {} {} г.", weekday, dt.day(), month, dt.year()),
            Locale::En => format!("{}, {} {}, {}", weekday, month, dt.day(), dt.year()),
        }
    }
}
