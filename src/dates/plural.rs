//! Slavic three-way plural selection.
//!
//! Russian picks a noun form from the last one or two digits of the count:
//! `1 год`, `3 года`, `5 лет`, `11 лет`, `21 год`. English output reuses the
//! same categories with its own (two distinct) forms.

/// Grammatical plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    /// Ends in 1, except 11.
    One,
    /// Ends in 2–4, except 12–14.
    Few,
    /// Everything else, including 0 and 11–14.
    Many,
}

/// Category for a count. Sign is ignored.
pub fn plural_category(number: i64) -> PluralCategory {
    let n = number.unsigned_abs();
    let n10 = n % 10;
    let n100 = n % 100;

    if n10 == 1 && n100 != 11 {
        PluralCategory::One
    } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
        PluralCategory::Few
    } else {
        PluralCategory::Many
    }
}

/// The three noun forms for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluralForms {
    pub one: &'static str,
    pub few: &'static str,
    pub many: &'static str,
}

impl PluralForms {
    pub const fn new(one: &'static str, few: &'static str, many: &'static str) -> Self {
        Self { one, few, many }
    }

    pub fn select(&self, number: i64) -> &'static str {
        match plural_category(number) {
            PluralCategory::One => self.one,
            PluralCategory::Few => self.few,
            PluralCategory::Many => self.many,
        }
    }
}
