//! Field rules for records and uploads.
//!
//! Each `validate_*` function checks every field and collects one message
//! per failing field, so callers can show all problems at once. Lengths count
//! Unicode scalar values. Messages are in Russian, the archive's language.

use crate::imaging::SourceFile;
use crate::types::{Feedback, Movie, Photo, Plan};
use std::collections::BTreeMap;
use std::fmt;

/// MIME types accepted for photo uploads.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

pub const DEFAULT_MAX_UPLOAD_MB: u64 = 10;

/// Earliest year a photo may carry.
pub const MIN_PHOTO_YEAR: i32 = 1900;

/// Per-field error messages. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: BTreeMap<&'static str, String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub(crate) fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Validate a photo. `current_year` bounds the year from above (plus ten).
pub fn validate_photo(photo: &Photo, current_year: i32) -> Validation {
    let mut v = Validation::default();

    if is_blank(&photo.title) {
        v.fail("title", "Название обязательно");
    } else if char_len(&photo.title) > 100 {
        v.fail("title", "Название не должно превышать 100 символов");
    }

    if photo.year == 0 {
        v.fail("year", "Год обязателен");
    } else if !(MIN_PHOTO_YEAR..=current_year + 10).contains(&photo.year) {
        v.fail("year", "Введите корректный год");
    }

    if is_blank(&photo.location) {
        v.fail("location", "Место обязательно");
    } else if char_len(&photo.location) > 100 {
        v.fail("location", "Место не должно превышать 100 символов");
    }

    if photo
        .description
        .as_deref()
        .is_some_and(|d| char_len(d) > 500)
    {
        v.fail("description", "Описание не должно превышать 500 символов");
    }

    v
}

pub fn validate_movie(movie: &Movie) -> Validation {
    let mut v = Validation::default();

    if is_blank(&movie.title) {
        v.fail("title", "Название фильма обязательно");
    } else if char_len(&movie.title) < 2 {
        v.fail("title", "Название должно содержать минимум 2 символа");
    } else if char_len(&movie.title) > 200 {
        v.fail("title", "Название не должно превышать 200 символов");
    }

    if movie.rating.is_some_and(|r| !(1..=10).contains(&r)) {
        v.fail("rating", "Оценка должна быть от 1 до 10");
    }

    v
}

pub fn validate_plan(plan: &Plan) -> Validation {
    let mut v = Validation::default();

    if is_blank(&plan.title) {
        v.fail("title", "Название плана обязательно");
    } else if char_len(&plan.title) < 3 {
        v.fail("title", "Название должно содержать минимум 3 символа");
    } else if char_len(&plan.title) > 150 {
        v.fail("title", "Название не должно превышать 150 символов");
    }

    if char_len(&plan.emoji) > 2 {
        v.fail("emoji", "Слишком много символов в эмодзи");
    }

    if plan
        .description
        .as_deref()
        .is_some_and(|d| char_len(d) > 1000)
    {
        v.fail("description", "Описание не должно превышать 1000 символов");
    }

    v
}

pub fn validate_feedback(feedback: &Feedback) -> Validation {
    let mut v = Validation::default();

    if is_blank(&feedback.text) {
        v.fail("text", "Текст отзыва обязателен");
    } else if char_len(&feedback.text) < 5 {
        v.fail("text", "Отзыв должен содержать минимум 5 символов");
    } else if char_len(&feedback.text) > 500 {
        v.fail("text", "Отзыв не должен превышать 500 символов");
    }

    v
}

/// Check an upload's MIME type and size. An oversize file reports the size
/// problem even when the type is also wrong.
pub fn validate_image_file(file: &SourceFile, max_upload_mb: u64) -> Validation {
    let mut v = Validation::default();

    if !ALLOWED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
        v.fail("file", "Файл должен быть изображением (JPG, PNG, GIF, WebP)");
    }

    if file.size_bytes() as u64 > max_upload_mb.saturating_mul(1024 * 1024) {
        v.fail(
            "file",
            format!("Размер файла не должен превышать {max_upload_mb} МБ"),
        );
    }

    v
}

/// Trim and collapse internal whitespace runs to a single space.
pub fn sanitize_string(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape text for inclusion in HTML.
pub fn escape_html(s: &str) -> String {
    maud::html! { (s) }.into_string()
}

const DANGEROUS_PATTERNS: &[&str] = &["<script", "<iframe", "javascript:", "data:"];

/// Whether the text contains markup or URL schemes that could execute.
pub fn has_invalid_characters(s: &str) -> bool {
    let lower = s.to_lowercase();
    DANGEROUS_PATTERNS.iter().any(|p| lower.contains(p))
}

fn is_emoji_char(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F
            | 0x1F300..=0x1F5FF
            | 0x1F680..=0x1F6FF
            | 0x1F900..=0x1F9FF
            | 0x1F1E0..=0x1F1FF
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
            // variation selector, zero-width joiner
            | 0xFE0F
            | 0x200D
    )
}

/// Whether the trimmed text is non-empty and made only of emoji.
pub fn is_only_emoji(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.chars().all(is_emoji_char)
}
