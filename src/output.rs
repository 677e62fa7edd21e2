//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Compress
//!
//! ```text
//! beach.jpg: 3.2 MB → 412.5 KB (1200x800, quality 70%)
//! notes.txt: kept as is (12 Bytes)
//! broken.png: failed: IO error: ...
//!
//! Compressed 1 of 3 files, 3.2 MB → 412.5 KB
//! ```
//!
//! ## Photos
//!
//! ```text
//! 2023 (2 photos)
//!     001 Закат
//!         Казань, added by Илья on 14.02.2023
//!         Id: 4f1c2d...
//! ```
//!
//! ## Movies
//!
//! ```text
//! Watched (1)
//!     001 Амели [drama]
//!         ★★★★★★★★★☆ 9/10
//! Planned (1)
//!     001 Up
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability; [`print_lines`] writes them to stdout. Format functions are
//! pure: no I/O, no clock.

use crate::archive::{MovieLists, YearGroup};
use crate::dates::{DateDifference, Locale, describe_difference, format_short};
use crate::imaging::{CompressEvent, ImageMetadata, format_file_size};
use crate::types::{Document, Feedback, FeedbackKind, Movie, Plan};
use chrono::{DateTime, Local, Utc};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

fn short_date(t: &DateTime<Utc>) -> String {
    format_short(&t.with_timezone(&Local).naive_local())
}

fn added_line<T>(doc: &Document<T>) -> String {
    format!("added by {} on {}", doc.added_by, short_date(&doc.created_at))
}

/// Ten-star bar: `★★★★★★★☆☆☆ 7/10`.
fn rating_bar(rating: u8) -> String {
    let filled = usize::from(rating.min(10));
    format!("{}{} {}/10", "★".repeat(filled), "☆".repeat(10 - filled), rating)
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Compress
// ============================================================================

/// Format a single compression progress event.
pub fn format_compress_event(event: &CompressEvent) -> Vec<String> {
    match event {
        CompressEvent::Compressed {
            name,
            original_bytes,
            final_bytes,
            quality,
            dimensions,
        } => vec![format!(
            "{}: {} → {} ({}x{}, quality {})",
            name,
            format_file_size(*original_bytes as u64),
            format_file_size(*final_bytes as u64),
            dimensions.width,
            dimensions.height,
            quality
        )],
        CompressEvent::Passthrough { name, bytes } => vec![format!(
            "{}: kept as is ({})",
            name,
            format_file_size(*bytes as u64)
        )],
        CompressEvent::Failed { name, error } => vec![format!("{}: failed: {}", name, error)],
    }
}

/// One-line total over all events of a run.
pub fn format_compress_summary(events: &[CompressEvent]) -> String {
    let mut compressed = 0;
    let mut before: u64 = 0;
    let mut after: u64 = 0;
    for event in events {
        if let CompressEvent::Compressed {
            original_bytes,
            final_bytes,
            ..
        } = event
        {
            compressed += 1;
            before += *original_bytes as u64;
            after += *final_bytes as u64;
        }
    }
    format!(
        "Compressed {} of {} files, {} → {}",
        compressed,
        events.len(),
        format_file_size(before),
        format_file_size(after)
    )
}

// ============================================================================
// Info
// ============================================================================

pub fn format_metadata(name: &str, meta: &ImageMetadata) -> Vec<String> {
    let mut lines = vec![
        name.to_string(),
        format!("{}Dimensions: {}x{}", indent(1), meta.width, meta.height),
        format!("{}Aspect ratio: {}", indent(1), meta.aspect_ratio),
        format!("{}Size: {}", indent(1), meta.size),
        format!("{}Type: {}", indent(1), meta.mime_type),
    ];
    if !meta.last_modified.is_empty() {
        lines.push(format!("{}Modified: {}", indent(1), meta.last_modified));
    }
    lines
}

// ============================================================================
// Dates
// ============================================================================

/// Lines for `keepsake since`: the start date, the calendar duration and the
/// plain day count.
pub fn format_together(start: &str, diff: &DateDifference, locale: Locale) -> Vec<String> {
    let (since, days) = match locale {
        Locale::Ru => ("Вместе с", "дней всего"),
        Locale::En => ("Together since", "days in total"),
    };
    vec![
        format!("{} {}", since, start),
        format!("{}{}", indent(1), describe_difference(diff, locale)),
        format!("{}{} {}", indent(1), diff.total_days, days),
    ]
}

// ============================================================================
// Records
// ============================================================================

pub fn format_photos(groups: &[YearGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("{} ({} photos)", group.year, group.photos.len()));
        for (i, doc) in group.photos.iter().enumerate() {
            let photo = &doc.record;
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(i + 1),
                photo.title
            ));
            lines.push(format!(
                "{}{}, {}",
                indent(2),
                photo.location,
                added_line(doc)
            ));
            if let Some(desc) = &photo.description {
                lines.push(format!("{}{}", indent(2), truncate(desc, 60)));
            }
            if let Some(data) = &photo.image_data {
                lines.push(format!(
                    "{}Image: {} encoded",
                    indent(2),
                    format_file_size(data.len() as u64)
                ));
            }
            lines.push(format!("{}Id: {}", indent(2), doc.id));
        }
    }
    if lines.is_empty() {
        lines.push("No photos yet".to_string());
    }
    lines
}

fn movie_lines(movies: &[Document<Movie>]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, doc) in movies.iter().enumerate() {
        let movie = &doc.record;
        let header = match &movie.genre {
            Some(genre) => format!("{} {} [{}]", format_index(i + 1), movie.title, genre),
            None => format!("{} {}", format_index(i + 1), movie.title),
        };
        lines.push(format!("{}{}", indent(1), header));
        if let Some(rating) = movie.rating {
            lines.push(format!("{}{}", indent(2), rating_bar(rating)));
        }
        if let Some(date) = &movie.watched_date {
            lines.push(format!("{}Watched on {}", indent(2), short_date(date)));
        }
        if let Some(review) = &movie.review {
            lines.push(format!("{}\"{}\"", indent(2), truncate(review, 60)));
        }
        lines.push(format!("{}Id: {}", indent(2), doc.id));
    }
    lines
}

pub fn format_movies(lists: &MovieLists) -> Vec<String> {
    let mut lines = vec![format!("Watched ({})", lists.watched.len())];
    lines.extend(movie_lines(&lists.watched));
    lines.push(format!("Planned ({})", lists.planned.len()));
    lines.extend(movie_lines(&lists.planned));
    lines
}

pub fn format_plans(plans: &[Document<Plan>]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, doc) in plans.iter().enumerate() {
        let plan = &doc.record;
        lines.push(format!(
            "{} {} {}",
            format_index(i + 1),
            plan.emoji,
            plan.title
        ));
        if let Some(desc) = &plan.description {
            lines.push(format!("{}{}", indent(1), truncate(desc, 60)));
        }
        lines.push(format!("{}{}, id {}", indent(1), added_line(doc), doc.id));
    }
    if lines.is_empty() {
        lines.push("No plans yet".to_string());
    }
    lines
}

pub fn format_feedback(notes: &[Document<Feedback>]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, doc) in notes.iter().enumerate() {
        let marker = match doc.record.kind {
            FeedbackKind::Positive => "+",
            FeedbackKind::Negative => "-",
        };
        lines.push(format!(
            "{} [{}] {}",
            format_index(i + 1),
            marker,
            doc.record.text
        ));
        lines.push(format!("{}{}, id {}", indent(1), added_line(doc), doc.id));
    }
    if lines.is_empty() {
        lines.push("No notes yet".to_string());
    }
    lines
}
