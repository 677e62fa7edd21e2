//! # Keepsake
//!
//! A private archive for two: photos, a movie watch-list, plans for the
//! future and little notes for each other, behind a four-digit access code.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Resize and re-encode photos under a size budget; `data:` URLs, metadata, batch runs |
//! | [`dates`] | Date parsing, calendar differences, pluralized Russian/English durations |
//! | [`validation`] | Field rules for records and uploads, text sanitizing |
//! | [`types`] | Record types (`Photo`, `Movie`, `Plan`, `Feedback`) and the `Document` envelope |
//! | [`store`] | Collection storage: JSON files on disk or in memory |
//! | [`session`] | Access-code login over a key-value store |
//! | [`archive`] | Validated record operations tying the above together |
//! | [`config`] | `keepsake.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Quality Ladder Instead of Search
//!
//! Photos are re-encoded as JPEG at quality 0.8, 0.7, … down to 0.1 and the
//! first result under budget wins. Eight attempts at most, each one cheap at
//! 1200 px, and the outcome is predictable: the same photo always lands on
//! the same step. The ladder is held in integer tenths so it cannot drift.
//!
//! ## Images Live Inside Records
//!
//! A compressed photo is stored as a `data:` URL in the record itself. One
//! file per collection is the whole database; copying the data directory is
//! a complete backup.
//!
//! ## Formatters Never Fail
//!
//! Everything in [`dates`] returns a string. Bad input becomes a localized
//! sentinel ("Неверная дата", "меньше дня") so views never have to handle
//! errors from formatting.
//!
//! ## Injected Collaborators
//!
//! The image backend ([`imaging::ImageBackend`]), the document store
//! ([`store::DocumentStore`]) and session storage
//! ([`session::KeyValueStore`]) are traits. Production code uses the `image`
//! crate and JSON files; tests use recording mocks and in-memory stores.

pub mod archive;
pub mod config;
pub mod dates;
pub mod imaging;
pub mod output;
pub mod session;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_helpers;
