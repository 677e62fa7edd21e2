//! Record types kept in the document store.
//!
//! Each collection has one explicit struct; optional fields are `Option`s
//! rather than keys that may or may not exist. The store wraps every record
//! in a [`Document`] envelope carrying its id and authorship.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four collections of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Photos,
    Movies,
    Plans,
    Feedback,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Photos => "photos",
            Collection::Movies => "movies",
            Collection::Plans => "plans",
            Collection::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type that lives in exactly one collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;
}

/// Stored record plus envelope fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Display name of whoever created the record.
    pub added_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(flatten)]
    pub record: T,
}

/// A photo in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub title: String,
    pub year: i32,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Compressed image as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl Record for Photo {
    const COLLECTION: Collection = Collection::Photos;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieStatus {
    #[default]
    Planned,
    Watched,
}

impl MovieStatus {
    pub fn toggled(self) -> Self {
        match self {
            MovieStatus::Planned => MovieStatus::Watched,
            MovieStatus::Watched => MovieStatus::Planned,
        }
    }
}

impl fmt::Display for MovieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MovieStatus::Planned => "planned",
            MovieStatus::Watched => "watched",
        })
    }
}

/// An entry on the watch-list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub status: MovieStatus,
    /// 1–10, only meaningful once watched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_date: Option<DateTime<Utc>>,
}

impl Record for Movie {
    const COLLECTION: Collection = Collection::Movies;
}

pub const DEFAULT_PLAN_EMOJI: &str = "✨";

fn default_plan_emoji() -> String {
    DEFAULT_PLAN_EMOJI.to_string()
}

/// Something to do together some day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub title: String,
    #[serde(default = "default_plan_emoji")]
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for Plan {
    const COLLECTION: Collection = Collection::Plans;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Positive,
    Negative,
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FeedbackKind::Positive => "positive",
            FeedbackKind::Negative => "negative",
        })
    }
}

/// A note one partner leaves for the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
}

impl Record for Feedback {
    const COLLECTION: Collection = Collection::Feedback;
}
