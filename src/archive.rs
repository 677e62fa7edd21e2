//! The archive service: validated record operations over a document store.
//!
//! [`Archive`] ties the pieces together. Photos are validated, compressed
//! with the configured backend and embedded as `data:` URLs; movies move
//! between the watch-list and the watched list; plans and feedback are
//! plain validated records.
//!
//! Store and backend are injected, so tests run against [`MemoryStore`]
//! and a recording mock backend.
//!
//! [`MemoryStore`]: crate::store::MemoryStore

use crate::config::ImagesConfig;
use crate::imaging::{
    BackendError, CompressOptions, ImageBackend, SourceFile, compress_image, to_data_url,
};
use crate::store::{DocumentStore, StoreError};
use crate::types::{Collection, Document, Feedback, Movie, MovieStatus, Photo, Plan};
use crate::validation::{
    Validation, has_invalid_characters, sanitize_string, validate_feedback,
    validate_image_file, validate_movie, validate_photo, validate_plan,
};
use chrono::{Datelike, Local, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("validation failed: {0}")]
    Invalid(Validation),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("image processing failed: {0}")]
    Image(#[from] BackendError),
}

/// Limits applied when photos are saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSettings {
    pub photo: CompressOptions,
    pub max_upload_mb: u64,
}

impl From<&ImagesConfig> for ArchiveSettings {
    fn from(images: &ImagesConfig) -> Self {
        Self {
            photo: images.photo_compress_options(),
            max_upload_mb: images.max_upload_mb,
        }
    }
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self::from(&ImagesConfig::default())
    }
}

/// Photos sharing a year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup {
    pub year: i32,
    pub photos: Vec<Document<Photo>>,
}

/// Movies split by status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieLists {
    pub planned: Vec<Document<Movie>>,
    pub watched: Vec<Document<Movie>>,
}

/// Group photos by year, newest year first. Order within a year is kept.
pub fn group_by_year(photos: Vec<Document<Photo>>) -> Vec<YearGroup> {
    let mut by_year: BTreeMap<i32, Vec<Document<Photo>>> = BTreeMap::new();
    for photo in photos {
        by_year.entry(photo.record.year).or_default().push(photo);
    }
    by_year
        .into_iter()
        .rev()
        .map(|(year, photos)| YearGroup { year, photos })
        .collect()
}

/// Split movies into planned and watched, keeping order.
pub fn partition_movies(movies: Vec<Document<Movie>>) -> MovieLists {
    let (watched, planned) = movies
        .into_iter()
        .partition(|m| m.record.status == MovieStatus::Watched);
    MovieLists { planned, watched }
}

fn reject_markup(v: &mut Validation, field: &'static str, value: &str) {
    if has_invalid_characters(value) {
        v.fail(field, "Недопустимые символы");
    }
}

fn check(v: Validation) -> Result<(), ArchiveError> {
    if v.is_valid() {
        Ok(())
    } else {
        debug!(errors = %v, "record rejected");
        Err(ArchiveError::Invalid(v))
    }
}

fn sanitize_opt(value: Option<String>) -> Option<String> {
    value
        .map(|s| sanitize_string(&s))
        .filter(|s| !s.is_empty())
}

pub struct Archive<S, B> {
    store: S,
    backend: B,
    settings: ArchiveSettings,
}

impl<S: DocumentStore, B: ImageBackend> Archive<S, B> {
    pub fn new(store: S, backend: B, settings: ArchiveSettings) -> Self {
        Self {
            store,
            backend,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Photos
    // ========================================================================

    /// Validate, compress the image (if any) and store the photo.
    pub fn save_photo(
        &self,
        mut photo: Photo,
        image: Option<&SourceFile>,
        user: &str,
    ) -> Result<Document<Photo>, ArchiveError> {
        photo.title = sanitize_string(&photo.title);
        photo.location = sanitize_string(&photo.location);
        photo.description = sanitize_opt(photo.description);

        let mut v = validate_photo(&photo, Local::now().year());
        reject_markup(&mut v, "title", &photo.title);
        reject_markup(&mut v, "location", &photo.location);
        if let Some(image) = image {
            for (field, message) in validate_image_file(image, self.settings.max_upload_mb).errors
            {
                v.fail(field, message);
            }
        }
        check(v)?;

        if let Some(image) = image {
            let result = compress_image(&self.backend, image, &self.settings.photo)?;
            info!(
                name = %image.name,
                original_bytes = image.size_bytes(),
                final_bytes = result.image.size_bytes(),
                "photo image compressed"
            );
            photo.image_data = Some(to_data_url(&result.image));
        }

        Ok(self.store.create(photo, user)?)
    }

    pub fn photos(&self) -> Result<Vec<Document<Photo>>, ArchiveError> {
        Ok(self.store.list()?)
    }

    pub fn photos_by_year(&self) -> Result<Vec<YearGroup>, ArchiveError> {
        Ok(group_by_year(self.photos()?))
    }

    pub fn delete_photo(&self, id: &str) -> Result<(), ArchiveError> {
        Ok(self.store.delete(Collection::Photos, id)?)
    }

    // ========================================================================
    // Movies
    // ========================================================================

    pub fn add_movie(&self, mut movie: Movie, user: &str) -> Result<Document<Movie>, ArchiveError> {
        movie.title = sanitize_string(&movie.title);
        movie.genre = sanitize_opt(movie.genre);
        movie.review = sanitize_opt(movie.review);
        if movie.status == MovieStatus::Watched && movie.watched_date.is_none() {
            movie.watched_date = Some(Utc::now());
        }

        let mut v = validate_movie(&movie);
        reject_markup(&mut v, "title", &movie.title);
        check(v)?;
        Ok(self.store.create(movie, user)?)
    }

    pub fn movies(&self) -> Result<MovieLists, ArchiveError> {
        Ok(partition_movies(self.store.list()?))
    }

    /// Flip planned/watched. Watching stamps the date; going back to planned
    /// clears rating, review and date.
    pub fn toggle_status(&self, id: &str, user: &str) -> Result<Document<Movie>, ArchiveError> {
        let mut doc: Document<Movie> = self.store.get(id)?;
        let movie = &mut doc.record;
        movie.status = movie.status.toggled();
        match movie.status {
            MovieStatus::Watched => movie.watched_date = Some(Utc::now()),
            MovieStatus::Planned => {
                movie.rating = None;
                movie.review = None;
                movie.watched_date = None;
            }
        }
        self.touch_and_save(&mut doc, user)?;
        Ok(doc)
    }

    /// Set a 1–10 rating. Giving the current rating again clears it.
    pub fn rate_movie(
        &self,
        id: &str,
        rating: u8,
        user: &str,
    ) -> Result<Document<Movie>, ArchiveError> {
        if !(1..=10).contains(&rating) {
            let mut v = Validation::default();
            v.fail("rating", "Оценка должна быть от 1 до 10");
            return Err(ArchiveError::Invalid(v));
        }
        let mut doc: Document<Movie> = self.store.get(id)?;
        doc.record.rating = if doc.record.rating == Some(rating) {
            None
        } else {
            Some(rating)
        };
        self.touch_and_save(&mut doc, user)?;
        Ok(doc)
    }

    /// Replace the review; an empty review removes it.
    pub fn review_movie(
        &self,
        id: &str,
        review: &str,
        user: &str,
    ) -> Result<Document<Movie>, ArchiveError> {
        let mut doc: Document<Movie> = self.store.get(id)?;
        doc.record.review = sanitize_opt(Some(review.to_string()));
        self.touch_and_save(&mut doc, user)?;
        Ok(doc)
    }

    pub fn delete_movie(&self, id: &str) -> Result<(), ArchiveError> {
        Ok(self.store.delete(Collection::Movies, id)?)
    }

    fn touch_and_save(&self, doc: &mut Document<Movie>, user: &str) -> Result<(), ArchiveError> {
        doc.updated_at = Some(Utc::now());
        doc.updated_by = Some(user.to_string());
        self.store.upsert(doc)?;
        Ok(())
    }

    // ========================================================================
    // Plans and feedback
    // ========================================================================

    pub fn add_plan(&self, mut plan: Plan, user: &str) -> Result<Document<Plan>, ArchiveError> {
        plan.title = sanitize_string(&plan.title);
        plan.description = sanitize_opt(plan.description);
        let emoji = plan.emoji.trim();
        if emoji.is_empty() {
            plan.emoji = crate::types::DEFAULT_PLAN_EMOJI.to_string();
        } else {
            plan.emoji = emoji.to_string();
        }

        let mut v = validate_plan(&plan);
        reject_markup(&mut v, "title", &plan.title);
        check(v)?;
        Ok(self.store.create(plan, user)?)
    }

    pub fn plans(&self) -> Result<Vec<Document<Plan>>, ArchiveError> {
        Ok(self.store.list()?)
    }

    pub fn delete_plan(&self, id: &str) -> Result<(), ArchiveError> {
        Ok(self.store.delete(Collection::Plans, id)?)
    }

    pub fn add_feedback(
        &self,
        mut feedback: Feedback,
        user: &str,
    ) -> Result<Document<Feedback>, ArchiveError> {
        feedback.text = sanitize_string(&feedback.text);
        let mut v = validate_feedback(&feedback);
        reject_markup(&mut v, "text", &feedback.text);
        check(v)?;
        Ok(self.store.create(feedback, user)?)
    }

    pub fn feedback(&self) -> Result<Vec<Document<Feedback>>, ArchiveError> {
        Ok(self.store.list()?)
    }

    pub fn delete_feedback(&self, id: &str) -> Result<(), ArchiveError> {
        Ok(self.store.delete(Collection::Feedback, id)?)
    }
}
