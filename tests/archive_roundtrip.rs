//! End-to-end run through the public API: log in, file a photo with an
//! image, keep a watch-list, reopen everything from disk.
//!
//! Run with: cargo test --test archive_roundtrip

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage};
use keepsake::archive::{Archive, ArchiveError, ArchiveSettings};
use keepsake::config::{self, KeepsakeConfig};
use keepsake::dates::{self, Locale};
use keepsake::imaging::{RustBackend, SourceFile};
use keepsake::session::{AuthError, FileKeyValueStore, Session};
use keepsake::store::{DocumentStore, JsonStore, StoreError};
use keepsake::types::{Feedback, FeedbackKind, Movie, MovieStatus, Photo, Plan};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn users() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("1234".to_string(), "Илья".to_string()),
        ("0608".to_string(), "Аделя".to_string()),
    ])
}

fn open(dir: &Path) -> Archive<JsonStore, RustBackend> {
    Archive::new(
        JsonStore::open(dir).unwrap(),
        RustBackend::new(),
        ArchiveSettings::default(),
    )
}

fn photo(title: &str, year: i32) -> Photo {
    Photo {
        title: title.to_string(),
        year,
        location: "Казань".to_string(),
        description: None,
        image_data: None,
    }
}

#[test]
fn session_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("session.json");

    let session = Session::new(users(), FileKeyValueStore::new(&path));
    assert!(matches!(session.require_user(), Err(AuthError::NotLoggedIn)));
    assert!(matches!(session.login("9999"), Err(AuthError::InvalidCode)));
    assert_eq!(session.login(" 0608 ").unwrap(), "Аделя");

    let reopened = Session::new(users(), FileKeyValueStore::new(&path));
    assert_eq!(reopened.restore().unwrap().as_deref(), Some("Аделя"));

    reopened.logout().unwrap();
    let after = Session::new(users(), FileKeyValueStore::new(&path));
    assert_eq!(after.restore().unwrap(), None);
}

#[test]
fn photo_with_image_is_compressed_and_persisted() {
    let tmp = TempDir::new().unwrap();
    let archive = open(tmp.path());
    let upload = SourceFile::from_bytes("beach.png", png(2000, 1500));

    let saved = archive
        .save_photo(photo("  Море   и солнце ", 2023), Some(&upload), "Илья")
        .unwrap();
    assert_eq!(saved.record.title, "Море и солнце");
    assert_eq!(saved.added_by, "Илья");

    let url = saved.record.image_data.as_deref().unwrap();
    let payload = url.strip_prefix("data:image/jpeg;base64,").unwrap();
    let bytes = STANDARD.decode(payload).unwrap();
    assert!(bytes.len() <= 400 * 1024);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (1200, 900));

    // A fresh handle reads the same document back from disk
    let reopened = open(tmp.path());
    let photos = reopened.photos().unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].id, saved.id);
    assert_eq!(photos[0].record.image_data.as_deref(), Some(url));
}

#[test]
fn photos_group_newest_year_first() {
    let tmp = TempDir::new().unwrap();
    let archive = open(tmp.path());
    archive.save_photo(photo("Первая встреча", 2021), None, "Илья").unwrap();
    archive.save_photo(photo("Горы", 2023), None, "Аделя").unwrap();
    archive.save_photo(photo("Дача", 2021), None, "Илья").unwrap();

    let groups = archive.photos_by_year().unwrap();
    let years: Vec<i32> = groups.iter().map(|g| g.year).collect();
    assert_eq!(years, vec![2023, 2021]);
    assert_eq!(groups[1].photos.len(), 2);
}

#[test]
fn invalid_photo_is_rejected_without_writing() {
    let tmp = TempDir::new().unwrap();
    let archive = open(tmp.path());
    let upload = SourceFile::from_bytes("notes.txt", b"plain text".to_vec());

    let err = archive
        .save_photo(photo("", 2023), Some(&upload), "Илья")
        .unwrap_err();
    let ArchiveError::Invalid(v) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(v.error("title").is_some());
    assert!(v.error("file").is_some());
    assert!(archive.photos().unwrap().is_empty());
}

#[test]
fn watch_list_lifecycle() {
    let tmp = TempDir::new().unwrap();
    let archive = open(tmp.path());
    let movie = Movie {
        title: "Амели".to_string(),
        genre: Some("Комедия".to_string()),
        ..Default::default()
    };
    let added = archive.add_movie(movie, "Аделя").unwrap();
    assert_eq!(added.record.status, MovieStatus::Planned);

    let watched = archive.toggle_status(&added.id, "Илья").unwrap();
    assert_eq!(watched.record.status, MovieStatus::Watched);
    assert!(watched.record.watched_date.is_some());
    assert_eq!(watched.updated_by.as_deref(), Some("Илья"));

    archive.rate_movie(&added.id, 9, "Илья").unwrap();
    archive.review_movie(&added.id, "Очень  тёплый фильм", "Илья").unwrap();

    let lists = open(tmp.path()).movies().unwrap();
    assert!(lists.planned.is_empty());
    assert_eq!(lists.watched[0].record.rating, Some(9));
    assert_eq!(
        lists.watched[0].record.review.as_deref(),
        Some("Очень тёплый фильм")
    );

    // Back to planned drops everything that only makes sense once seen
    let planned = archive.toggle_status(&added.id, "Аделя").unwrap();
    assert_eq!(planned.record.rating, None);
    assert_eq!(planned.record.review, None);
    assert_eq!(planned.record.watched_date, None);

    archive.delete_movie(&added.id).unwrap();
    assert!(matches!(
        archive.delete_movie(&added.id),
        Err(ArchiveError::Store(StoreError::NotFound { .. }))
    ));
}

#[test]
fn plans_and_notes() {
    let tmp = TempDir::new().unwrap();
    let archive = open(tmp.path());
    let plan = Plan {
        title: "Поехать в Питер".to_string(),
        emoji: "  ".to_string(),
        description: None,
    };
    let plan = archive.add_plan(plan, "Илья").unwrap();
    assert_eq!(plan.record.emoji, keepsake::types::DEFAULT_PLAN_EMOJI);

    let note = Feedback {
        text: "Спасибо за ужин".to_string(),
        kind: FeedbackKind::Positive,
    };
    archive.add_feedback(note, "Аделя").unwrap();

    let store = archive.store();
    assert!(store.collection_path(keepsake::types::Collection::Plans).exists());
    assert_eq!(archive.plans().unwrap().len(), 1);
    assert_eq!(archive.feedback().unwrap()[0].record.kind, FeedbackKind::Positive);

    archive.delete_plan(&plan.id).unwrap();
    assert!(store.list::<Plan>().unwrap().is_empty());
}

#[test]
fn config_file_drives_archive_settings() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(config::CONFIG_FILENAME);
    std::fs::write(
        &path,
        r#"
[auth.users]
"1234" = "Илья"

[images]
photo_max_size_kb = 50

[dates]
locale = "en"
together_since = "2020-01-15"
"#,
    )
    .unwrap();

    let loaded: KeepsakeConfig = config::load_config(&path).unwrap();
    assert_eq!(loaded.dates.locale, Locale::En);
    assert_eq!(loaded.images.max_dimension, 1200);

    let settings = ArchiveSettings::from(&loaded.images);
    assert_eq!(settings.photo.max_size_kb, 50);
    assert_eq!(
        loaded.store.resolve_data_dir(tmp.path()),
        tmp.path().join(".keepsake")
    );
}

#[test]
fn relationship_duration_in_both_locales() {
    let now = NaiveDate::from_ymd_opt(2022, 4, 30)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    assert_eq!(
        dates::relationship_duration_at("2020-01-15", &now, Locale::Ru),
        "2 года, 3 месяца и 15 дней"
    );
    assert_eq!(
        dates::relationship_duration_at("2020-01-15", &now, Locale::En),
        "2 years, 3 months and 15 days"
    );
    assert_eq!(
        dates::relationship_duration_at("not a date", &now, Locale::Ru),
        "меньше дня"
    );
}
