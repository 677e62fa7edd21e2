//! Document store for the archive's collections.
//!
//! Records live in named collections ([`Collection`]). A backing store only
//! has to read and write whole collections as JSON values; the typed
//! operations (`create`, `list`, `get`, `upsert`, `delete`) are provided on
//! top of that by the [`DocumentStore`] trait.
//!
//! ## Storage
//!
//! [`JsonStore`] keeps one file per collection in the data directory:
//!
//! ```text
//! .keepsake/
//! ├── photos.json
//! ├── movies.json
//! ├── plans.json
//! └── feedback.json
//! ```
//!
//! Each file is `{"version": 1, "documents": [...]}`. A file written by a
//! different format version is refused rather than overwritten.
//!
//! ## Ids
//!
//! Document ids are the first 20 hex characters of a SHA-256 over the
//! collection name, creation time, a process-wide sequence number and the
//! serialized record.

use crate::types::{Collection, Document, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Version of the collection file format.
const STORE_VERSION: u32 = 1;

const ID_LEN: usize = 20;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{collection}: no document with id {id}")]
    NotFound { collection: Collection, id: String },
    #[error("{}: unsupported store version {}", .path.display(), .found)]
    Version { path: PathBuf, found: u32 },
}

/// Derive a document id.
pub fn document_id(collection: Collection, created_at: &DateTime<Utc>, record: &Value) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let mut hasher = Sha256::new();
    hasher.update(collection.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(created_at.to_rfc3339().as_bytes());
    hasher.update(seq.to_le_bytes());
    hasher.update(record.to_string().as_bytes());
    let mut id = format!("{:x}", hasher.finalize());
    id.truncate(ID_LEN);
    id
}

/// Typed document operations over raw collection storage.
///
/// Implementors provide [`read_collection`](Self::read_collection) and
/// [`write_collection`](Self::write_collection); everything else has a
/// default implementation.
pub trait DocumentStore {
    /// All stored documents of a collection, in storage order.
    fn read_collection(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    /// Replace a collection's contents.
    fn write_collection(&self, collection: Collection, docs: Vec<Value>)
    -> Result<(), StoreError>;

    /// Store a new record, stamping id, creation time and author.
    fn create<T: Record>(&self, record: T, added_by: &str) -> Result<Document<T>, StoreError> {
        let created_at = Utc::now();
        let value = serde_json::to_value(&record)?;
        let doc = Document {
            id: document_id(T::COLLECTION, &created_at, &value),
            created_at,
            added_by: added_by.to_string(),
            updated_at: None,
            updated_by: None,
            record,
        };

        let mut docs = self.read_collection(T::COLLECTION)?;
        docs.insert(0, serde_json::to_value(&doc)?);
        self.write_collection(T::COLLECTION, docs)?;
        info!(collection = %T::COLLECTION, id = %doc.id, added_by, "document created");
        Ok(doc)
    }

    /// Every document, newest `created_at` first.
    fn list<T: Record>(&self) -> Result<Vec<Document<T>>, StoreError> {
        let mut docs = self
            .read_collection(T::COLLECTION)?
            .into_iter()
            .map(serde_json::from_value::<Document<T>>)
            .collect::<Result<Vec<_>, _>>()?;
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    fn get<T: Record>(&self, id: &str) -> Result<Document<T>, StoreError> {
        let value = self
            .read_collection(T::COLLECTION)?
            .into_iter()
            .find(|doc| doc_id(doc) == Some(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: T::COLLECTION,
                id: id.to_string(),
            })?;
        Ok(serde_json::from_value(value)?)
    }

    /// Replace the document with the same id, or insert it.
    fn upsert<T: Record>(&self, doc: &Document<T>) -> Result<(), StoreError> {
        let value = serde_json::to_value(doc)?;
        let mut docs = self.read_collection(T::COLLECTION)?;
        match docs
            .iter_mut()
            .find(|existing| doc_id(existing) == Some(doc.id.as_str()))
        {
            Some(existing) => *existing = value,
            None => docs.insert(0, value),
        }
        self.write_collection(T::COLLECTION, docs)?;
        info!(collection = %T::COLLECTION, id = %doc.id, "document updated");
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut docs = self.read_collection(collection)?;
        let before = docs.len();
        docs.retain(|doc| doc_id(doc) != Some(id));
        if docs.len() == before {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        self.write_collection(collection, docs)?;
        info!(%collection, id, "document deleted");
        Ok(())
    }
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

// ============================================================================
// JSON files
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    version: u32,
    documents: Vec<Value>,
}

/// One JSON file per collection under a data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    /// Open (and create if needed) a store rooted at `data_dir`.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a collection's file.
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.as_str()))
    }
}

impl DocumentStore for JsonStore {
    fn read_collection(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)?;
        let file: CollectionFile = serde_json::from_str(&content)?;
        if file.version != STORE_VERSION {
            return Err(StoreError::Version {
                path,
                found: file.version,
            });
        }
        debug!(%collection, count = file.documents.len(), "collection loaded");
        Ok(file.documents)
    }

    fn write_collection(
        &self,
        collection: Collection,
        documents: Vec<Value>,
    ) -> Result<(), StoreError> {
        let file = CollectionFile {
            version: STORE_VERSION,
            documents,
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(self.collection_path(collection), json)?;
        Ok(())
    }
}

// ============================================================================
// In memory
// ============================================================================

/// Process-local store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn read_collection(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    fn write_collection(
        &self,
        collection: Collection,
        docs: Vec<Value>,
    ) -> Result<(), StoreError> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collection, docs);
        Ok(())
    }
}
