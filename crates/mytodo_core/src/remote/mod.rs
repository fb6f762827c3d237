//! Per-user document collections and live snapshots.
//!
//! # Responsibility
//! - Define the document store seam used by cloud-synced lists.
//! - Encode items into documents and decode snapshots back into items.
//!
//! # Invariants
//! - One collection per tenant; collection names are ASCII `[A-Za-z0-9_-]+`.
//! - Every snapshot carries the full collection in creation order.
//! - Undecodable documents fail the whole snapshot instead of being skipped.

use crate::db::DbError;
use crate::model::todo::Todo;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod sqlite_store;

pub use sqlite_store::SqliteDocumentStore;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Stable id assigned by the store on create.
pub type DocumentId = String;

#[derive(Debug)]
pub enum RemoteError {
    InvalidCollection(String),
    InvalidData(String),
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    Unavailable(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCollection(name) => write!(f, "invalid collection name: `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid document data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "document store requires schema version {expected_version}, found {actual_version}"
            ),
            Self::Unavailable(message) => write!(f, "document store unavailable: {message}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RemoteError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RemoteError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub id: DocumentId,
    pub data: Value,
}

/// Full contents of one collection at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<RemoteDocument>,
}

/// Snapshot callback. May run on any thread; implementations must only
/// hand the result off, never touch UI-bound state directly.
pub type SnapshotListener = Arc<dyn Fn(RemoteResult<Snapshot>) + Send + Sync>;

/// Handle for an active subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerRegistration {
    id: u64,
    collection: String,
}

impl ListenerRegistration {
    pub fn new(id: u64, collection: impl Into<String>) -> Self {
        Self {
            id,
            collection: collection.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// Document store seam.
pub trait DocumentStore: Send + Sync {
    /// Creates one document; the write reaches listeners as a new snapshot.
    fn add(&self, collection: &str, data: Value) -> RemoteResult<DocumentId>;

    /// Subscribes to a collection. The current snapshot is delivered right
    /// away, then one snapshot after each write.
    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> RemoteResult<ListenerRegistration>;

    /// Detaches a subscription. Returns `false` when it was already gone.
    fn unsubscribe(&self, registration: &ListenerRegistration) -> bool;
}

/// Checks a tenant collection name.
pub fn validate_collection(name: &str) -> RemoteResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RemoteError::InvalidCollection(name.to_string()))
    }
}

/// Encodes an item as a document body.
pub fn encode_todo(todo: &Todo) -> RemoteResult<Value> {
    serde_json::to_value(todo).map_err(|err| RemoteError::InvalidData(err.to_string()))
}

/// Decodes one document, defaulting absent or null `text` to `""` and
/// `isDone` to `false`.
pub fn decode_todo(document: &RemoteDocument) -> RemoteResult<Todo> {
    if !document.data.is_object() {
        return Err(RemoteError::InvalidData(format!(
            "document `{}` is not an object",
            document.id
        )));
    }
    Todo::deserialize(&document.data)
        .map_err(|err| RemoteError::InvalidData(format!("document `{}`: {err}", document.id)))
}

/// Decodes a whole snapshot, preserving document order.
pub fn decode_snapshot(snapshot: &Snapshot) -> RemoteResult<Vec<Todo>> {
    snapshot.documents.iter().map(decode_todo).collect()
}
