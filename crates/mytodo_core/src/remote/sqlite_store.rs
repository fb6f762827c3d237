//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist per-collection documents in the `documents` table.
//! - Fan out full-collection snapshots to live listeners after writes.
//!
//! # Invariants
//! - Listeners are never invoked while the connection or listener table
//!   lock is held.
//! - Snapshots list documents by insertion sequence.

use crate::db::migrations::latest_version;
use crate::db::{open_db, open_db_in_memory};
use crate::remote::{
    validate_collection, DocumentId, DocumentStore, ListenerRegistration, RemoteDocument,
    RemoteError, RemoteResult, Snapshot, SnapshotListener,
};
use log::{debug, info};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

struct ListenerEntry {
    id: u64,
    collection: String,
    listener: SnapshotListener,
}

/// Document store over one migrated SQLite connection.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
    listeners: Mutex<Vec<ListenerEntry>>,
    next_listener_id: AtomicU64,
}

impl SqliteDocumentStore {
    /// Wraps a connection that already has migrations applied.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match
    ///   this binary.
    pub fn try_new(conn: Connection) -> RemoteResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RemoteError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        Ok(Self {
            conn: Mutex::new(conn),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RemoteResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> RemoteResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Reads the full collection in creation order.
    pub fn snapshot(&self, collection: &str) -> RemoteResult<Snapshot> {
        validate_collection(collection)?;
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT doc_id, body
             FROM documents
             WHERE collection = ?1
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([collection])?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let body: String = row.get(1)?;
            let data: Value = serde_json::from_str(&body).map_err(|err| {
                RemoteError::InvalidData(format!("document `{id}` has unreadable body: {err}"))
            })?;
            documents.push(RemoteDocument { id, data });
        }

        Ok(Snapshot {
            collection: collection.to_string(),
            documents,
        })
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    fn notify(&self, collection: &str) {
        let targets: Vec<SnapshotListener> = self
            .lock_listeners()
            .iter()
            .filter(|entry| entry.collection == collection)
            .map(|entry| SnapshotListener::clone(&entry.listener))
            .collect();

        debug!(
            "event=snapshot_fanout module=remote status=start listeners={}",
            targets.len()
        );
        for listener in targets {
            listener(self.snapshot(collection));
        }
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<ListenerEntry>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn add(&self, collection: &str, data: Value) -> RemoteResult<DocumentId> {
        validate_collection(collection)?;
        if !data.is_object() {
            return Err(RemoteError::InvalidData(
                "document body must be a JSON object".to_string(),
            ));
        }

        let doc_id = Uuid::new_v4().simple().to_string();
        self.lock_conn().execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3);",
            params![collection, doc_id.as_str(), data.to_string()],
        )?;
        info!("event=document_add module=remote status=ok");

        self.notify(collection);
        Ok(doc_id)
    }

    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> RemoteResult<ListenerRegistration> {
        validate_collection(collection)?;
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().push(ListenerEntry {
            id,
            collection: collection.to_string(),
            listener: SnapshotListener::clone(&listener),
        });
        info!("event=snapshot_subscribe module=remote status=ok listener_id={id}");

        listener(self.snapshot(collection));
        Ok(ListenerRegistration::new(id, collection))
    }

    fn unsubscribe(&self, registration: &ListenerRegistration) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|entry| entry.id != registration.id());
        let removed = listeners.len() != before;
        info!(
            "event=snapshot_unsubscribe module=remote status=ok listener_id={} removed={removed}",
            registration.id()
        );
        removed
    }
}
