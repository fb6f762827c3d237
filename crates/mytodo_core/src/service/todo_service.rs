//! To-do list use-case service.
//!
//! # Responsibility
//! - Own the list store and route add/toggle/delete to the active backend.
//! - Subscribe to the signed-in user's collection and apply its snapshots.
//!
//! # Invariants
//! - Store mutations only happen on the thread calling into this service.
//!   Snapshot listeners only enqueue; `pump_remote_events` applies.
//! - Synced `add_todo` never mutates locally; the subscription echoes it back.
//! - `toggle_*`/`delete_*` are local-only in every mode. Under sync they are
//!   not written to the collection and the next snapshot overwrites them.
//! - Snapshots from a replaced or stopped subscription are discarded.

use crate::auth::email::EmailAuthProvider;
use crate::auth::AuthProvider;
use crate::config::{CoreConfig, StorageMode};
use crate::model::todo::{validate_entry_text, Todo, TodoValidationError};
use crate::remote::{
    decode_snapshot, encode_todo, DocumentId, DocumentStore, ListenerRegistration, RemoteError,
    RemoteResult, Snapshot, SnapshotListener, SqliteDocumentStore,
};
use crate::store::observable::ObserverId;
use crate::store::todo_store::TodoStore;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

pub type ServiceResult<T> = Result<T, TodoServiceError>;

#[derive(Debug)]
pub enum TodoServiceError {
    Validation(TodoValidationError),
    Remote(RemoteError),
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Remote(err) => Some(err),
        }
    }
}

impl From<TodoValidationError> for TodoServiceError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RemoteError> for TodoServiceError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// What `add_todo` did with a valid entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Appended to the local list.
    Appended,
    /// Written to the user's collection; visible after the next snapshot.
    Sent(DocumentId),
    /// Synced mode without a signed-in user; nothing happened.
    Skipped,
}

enum Backend {
    Local,
    Synced {
        documents: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
    },
}

type RemoteEvent = (u64, RemoteResult<Snapshot>);

/// List view model.
pub struct TodoService {
    store: TodoStore,
    backend: Backend,
    subscription: Option<ListenerRegistration>,
    sync_generation: u64,
    remote_tx: Sender<RemoteEvent>,
    remote_rx: Receiver<RemoteEvent>,
    last_sync_error: Option<RemoteError>,
}

impl TodoService {
    /// Local-only list; nothing leaves the process.
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Local)
    }

    /// Cloud-synced list over a per-user document collection.
    pub fn synced(documents: Arc<dyn DocumentStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self::with_backend(Backend::Synced { documents, auth })
    }

    /// Builds the service described by runtime configuration.
    pub fn from_config(config: &CoreConfig) -> ServiceResult<Self> {
        match config.storage {
            StorageMode::Memory => Ok(Self::in_memory()),
            StorageMode::Synced => {
                let documents = SqliteDocumentStore::open(&config.db_path)?;
                Ok(Self::synced(
                    Arc::new(documents),
                    Arc::new(EmailAuthProvider::new()),
                ))
            }
        }
    }

    fn with_backend(backend: Backend) -> Self {
        let (remote_tx, remote_rx) = mpsc::channel();
        Self {
            store: TodoStore::new(),
            backend,
            subscription: None,
            sync_generation: 0,
            remote_tx,
            remote_rx,
            last_sync_error: None,
        }
    }

    pub fn items(&self) -> &[Todo] {
        self.store.items()
    }

    pub fn is_synced(&self) -> bool {
        matches!(self.backend, Backend::Synced { .. })
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Auth provider of the synced backend.
    pub fn auth(&self) -> Option<Arc<dyn AuthProvider>> {
        match &self.backend {
            Backend::Local => None,
            Backend::Synced { auth, .. } => Some(Arc::clone(auth)),
        }
    }

    /// Most recent listener or decode error, cleared by the next good snapshot.
    pub fn last_sync_error(&self) -> Option<&RemoteError> {
        self.last_sync_error.as_ref()
    }

    pub fn observe(&mut self, observer: impl FnMut(&Vec<Todo>) + Send + 'static) -> ObserverId {
        self.store.observe(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.store.remove_observer(id)
    }

    /// Subscribes to the signed-in user's collection.
    ///
    /// Replaces any earlier subscription. Returns `Ok(false)` for local
    /// lists and when nobody is signed in.
    pub fn fetch_data(&mut self) -> ServiceResult<bool> {
        let (documents, auth) = match &self.backend {
            Backend::Local => return Ok(false),
            Backend::Synced { documents, auth } => (Arc::clone(documents), Arc::clone(auth)),
        };
        let Some(user) = auth.current_user() else {
            debug!("event=fetch_data module=service status=skipped reason=no_user");
            return Ok(false);
        };

        self.stop_sync();
        let generation = self.sync_generation;
        let tx = self.remote_tx.clone();
        let listener: SnapshotListener = Arc::new(move |result| {
            // Receiver gone means the service was dropped; nothing to update.
            let _ = tx.send((generation, result));
        });

        let registration = documents.subscribe(&user.uid, listener)?;
        info!(
            "event=fetch_data module=service status=ok listener_id={}",
            registration.id()
        );
        self.subscription = Some(registration);
        Ok(true)
    }

    /// Detaches the active subscription and discards its queued snapshots.
    pub fn stop_sync(&mut self) -> bool {
        self.sync_generation += 1;
        let Some(registration) = self.subscription.take() else {
            return false;
        };
        match &self.backend {
            Backend::Synced { documents, .. } => documents.unsubscribe(&registration),
            Backend::Local => false,
        }
    }

    /// Adds a new open item from user-entered text.
    ///
    /// # Errors
    /// - `Validation` for blank text.
    /// - `Remote` when the synced create fails.
    pub fn add_todo(&mut self, text: &str) -> ServiceResult<AddOutcome> {
        validate_entry_text(text)?;
        let todo = Todo::new(text);

        match &self.backend {
            Backend::Local => {
                self.store.add(todo);
                info!(
                    "event=todo_add module=service status=ok mode=local count={}",
                    self.store.len()
                );
                Ok(AddOutcome::Appended)
            }
            Backend::Synced { documents, auth } => {
                let Some(user) = auth.current_user() else {
                    debug!("event=todo_add module=service status=skipped reason=no_user");
                    return Ok(AddOutcome::Skipped);
                };
                let doc_id = documents.add(&user.uid, encode_todo(&todo)?)?;
                info!("event=todo_add module=service status=ok mode=synced");
                Ok(AddOutcome::Sent(doc_id))
            }
        }
    }

    /// Flips the first item equal to `todo`. Local only.
    pub fn toggle_todo(&mut self, todo: &Todo) -> bool {
        let changed = self.store.toggle(todo);
        log_local_mutation("todo_toggle", changed);
        changed
    }

    /// Removes the first item equal to `todo`. Local only.
    pub fn delete_todo(&mut self, todo: &Todo) -> bool {
        let changed = self.store.delete(todo);
        log_local_mutation("todo_delete", changed);
        changed
    }

    /// Toggles the item a row gesture referred to. Local only.
    pub fn toggle_todo_at(&mut self, position: usize, todo: &Todo) -> bool {
        let changed = self.store.toggle_at(position, todo);
        log_local_mutation("todo_toggle", changed);
        changed
    }

    /// Deletes the item a row gesture referred to. Local only.
    pub fn delete_todo_at(&mut self, position: usize, todo: &Todo) -> bool {
        let changed = self.store.delete_at(position, todo);
        log_local_mutation("todo_delete", changed);
        changed
    }

    /// Empties the visible list without touching any collection.
    pub fn clear_items(&mut self) {
        self.store.clear();
    }

    /// Applies queued snapshots on the calling thread.
    ///
    /// Each good snapshot replaces the whole list. Errors are logged and kept
    /// in `last_sync_error`; the list is left as it was and nothing retries.
    /// Returns the number of snapshots applied.
    pub fn pump_remote_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((generation, result)) = self.remote_rx.try_recv() {
            if generation != self.sync_generation {
                debug!("event=snapshot_apply module=service status=skipped reason=stale");
                continue;
            }

            match result.and_then(|snapshot| decode_snapshot(&snapshot)) {
                Ok(items) => {
                    let count = items.len();
                    self.store.replace_all(items);
                    self.last_sync_error = None;
                    applied += 1;
                    debug!("event=snapshot_apply module=service status=ok count={count}");
                }
                Err(err) => {
                    warn!(
                        "event=snapshot_apply module=service status=error error={}",
                        err
                    );
                    self.last_sync_error = Some(err);
                }
            }
        }
        applied
    }
}

impl Drop for TodoService {
    fn drop(&mut self) {
        self.stop_sync();
    }
}

fn log_local_mutation(event: &str, changed: bool) {
    if changed {
        info!("event={event} module=service status=ok");
    } else {
        debug!("event={event} module=service status=noop reason=not_found");
    }
}
