//! Core domain logic for MyTodo.
//! This crate is the single source of truth for list behavior; UI shells
//! only render rows and forward gestures.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod render;
pub mod screen;
pub mod service;
pub mod store;

pub use auth::email::EmailAuthProvider;
pub use auth::{
    AuthError, AuthProvider, AuthResult, AuthUser, IdentityProvider, SignInOutcome, SignInRequest,
};
pub use config::{ConfigError, CoreConfig, StorageMode};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{validate_entry_text, Todo, TodoValidationError};
pub use remote::{
    DocumentId, DocumentStore, ListenerRegistration, RemoteDocument, RemoteError, RemoteResult,
    Snapshot, SnapshotListener, SqliteDocumentStore,
};
pub use render::adapter::TodoListAdapter;
pub use render::row::{render_rows, TextStyle, TodoRow};
pub use screen::{MenuAction, ScreenState, TodoScreen};
pub use service::todo_service::{AddOutcome, ServiceResult, TodoService, TodoServiceError};
pub use store::observable::{Observable, ObserverId};
pub use store::todo_store::TodoStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
