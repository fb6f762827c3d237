//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the single list screen to Dart via FRB as plain view structs.
//! - Keep error semantics simple: envelopes with `ok` + message, no throws.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One screen per process; `todo_open` replaces any earlier one.

use log::{info, warn};
use mytodo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AddOutcome, CoreConfig, MenuAction, ScreenState, SignInOutcome, TodoRow, TodoScreen,
    TodoService,
};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static SCREEN: OnceLock<Mutex<Option<TodoScreen>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One list row as rendered by the Flutter list widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRowView {
    pub position: u32,
    pub text: String,
    pub is_done: bool,
    pub strikethrough: bool,
    pub italic: bool,
}

/// Screen snapshot returned after every call that may change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoScreenView {
    /// `awaiting_sign_in|active|finished`.
    pub state: String,
    pub rows: Vec<TodoRowView>,
    /// Last snapshot listener error, if the most recent sync failed.
    pub sync_error: Option<String>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    pub ok: bool,
    /// Created document id for synced adds.
    pub document_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, document_id: Option<String>) -> Self {
        Self {
            ok: true,
            document_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            document_id: None,
            message: message.into(),
        }
    }
}

/// Opens the list screen using `MYTODO_*` environment configuration.
///
/// # FFI contract
/// - Sync call; may open the document database.
/// - On failure returns a `finished` view with the reason in `sync_error`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_open() -> TodoScreenView {
    match CoreConfig::from_env() {
        Ok(config) => open_with_config(&config),
        Err(err) => open_failed(err.to_string()),
    }
}

fn open_with_config(config: &CoreConfig) -> TodoScreenView {
    match TodoService::from_config(config) {
        Ok(service) => {
            let screen = TodoScreen::open(service);
            let view = to_screen_view(&screen);
            *lock_slot() = Some(screen);
            info!(
                "event=ffi_open module=ffi status=ok storage={} state={}",
                config.storage.as_str(),
                view.state
            );
            view
        }
        Err(err) => open_failed(err.to_string()),
    }
}

fn open_failed(message: String) -> TodoScreenView {
    warn!("event=ffi_open module=ffi status=error error={message}");
    TodoScreenView {
        state: state_label(ScreenState::Finished).to_string(),
        rows: Vec::new(),
        sync_error: Some(message),
    }
}

/// Completes the pending email sign-in.
///
/// A failed sign-in closes the screen (`finished`), like a dismissed
/// provider flow.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_sign_in(email: String) -> TodoActionResponse {
    match with_screen(|screen| screen.sign_in_with_email(email.trim())) {
        Ok(SignInOutcome::SignedIn(_)) => TodoActionResponse::success("Signed in.", None),
        Ok(SignInOutcome::Cancelled) => TodoActionResponse::failure("Sign-in cancelled."),
        Ok(SignInOutcome::Failed(reason)) => {
            TodoActionResponse::failure(format!("todo_sign_in failed: {reason}"))
        }
        Err(message) => TodoActionResponse::failure(message),
    }
}

/// Reports that the user dismissed the sign-in flow.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_cancel_sign_in() -> TodoScreenView {
    view_after(|screen| screen.on_sign_in_result(SignInOutcome::Cancelled))
}

/// Menu action: log out and prompt for sign-in again.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_log_out() -> TodoScreenView {
    view_after(|screen| screen.select_menu(MenuAction::LogOut))
}

/// Mirrors the input field contents.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_set_input(text: String) -> TodoActionResponse {
    match with_screen(|screen| screen.set_input(text)) {
        Ok(()) => TodoActionResponse::success("", None),
        Err(message) => TodoActionResponse::failure(message),
    }
}

/// Add button: adds the current input text.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_click_add() -> TodoActionResponse {
    match with_screen(|screen| screen.click_add()) {
        Ok(Ok(AddOutcome::Appended)) => TodoActionResponse::success("Todo added.", None),
        Ok(Ok(AddOutcome::Sent(document_id))) => {
            TodoActionResponse::success("Todo sent.", Some(document_id))
        }
        Ok(Ok(AddOutcome::Skipped)) => TodoActionResponse::failure("Not signed in."),
        Ok(Err(err)) => TodoActionResponse::failure(format!("todo_click_add failed: {err}")),
        Err(message) => TodoActionResponse::failure(message),
    }
}

/// Row tap: toggles the item.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_click_row(position: u32) -> TodoScreenView {
    view_after(|screen| {
        screen.click_row(position as usize);
    })
}

/// Delete icon tap: removes the item.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_click_delete(position: u32) -> TodoScreenView {
    view_after(|screen| {
        screen.click_delete(position as usize);
    })
}

/// Applies pending remote snapshots and returns the refreshed view.
///
/// Dart polls this from the UI isolate; snapshots never mutate the list
/// outside of this call.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_pump() -> TodoScreenView {
    view_after(|screen| {
        screen.pump();
    })
}

/// Current rows without applying pending snapshots.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_rows() -> Vec<TodoRowView> {
    with_screen(|screen| screen.rows().into_iter().map(to_row_view).collect())
        .unwrap_or_default()
}

fn lock_slot() -> MutexGuard<'static, Option<TodoScreen>> {
    SCREEN
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn with_screen<R>(f: impl FnOnce(&mut TodoScreen) -> R) -> Result<R, String> {
    let mut slot = lock_slot();
    match slot.as_mut() {
        Some(screen) => Ok(f(screen)),
        None => Err("screen is not open; call todo_open first".to_string()),
    }
}

fn view_after(f: impl FnOnce(&mut TodoScreen)) -> TodoScreenView {
    with_screen(|screen| {
        f(screen);
        to_screen_view(screen)
    })
    .unwrap_or_else(|message| TodoScreenView {
        state: state_label(ScreenState::Finished).to_string(),
        rows: Vec::new(),
        sync_error: Some(message),
    })
}

fn to_screen_view(screen: &TodoScreen) -> TodoScreenView {
    TodoScreenView {
        state: state_label(screen.state()).to_string(),
        rows: screen.rows().into_iter().map(to_row_view).collect(),
        sync_error: screen
            .service()
            .last_sync_error()
            .map(|err| err.to_string()),
    }
}

fn to_row_view(row: TodoRow) -> TodoRowView {
    TodoRowView {
        position: u32::try_from(row.position).unwrap_or(u32::MAX),
        is_done: row.is_done,
        strikethrough: row.style.strikethrough,
        italic: row.style.italic,
        text: row.text,
    }
}

fn state_label(state: ScreenState) -> &'static str {
    match state {
        ScreenState::AwaitingSignIn => "awaiting_sign_in",
        ScreenState::Active => "active",
        ScreenState::Finished => "finished",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, open_with_config, ping, state_label, to_row_view,
        todo_click_add, todo_click_delete, todo_click_row, todo_log_out, todo_pump, todo_rows,
        todo_set_input, todo_sign_in,
    };
    use mytodo_core::{CoreConfig, ScreenState, StorageMode, TextStyle, TodoRow};
    use std::sync::{Mutex, PoisonError};

    // Screen slot is process-wide; flow tests take turns.
    static SLOT_GUARD: Mutex<()> = Mutex::new(());

    fn config(storage: StorageMode, dir: &tempfile::TempDir) -> CoreConfig {
        CoreConfig {
            storage,
            db_path: dir.path().join("documents.sqlite3"),
            log_level: "info",
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn row_view_takes_done_from_the_item() {
        let view = to_row_view(TodoRow {
            position: 2,
            text: "숙제".to_string(),
            is_done: true,
            style: TextStyle::DONE,
        });
        assert_eq!(view.position, 2);
        assert!(view.is_done && view.strikethrough && view.italic);

        let open = to_row_view(TodoRow {
            position: 0,
            text: "청소".to_string(),
            is_done: false,
            style: TextStyle::PLAIN,
        });
        assert!(!open.is_done && !open.strikethrough);
    }

    #[test]
    fn state_labels_are_stable() {
        assert_eq!(state_label(ScreenState::AwaitingSignIn), "awaiting_sign_in");
        assert_eq!(state_label(ScreenState::Active), "active");
        assert_eq!(state_label(ScreenState::Finished), "finished");
    }

    #[test]
    fn memory_screen_adds_toggles_and_deletes() {
        let _guard = SLOT_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();

        let opened = open_with_config(&config(StorageMode::Memory, &dir));
        assert_eq!(opened.state, "active");
        assert!(opened.rows.is_empty());

        assert!(todo_set_input("숙제".to_string()).ok);
        let added = todo_click_add();
        assert!(added.ok, "{}", added.message);
        assert_eq!(added.document_id, None);

        let toggled = todo_click_row(0);
        assert_eq!(toggled.rows.len(), 1);
        assert!(toggled.rows[0].is_done);

        assert!(todo_click_delete(0).rows.is_empty());
        assert!(todo_rows().is_empty());
        assert!(!dir.path().join("documents.sqlite3").exists());
    }

    #[test]
    fn synced_screen_signs_in_adds_and_logs_out() {
        let _guard = SLOT_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();

        let opened = open_with_config(&config(StorageMode::Synced, &dir));
        assert_eq!(opened.state, "awaiting_sign_in", "{:?}", opened.sync_error);
        assert!(!todo_click_add().ok);

        let signed_in = todo_sign_in("kim@example.com".to_string());
        assert!(signed_in.ok, "{}", signed_in.message);

        assert!(todo_set_input("숙제".to_string()).ok);
        let added = todo_click_add();
        assert!(added.ok, "{}", added.message);
        assert!(added.document_id.is_some());

        let rows = todo_pump().rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "숙제");
        assert!(!rows[0].is_done);

        assert!(todo_click_row(0).rows[0].is_done);

        let logged_out = todo_log_out();
        assert_eq!(logged_out.state, "awaiting_sign_in");
        assert!(logged_out.rows.is_empty());
    }
}
