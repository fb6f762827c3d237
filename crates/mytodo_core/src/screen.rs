//! Single list screen controller.
//!
//! # Responsibility
//! - Wire the input field, add button, row adapter and log-out menu action
//!   to the list service.
//! - Drive the sign-in lifecycle: prompt when signed out, close on failure.
//!
//! # Invariants
//! - The adapter always shows the store's latest list; it is refreshed by a
//!   store observer, never patched directly.
//! - Row gestures are queued by adapter callbacks and applied by `pump`, so
//!   the adapter lock is never held while the store notifies.

use crate::auth::{complete_sign_in, SignInOutcome, SignInRequest};
use crate::model::todo::Todo;
use crate::render::adapter::TodoListAdapter;
use crate::render::row::TodoRow;
use crate::service::todo_service::{AddOutcome, ServiceResult, TodoService};
use crate::store::observable::ObserverId;
use log::{info, warn};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Screen lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Sign-in flow launched; waiting for the host to report the outcome.
    AwaitingSignIn,
    Active,
    /// Sign-in failed or was cancelled; the host should close the screen.
    Finished,
}

/// Options menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    LogOut,
}

enum RowGesture {
    Toggle(usize, Todo),
    Delete(usize, Todo),
}

pub struct TodoScreen {
    service: TodoService,
    adapter: Arc<Mutex<TodoListAdapter>>,
    observer: ObserverId,
    gestures: Receiver<RowGesture>,
    input: String,
    state: ScreenState,
    pending_sign_in: Option<SignInRequest>,
}

impl TodoScreen {
    /// Builds the screen around a service.
    ///
    /// Synced lists without a signed-in user start in `AwaitingSignIn`;
    /// with a user they subscribe immediately.
    pub fn open(mut service: TodoService) -> Self {
        let (gesture_tx, gestures) = mpsc::channel();
        let delete_tx = gesture_tx.clone();
        let adapter = TodoListAdapter::new(
            Vec::new(),
            move |position, todo: &Todo| {
                let _ = delete_tx.send(RowGesture::Delete(position, todo.clone()));
            },
            move |position, todo: &Todo| {
                let _ = gesture_tx.send(RowGesture::Toggle(position, todo.clone()));
            },
        );
        let adapter = Arc::new(Mutex::new(adapter));

        let sink = Arc::clone(&adapter);
        let observer = service.observe(move |items| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .set_data(items.clone());
        });

        let mut screen = Self {
            service,
            adapter,
            observer,
            gestures,
            input: String::new(),
            state: ScreenState::Active,
            pending_sign_in: None,
        };

        if let Some(auth) = screen.service.auth() {
            if auth.current_user().is_none() {
                screen.login();
            } else {
                screen.fetch();
            }
        }
        info!(
            "event=screen_open module=screen status=ok synced={} state={:?}",
            screen.service.is_synced(),
            screen.state
        );
        screen
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Sign-in request the host should present, if any.
    pub fn pending_sign_in(&self) -> Option<&SignInRequest> {
        self.pending_sign_in.as_ref()
    }

    pub fn service(&self) -> &TodoService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut TodoService {
        &mut self.service
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Adds the current input text. The input is kept as-is afterwards.
    pub fn click_add(&mut self) -> ServiceResult<AddOutcome> {
        if self.state != ScreenState::Active {
            return Ok(AddOutcome::Skipped);
        }
        let text = self.input.clone();
        let outcome = self.service.add_todo(&text)?;
        self.pump();
        Ok(outcome)
    }

    /// Taps a row body. Returns `false` for positions with no row.
    pub fn click_row(&mut self, position: usize) -> bool {
        let clicked = self.lock_adapter().click_item(position);
        self.pump();
        clicked
    }

    /// Taps a row's delete icon.
    pub fn click_delete(&mut self, position: usize) -> bool {
        let clicked = self.lock_adapter().click_delete(position);
        self.pump();
        clicked
    }

    pub fn select_menu(&mut self, action: MenuAction) {
        match action {
            MenuAction::LogOut => self.logout(),
        }
    }

    /// Reports the result of the host-presented sign-in flow.
    pub fn on_sign_in_result(&mut self, outcome: SignInOutcome) {
        if self.state != ScreenState::AwaitingSignIn {
            warn!("event=sign_in_result module=screen status=ignored state={:?}", self.state);
            return;
        }
        self.pending_sign_in = None;
        match outcome {
            SignInOutcome::SignedIn(_) => {
                self.state = ScreenState::Active;
                info!("event=sign_in_result module=screen status=ok");
                self.fetch();
            }
            SignInOutcome::Cancelled | SignInOutcome::Failed(_) => {
                self.state = ScreenState::Finished;
                info!("event=sign_in_result module=screen status=closed");
            }
        }
    }

    /// Runs the pending email sign-in with `email` and applies the outcome.
    pub fn sign_in_with_email(&mut self, email: &str) -> SignInOutcome {
        let outcome = match (self.service.auth(), self.pending_sign_in.clone()) {
            (Some(auth), Some(request)) => {
                complete_sign_in(auth.as_ref(), &request.with_email(email))
            }
            _ => SignInOutcome::Failed("no sign-in in progress".to_string()),
        };
        self.on_sign_in_result(outcome.clone());
        outcome
    }

    /// Applies queued row gestures and remote snapshots.
    ///
    /// Returns the number of events that changed or replaced the list.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(gesture) = self.gestures.try_recv() {
            let changed = match gesture {
                RowGesture::Toggle(position, todo) => self.service.toggle_todo_at(position, &todo),
                RowGesture::Delete(position, todo) => self.service.delete_todo_at(position, &todo),
            };
            if changed {
                handled += 1;
            }
        }
        handled + self.service.pump_remote_events()
    }

    pub fn rows(&self) -> Vec<TodoRow> {
        self.lock_adapter().rows()
    }

    pub fn item_count(&self) -> usize {
        self.lock_adapter().item_count()
    }

    /// Full invalidations pushed to the adapter so far.
    pub fn render_generation(&self) -> u64 {
        self.lock_adapter().data_set_generation()
    }

    fn login(&mut self) {
        self.pending_sign_in = Some(SignInRequest::email_only());
        self.state = ScreenState::AwaitingSignIn;
        info!("event=sign_in_launch module=screen status=ok provider=email");
    }

    fn logout(&mut self) {
        let Some(auth) = self.service.auth() else {
            return;
        };
        if let Err(err) = auth.sign_out() {
            warn!("event=log_out module=screen status=error error={err}");
        }
        self.service.stop_sync();
        self.service.clear_items();
        self.login();
    }

    fn fetch(&mut self) {
        match self.service.fetch_data() {
            Ok(_) => {
                self.pump();
            }
            Err(err) => warn!("event=fetch_data module=screen status=error error={err}"),
        }
    }

    fn lock_adapter(&self) -> MutexGuard<'_, TodoListAdapter> {
        self.adapter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TodoScreen {
    fn drop(&mut self) {
        self.service.remove_observer(self.observer);
    }
}
