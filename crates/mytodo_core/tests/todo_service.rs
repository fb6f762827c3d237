use mytodo_core::{
    AddOutcome, AuthProvider, AuthUser, CoreConfig, DocumentId, DocumentStore, EmailAuthProvider,
    ListenerRegistration, RemoteError, RemoteResult, SignInRequest, SnapshotListener,
    SqliteDocumentStore, StorageMode, Todo, TodoService, TodoServiceError, TodoValidationError,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn signed_in_auth(email: &str) -> (Arc<EmailAuthProvider>, AuthUser) {
    let auth = Arc::new(EmailAuthProvider::new());
    let user = auth
        .sign_in(&SignInRequest::email_only().with_email(email))
        .unwrap();
    (auth, user)
}

fn synced_service() -> (TodoService, Arc<SqliteDocumentStore>, AuthUser) {
    let documents = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let (auth, user) = signed_in_auth("kim@example.com");
    let service = TodoService::synced(documents.clone(), auth);
    (service, documents, user)
}

/// Store whose subscriptions only ever report failures.
struct UnreachableStore;

impl DocumentStore for UnreachableStore {
    fn add(&self, _collection: &str, _data: Value) -> RemoteResult<DocumentId> {
        Err(RemoteError::Unavailable("offline".to_string()))
    }

    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> RemoteResult<ListenerRegistration> {
        listener(Err(RemoteError::Unavailable("offline".to_string())));
        Ok(ListenerRegistration::new(1, collection))
    }

    fn unsubscribe(&self, _registration: &ListenerRegistration) -> bool {
        true
    }
}

#[test]
fn local_add_appends_open_item() {
    let mut service = TodoService::in_memory();

    assert_eq!(service.add_todo("숙제").unwrap(), AddOutcome::Appended);
    assert_eq!(service.add_todo("청소").unwrap(), AddOutcome::Appended);

    assert_eq!(service.items(), &[Todo::new("숙제"), Todo::new("청소")]);
    assert!(!service.is_synced());
}

#[test]
fn empty_text_is_rejected_before_any_backend_call() {
    let mut service = TodoService::in_memory();

    let err = service.add_todo("").unwrap_err();

    assert!(matches!(
        err,
        TodoServiceError::Validation(TodoValidationError::EmptyText)
    ));
    assert!(service.items().is_empty());
}

#[test]
fn whitespace_text_is_a_regular_entry() {
    let mut service = TodoService::in_memory();

    assert_eq!(service.add_todo(" ").unwrap(), AddOutcome::Appended);

    assert_eq!(service.items(), &[Todo::new(" ")]);
}

#[test]
fn local_toggle_and_delete_follow_the_worked_example() {
    let mut service = TodoService::in_memory();
    service.add_todo("숙제").unwrap();
    service.add_todo("청소").unwrap();
    service.toggle_todo(&Todo::new("청소"));

    assert!(service.toggle_todo(&Todo::new("숙제")));
    assert_eq!(
        service.items(),
        &[Todo::with_done("숙제", true), Todo::with_done("청소", true)]
    );

    assert!(service.delete_todo(&Todo::with_done("청소", true)));
    assert_eq!(service.items(), &[Todo::with_done("숙제", true)]);

    assert!(!service.delete_todo(&Todo::new("missing")));
    assert_eq!(service.items().len(), 1);
}

#[test]
fn local_service_never_subscribes() {
    let mut service = TodoService::in_memory();
    assert!(!service.fetch_data().unwrap());
    assert!(!service.is_subscribed());
    assert!(service.auth().is_none());
}

#[test]
fn synced_add_is_visible_only_after_the_snapshot_round_trip() {
    let (mut service, documents, user) = synced_service();
    assert!(service.fetch_data().unwrap());
    service.pump_remote_events();

    let outcome = service.add_todo("숙제").unwrap();

    assert!(matches!(outcome, AddOutcome::Sent(_)));
    assert!(service.items().is_empty());
    assert_eq!(documents.snapshot(&user.uid).unwrap().documents.len(), 1);

    assert_eq!(service.pump_remote_events(), 1);
    assert_eq!(service.items(), &[Todo::new("숙제")]);
}

#[test]
fn snapshot_fully_replaces_local_state_and_defaults_missing_flag() {
    let (mut service, documents, user) = synced_service();
    service.fetch_data().unwrap();
    service.pump_remote_events();

    documents
        .add(&user.uid, json!({ "text": "숙제", "isDone": true }))
        .unwrap();
    documents.add(&user.uid, json!({ "text": "청소" })).unwrap();
    service.pump_remote_events();

    assert_eq!(
        service.items(),
        &[Todo::with_done("숙제", true), Todo::new("청소")]
    );
}

#[test]
fn toggle_and_delete_stay_local_and_are_overwritten_by_the_next_snapshot() {
    let (mut service, documents, user) = synced_service();
    service.fetch_data().unwrap();
    service.add_todo("숙제").unwrap();
    service.add_todo("청소").unwrap();
    service.pump_remote_events();

    assert!(service.toggle_todo(&Todo::new("숙제")));
    assert!(service.delete_todo(&Todo::new("청소")));
    assert_eq!(service.items(), &[Todo::with_done("숙제", true)]);

    let stored = documents.snapshot(&user.uid).unwrap();
    assert_eq!(stored.documents.len(), 2);
    assert_eq!(stored.documents[0].data["isDone"], json!(false));

    service.add_todo("빨래").unwrap();
    service.pump_remote_events();
    assert_eq!(
        service.items(),
        &[Todo::new("숙제"), Todo::new("청소"), Todo::new("빨래")]
    );
}

#[test]
fn synced_service_without_user_skips_fetch_and_add() {
    let documents = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let mut service = TodoService::synced(documents.clone(), Arc::new(EmailAuthProvider::new()));

    assert!(!service.fetch_data().unwrap());
    assert_eq!(service.add_todo("숙제").unwrap(), AddOutcome::Skipped);
    assert_eq!(documents.listener_count(), 0);
}

#[test]
fn listener_errors_are_surfaced_and_leave_the_list_alone() {
    let (auth, _) = signed_in_auth("kim@example.com");
    let mut service = TodoService::synced(Arc::new(UnreachableStore), auth);

    assert!(service.fetch_data().unwrap());
    assert_eq!(service.pump_remote_events(), 0);

    assert!(matches!(
        service.last_sync_error(),
        Some(RemoteError::Unavailable(_))
    ));
    assert!(service.items().is_empty());

    let err = service.add_todo("숙제").unwrap_err();
    assert!(matches!(err, TodoServiceError::Remote(RemoteError::Unavailable(_))));
}

#[test]
fn undecodable_document_keeps_previous_list_until_a_good_snapshot() {
    let (mut service, documents, user) = synced_service();
    service.fetch_data().unwrap();
    service.add_todo("숙제").unwrap();
    service.pump_remote_events();

    documents.add(&user.uid, json!({ "text": 42 })).unwrap();
    service.pump_remote_events();

    assert!(matches!(
        service.last_sync_error(),
        Some(RemoteError::InvalidData(_))
    ));
    assert_eq!(service.items(), &[Todo::new("숙제")]);
}

#[test]
fn stop_sync_discards_queued_snapshots() {
    let (mut service, documents, user) = synced_service();
    service.fetch_data().unwrap();
    documents.add(&user.uid, json!({ "text": "queued" })).unwrap();

    assert!(service.stop_sync());
    assert!(!service.is_subscribed());

    assert_eq!(service.pump_remote_events(), 0);
    assert!(service.items().is_empty());
    assert_eq!(documents.listener_count(), 0);
}

#[test]
fn refetch_replaces_the_previous_subscription() {
    let (mut service, documents, _) = synced_service();
    service.fetch_data().unwrap();
    service.fetch_data().unwrap();

    assert_eq!(documents.listener_count(), 1);
    assert_eq!(service.pump_remote_events(), 1);
}

#[test]
fn snapshots_from_other_threads_apply_on_pump() {
    let (mut service, documents, user) = synced_service();
    service.fetch_data().unwrap();
    service.pump_remote_events();

    let writer = Arc::clone(&documents);
    let uid = user.uid.clone();
    thread::spawn(move || {
        writer.add(&uid, json!({ "text": "다른 기기" })).unwrap();
    })
    .join()
    .unwrap();

    assert!(service.items().is_empty());
    service.pump_remote_events();
    assert_eq!(service.items(), &[Todo::new("다른 기기")]);
}

#[test]
fn dropping_the_service_detaches_its_listener() {
    let (mut service, documents, _) = synced_service();
    service.fetch_data().unwrap();
    assert_eq!(documents.listener_count(), 1);

    drop(service);

    assert_eq!(documents.listener_count(), 0);
}

#[test]
fn from_config_builds_the_requested_backend() {
    let memory = TodoService::from_config(&CoreConfig {
        storage: StorageMode::Memory,
        db_path: PathBuf::from("/unused"),
        log_level: "info",
    })
    .unwrap();
    assert!(!memory.is_synced());

    let dir = tempfile::tempdir().unwrap();
    let synced = TodoService::from_config(&CoreConfig {
        storage: StorageMode::Synced,
        db_path: dir.path().join("documents.sqlite3"),
        log_level: "info",
    })
    .unwrap();
    assert!(synced.is_synced());
}

#[test]
fn null_fields_in_documents_fall_back_to_defaults() {
    let (mut service, documents, user) = synced_service();
    service.fetch_data().unwrap();
    service.pump_remote_events();

    documents.add(&user.uid, json!({ "text": "숙제" })).unwrap();
    documents
        .add(&user.uid, json!({ "text": "청소", "isDone": null }))
        .unwrap();
    service.pump_remote_events();

    assert!(service.last_sync_error().is_none());
    assert_eq!(service.items(), &[Todo::new("숙제"), Todo::new("청소")]);
}
