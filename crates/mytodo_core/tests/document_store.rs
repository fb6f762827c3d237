use mytodo_core::db::migrations::latest_version;
use mytodo_core::{
    DocumentStore, RemoteError, RemoteResult, Snapshot, SnapshotListener, SqliteDocumentStore,
};
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::thread;

type Received = Arc<Mutex<Vec<RemoteResult<Snapshot>>>>;

fn recording_listener() -> (SnapshotListener, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let listener: SnapshotListener = Arc::new(move |result| sink.lock().unwrap().push(result));
    (listener, received)
}

fn texts(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .documents
        .iter()
        .map(|doc| doc.data["text"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn subscribe_delivers_current_snapshot_immediately() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    store.add("user1", json!({ "text": "숙제" })).unwrap();

    let (listener, received) = recording_listener();
    let registration = store.subscribe("user1", listener).unwrap();

    assert_eq!(registration.collection(), "user1");
    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let snapshot = received[0].as_ref().unwrap();
    assert_eq!(snapshot.collection, "user1");
    assert_eq!(texts(snapshot), vec!["숙제"]);
}

#[test]
fn add_fans_out_full_snapshot_in_creation_order() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let (listener, received) = recording_listener();
    store.subscribe("user1", listener).unwrap();

    let first = store.add("user1", json!({ "text": "a" })).unwrap();
    let second = store.add("user1", json!({ "text": "b", "isDone": true })).unwrap();
    assert_ne!(first, second);

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 3);
    let latest = received[2].as_ref().unwrap();
    assert_eq!(texts(latest), vec!["a", "b"]);
    assert_eq!(latest.documents[0].id, first);
    assert_eq!(latest.documents[1].id, second);
}

#[test]
fn collections_are_isolated_per_user() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let (listener, received) = recording_listener();
    store.subscribe("alice", listener).unwrap();

    store.add("bob", json!({ "text": "bob only" })).unwrap();

    assert_eq!(received.lock().unwrap().len(), 1);
    assert!(store.snapshot("alice").unwrap().documents.is_empty());
    assert_eq!(texts(&store.snapshot("bob").unwrap()), vec!["bob only"]);
}

#[test]
fn unsubscribed_listener_receives_nothing_more() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let (listener, received) = recording_listener();
    let registration = store.subscribe("user1", listener).unwrap();

    assert!(store.unsubscribe(&registration));
    assert!(!store.unsubscribe(&registration));
    store.add("user1", json!({ "text": "late" })).unwrap();

    assert_eq!(received.lock().unwrap().len(), 1);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn invalid_collection_and_body_are_rejected() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let (listener, _) = recording_listener();

    assert!(matches!(
        store.add("a/b", json!({ "text": "x" })),
        Err(RemoteError::InvalidCollection(_))
    ));
    assert!(matches!(
        store.subscribe("", listener),
        Err(RemoteError::InvalidCollection(_))
    ));
    assert!(matches!(
        store.add("user1", json!(["x"])),
        Err(RemoteError::InvalidData(_))
    ));
    assert!(store.snapshot("user1").unwrap().documents.is_empty());
}

#[test]
fn writes_from_another_thread_reach_listeners() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let (listener, received) = recording_listener();
    store.subscribe("user1", listener).unwrap();

    let writer = Arc::clone(&store);
    thread::spawn(move || {
        writer.add("user1", json!({ "text": "from elsewhere" })).unwrap();
    })
    .join()
    .unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(
        texts(received[1].as_ref().unwrap()),
        vec!["from elsewhere"]
    );
}

#[test]
fn documents_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("documents.sqlite3");

    {
        let store = SqliteDocumentStore::open(&path).unwrap();
        store.add("user1", json!({ "text": "kept" })).unwrap();
    }

    let reopened = SqliteDocumentStore::open(&path).unwrap();
    assert_eq!(texts(&reopened.snapshot("user1").unwrap()), vec!["kept"]);
}

#[test]
fn unreadable_stored_body_fails_the_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.sqlite3");
    let store = SqliteDocumentStore::open(&path).unwrap();
    store.add("user1", json!({ "text": "fine" })).unwrap();
    drop(store);
    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO documents (collection, doc_id, body) VALUES ('user1', 'broken', '{not json');",
        [],
    )
    .unwrap();
    drop(conn);

    let reopened = SqliteDocumentStore::open(&path).unwrap();
    assert!(matches!(
        reopened.snapshot("user1"),
        Err(RemoteError::InvalidData(_))
    ));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteDocumentStore::try_new(conn) {
        Err(RemoteError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}
