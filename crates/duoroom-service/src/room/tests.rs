use std::sync::{Arc, Mutex};

use bytes::Bytes;

use duoroom_core::config::RoomsConfig;
use duoroom_core::error::ErrorKind;
use duoroom_core::traits::storage::ObjectStorage;
use duoroom_core::types::{FileId, RoomId};
use duoroom_database::Stores;
use duoroom_entity::{EventPayload, RoomEvent, SystemNotice};
use duoroom_storage::MemoryStorageProvider;

use super::{EventPublisher, RoomRegistry};
use crate::context::MemberContext;

#[derive(Debug, Default)]
struct RecordingPublisher {
    events: Mutex<Vec<(RoomId, RoomEvent)>>,
    departures: Mutex<Vec<(RoomId, String)>>,
}

impl RecordingPublisher {
    fn seqs(&self, room_id: &RoomId) -> Vec<i64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == room_id)
            .map(|(_, e)| e.seq)
            .collect()
    }

    fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    fn departed(&self, room_id: &RoomId) -> Vec<String> {
        self.departures
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == room_id)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, room_id: &RoomId, event: &RoomEvent) {
        self.events
            .lock()
            .unwrap()
            .push((room_id.clone(), event.clone()));
    }

    fn member_departed(&self, room_id: &RoomId, member: &str) {
        self.departures
            .lock()
            .unwrap()
            .push((room_id.clone(), member.to_string()));
    }
}

struct Fixture {
    registry: RoomRegistry,
    publisher: Arc<RecordingPublisher>,
    storage: Arc<MemoryStorageProvider>,
}

fn fixture() -> Fixture {
    let publisher = Arc::new(RecordingPublisher::default());
    let storage = Arc::new(MemoryStorageProvider::new());
    let registry = RoomRegistry::new(
        &Stores::in_memory(),
        storage.clone(),
        publisher.clone(),
        RoomsConfig::default(),
        1024,
    );
    Fixture {
        registry,
        publisher,
        storage,
    }
}

fn notice(event: &RoomEvent) -> &SystemNotice {
    match &event.payload {
        EventPayload::System { notice, .. } => notice,
        other => panic!("expected a system notice, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_join_and_full_room() {
    let f = fixture();
    let seat = f.registry.create("alice").await.unwrap();
    let room_id = seat.room.id.clone();
    assert_eq!(seat.room.members, vec!["alice"]);

    let history = f.registry.history(&room_id, None, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        notice(&history[0]),
        &SystemNotice::RoomCreated {
            by: "alice".to_string()
        }
    );

    let bob = f.registry.join(&room_id, "bob").await.unwrap();
    assert_eq!(bob.room.members, vec!["alice", "bob"]);
    let joined = bob.notice.expect("joined notice");
    assert_eq!(joined.member.as_deref(), Some("bob"));

    let err = f.registry.join(&room_id, "carol").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::RoomFull);
    assert_eq!(
        f.registry.room(&room_id).await.unwrap().members,
        vec!["alice", "bob"]
    );
    // Failed joins publish nothing.
    assert_eq!(f.publisher.count(), 2);
}

#[tokio::test]
async fn test_rejoin_is_idempotent() {
    let f = fixture();
    let room_id = f.registry.create("alice").await.unwrap().room.id;
    f.registry.join(&room_id, "bob").await.unwrap();

    let mut seated = false;
    let again = f
        .registry
        .join_with(&room_id, " bob ", |_, name| seated = name == "bob")
        .await
        .unwrap();
    assert!(again.notice.is_none());
    assert!(seated);
    assert_eq!(again.room.members, vec!["alice", "bob"]);
    assert_eq!(f.registry.history(&room_id, None, None).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_take_one_seat() {
    let f = fixture();
    let room_id = f.registry.create("alice").await.unwrap().room.id;

    let attempts = (0..16).map(|i| {
        let registry = f.registry.clone();
        let room_id = room_id.clone();
        tokio::spawn(async move { registry.join(&room_id, &format!("guest{i}")).await })
    });
    let results = futures::future::join_all(attempts).await;

    let ok = results
        .iter()
        .filter(|r| r.as_ref().unwrap().is_ok())
        .count();
    let full = results
        .iter()
        .filter(|r| matches!(r.as_ref().unwrap(), Err(e) if e.kind == ErrorKind::RoomFull))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(full, 15);
    assert_eq!(f.registry.room(&room_id).await.unwrap().members.len(), 2);
}

#[tokio::test]
async fn test_messages_publish_in_append_order() {
    let f = fixture();
    let room_id = f.registry.create("alice").await.unwrap().room.id;
    f.registry.join(&room_id, "bob").await.unwrap();
    let alice = MemberContext::new(room_id.clone(), "alice");
    let bob = MemberContext::new(room_id.clone(), "bob");

    let hi = f.registry.post_message(&alice, "hi").await.unwrap();
    assert_eq!(hi.member.as_deref(), Some("alice"));
    assert_eq!(
        hi.payload,
        EventPayload::Chat {
            content: "hi".to_string()
        }
    );
    f.registry.post_message(&bob, "hello").await.unwrap();

    let history: Vec<i64> = f
        .registry
        .history(&room_id, None, None)
        .await
        .unwrap()
        .iter()
        .map(|e| e.seq)
        .collect();
    assert!(history.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(f.publisher.seqs(&room_id), history);
}

#[tokio::test]
async fn test_non_member_is_rejected() {
    let f = fixture();
    let room_id = f.registry.create("alice").await.unwrap().room.id;
    let mallory = MemberContext::new(room_id.clone(), "mallory");

    let err = f.registry.post_message(&mallory, "hi").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotAMember);

    let err = f
        .registry
        .attach_file(&mallory, "x.png", Bytes::from_static(b"png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotAMember);
    assert!(f.storage.is_empty());

    let err = f.registry.leave(&mallory).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotAMember);
}

#[tokio::test]
async fn test_invalid_input() {
    let f = fixture();
    assert_eq!(
        f.registry.create("   ").await.unwrap_err().kind,
        ErrorKind::InvalidInput
    );
    let room_id = f.registry.create("alice").await.unwrap().room.id;
    let alice = MemberContext::new(room_id, "alice");
    assert_eq!(
        f.registry.post_message(&alice, "  ").await.unwrap_err().kind,
        ErrorKind::InvalidInput
    );
    assert_eq!(
        f.registry
            .attach_file(&alice, "empty.txt", Bytes::new())
            .await
            .unwrap_err()
            .kind,
        ErrorKind::InvalidInput
    );
    assert_eq!(
        f.registry
            .attach_file(&alice, "big.bin", Bytes::from(vec![0u8; 2048]))
            .await
            .unwrap_err()
            .kind,
        ErrorKind::InvalidInput
    );
}

#[tokio::test]
async fn test_file_upload_and_owner_only_delete() {
    let f = fixture();
    let room_id = f.registry.create("alice").await.unwrap().room.id;
    f.registry.join(&room_id, "bob").await.unwrap();
    let alice = MemberContext::new(room_id.clone(), "alice");
    let bob = MemberContext::new(room_id.clone(), "bob");

    let shared = f
        .registry
        .attach_file(&bob, "x.png", Bytes::from_static(b"\x89PNG"))
        .await
        .unwrap();
    assert_eq!(shared.file.uploaded_by, "bob");
    assert_eq!(shared.file.filename, "x.png");
    assert_eq!(shared.file.size_bytes, 4);
    assert_eq!(shared.file.content_type.as_deref(), Some("image/png"));

    let listed = f.registry.files(&room_id).await.unwrap();
    assert_eq!(listed, vec![shared.file.clone()]);
    let (_, bytes) = f
        .registry
        .file_content(&room_id, shared.file.id)
        .await
        .unwrap();
    assert_eq!(bytes, &b"\x89PNG"[..]);

    let err = f
        .registry
        .delete_file(&alice, shared.file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let before = f.registry.history(&room_id, None, None).await.unwrap().len();
    let deleted = f.registry.delete_file(&bob, shared.file.id).await.unwrap();
    assert_eq!(deleted.member.as_deref(), Some("bob"));
    assert!(matches!(notice(&deleted), SystemNotice::FileDeleted { filename, .. } if filename == "x.png"));

    assert!(f.registry.files(&room_id).await.unwrap().is_empty());
    assert_eq!(
        f.registry.history(&room_id, None, None).await.unwrap().len(),
        before + 1
    );
    assert!(f.storage.is_empty());

    let err = f
        .registry
        .delete_file(&bob, shared.file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = f.registry.delete_file(&bob, FileId::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_leave_until_room_is_deleted() {
    let f = fixture();
    let room_id = f.registry.create("alice").await.unwrap().room.id;
    f.registry.join(&room_id, "bob").await.unwrap();
    let alice = MemberContext::new(room_id.clone(), "alice");
    let bob = MemberContext::new(room_id.clone(), "bob");
    f.registry
        .attach_file(&alice, "a.txt", Bytes::from_static(b"a"))
        .await
        .unwrap();

    let first = f.registry.leave(&alice).await.unwrap();
    assert_eq!(first.room.unwrap().members, vec!["bob"]);
    assert_eq!(
        notice(&first.notice),
        &SystemNotice::MemberLeft {
            member: "alice".to_string()
        }
    );
    assert_eq!(f.publisher.departed(&room_id), vec!["alice"]);

    // A rejected leave releases nothing.
    f.registry.leave(&alice).await.unwrap_err();
    assert_eq!(f.publisher.departed(&room_id), vec!["alice"]);

    let last = f.registry.leave(&bob).await.unwrap();
    assert_eq!(f.publisher.departed(&room_id), vec!["alice", "bob"]);
    assert!(last.room.is_none());
    assert!(f.storage.is_empty());

    let err = f.registry.join(&room_id, "carol").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::RoomNotFound);
    assert_eq!(f.registry.room_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reclaim_seat() {
    let f = fixture();
    let room_id = f.registry.create("alice").await.unwrap().room.id;
    f.registry.join(&room_id, "bob").await.unwrap();

    // The member came back before the lock was taken.
    let kept = f
        .registry
        .reclaim_seat(&room_id, "bob", || false)
        .await
        .unwrap();
    assert!(kept.is_none());

    let reclaimed = f
        .registry
        .reclaim_seat(&room_id, "bob", || true)
        .await
        .unwrap()
        .expect("seat released");
    assert!(reclaimed.member.is_none());
    assert_eq!(f.publisher.departed(&room_id), vec!["bob"]);
    assert_eq!(
        f.registry.room(&room_id).await.unwrap().members,
        vec!["alice"]
    );

    // Already gone: no second notice.
    assert!(f
        .registry
        .reclaim_seat(&room_id, "bob", || true)
        .await
        .unwrap()
        .is_none());

    // The freed seat can be taken again.
    f.registry.join(&room_id, "carol").await.unwrap();
}

#[tokio::test]
async fn test_history_pages_chain() {
    let f = fixture();
    let room_id = f.registry.create("alice").await.unwrap().room.id;
    let alice = MemberContext::new(room_id.clone(), "alice");
    for i in 0..6 {
        f.registry
            .post_message(&alice, &format!("m{i}"))
            .await
            .unwrap();
    }

    let mut since = None;
    let mut seen = Vec::new();
    loop {
        let page = f.registry.history(&room_id, since, Some(3)).await.unwrap();
        if page.is_empty() {
            break;
        }
        since = page.last().map(|e| e.seq);
        seen.extend(page.into_iter().map(|e| e.seq));
    }
    assert_eq!(seen.len(), 7);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_storage_failure_leaves_no_record() {
    #[derive(Debug)]
    struct BrokenStorage;

    #[async_trait::async_trait]
    impl ObjectStorage for BrokenStorage {
        fn provider_type(&self) -> &str {
            "broken"
        }
        async fn health_check(&self) -> duoroom_core::AppResult<bool> {
            Ok(false)
        }
        async fn store(&self, _: Bytes, _: &str) -> duoroom_core::AppResult<duoroom_core::traits::storage::StoredObject> {
            Err(duoroom_core::AppError::storage("disk full"))
        }
        async fn read(&self, _: &str) -> duoroom_core::AppResult<Bytes> {
            Err(duoroom_core::AppError::storage("disk full"))
        }
        async fn delete(&self, _: &str) -> duoroom_core::AppResult<()> {
            Ok(())
        }
    }

    let publisher = Arc::new(RecordingPublisher::default());
    let registry = RoomRegistry::new(
        &Stores::in_memory(),
        Arc::new(BrokenStorage),
        publisher.clone(),
        RoomsConfig::default(),
        1024,
    );
    let room_id = registry.create("alice").await.unwrap().room.id;
    let alice = MemberContext::new(room_id.clone(), "alice");

    let err = registry
        .attach_file(&alice, "x.png", Bytes::from_static(b"x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);
    assert!(registry.files(&room_id).await.unwrap().is_empty());
    assert_eq!(registry.history(&room_id, None, None).await.unwrap().len(), 1);
    assert_eq!(publisher.count(), 1);
}
