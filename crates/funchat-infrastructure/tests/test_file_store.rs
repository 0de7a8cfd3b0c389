use funchat_core::user::default_bots;
use funchat_core::{ChatRepository, Message, MessageClock, MessageStatus, User};
use funchat_infrastructure::collection_store::{CONVERSATIONS_KEY, MESSAGES_KEY, USERS_KEY};
use funchat_infrastructure::{CollectionStore, FileBackend, IdentityPointer, StorageBackend};
use std::sync::Arc;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> CollectionStore {
    let backend = FileBackend::new(dir.path()).expect("backend should open");
    CollectionStore::open(Arc::new(backend), &default_bots()).expect("store should open")
}

#[test]
fn test_fresh_directory_is_seeded() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let ids: Vec<String> = store.get_users().into_iter().map(|u| u.id).collect();
    assert_eq!(ids, vec!["bot-1", "bot-2", "bot-3"]);

    for key in [USERS_KEY, CONVERSATIONS_KEY, MESSAGES_KEY] {
        assert!(
            temp_dir.path().join(format!("{key}.json")).exists(),
            "{key} should be created"
        );
    }
}

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let clock = MessageClock::new();

    let conversation_id = {
        let store = open_store(&temp_dir);
        store.add_user(User::new("u1", "Alice")).unwrap();
        let conversation = store
            .create_conversation(&["u1".to_string(), "bot-1".to_string()])
            .unwrap();
        let message = Message::new(&conversation.id, "u1", "hello", MessageStatus::Sent, &clock);
        store.add_message(&message).unwrap();
        conversation.id
    };

    let store = open_store(&temp_dir);
    assert_eq!(store.get_user_by_id("u1").map(|u| u.name), Some("Alice".to_string()));

    let conversations = store.get_conversations_for_user("u1");
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].id, conversation_id);
    assert_eq!(
        conversations[0].last_message.as_ref().map(|m| m.text.as_str()),
        Some("hello")
    );
    assert_eq!(store.get_messages(&conversation_id).len(), 1);
}

#[test]
fn test_persisted_layout_uses_original_field_names() {
    let temp_dir = TempDir::new().unwrap();
    let clock = MessageClock::new();
    let store = open_store(&temp_dir);

    let conversation = store
        .create_conversation(&["u1".to_string(), "bot-2".to_string()])
        .unwrap();
    let message = Message::new(&conversation.id, "bot-2", "hi", MessageStatus::Delivered, &clock);
    store.add_message(&message).unwrap();

    let raw = std::fs::read_to_string(temp_dir.path().join("chat_app_conversations.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["participantIds"][1], "bot-2");
    assert_eq!(json[0]["lastMessage"]["senderId"], "bot-2");
    assert_eq!(json[0]["lastMessage"]["status"], "delivered");
}

#[test]
fn test_corrupted_file_fails_open() {
    let temp_dir = TempDir::new().unwrap();
    open_store(&temp_dir);
    std::fs::write(temp_dir.path().join("chat_app_messages.json"), "[{\"id\":").unwrap();

    let store = open_store(&temp_dir);
    assert!(store.get_messages("anything").is_empty());

    let clock = MessageClock::new();
    let message = Message::new("conv-x", "u1", "fresh start", MessageStatus::Sent, &clock);
    store.add_message(&message).unwrap();
    assert_eq!(store.get_messages("conv-x"), vec![message]);
}

#[test]
fn test_identity_pointer_shares_backend() {
    let temp_dir = TempDir::new().unwrap();
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::new(temp_dir.path()).unwrap());

    IdentityPointer::new(backend.clone()).set("u1").unwrap();

    let reopened: Arc<dyn StorageBackend> = Arc::new(FileBackend::new(temp_dir.path()).unwrap());
    assert_eq!(IdentityPointer::new(reopened).get().as_deref(), Some("u1"));
    assert!(backend.read("chat_app_current_user_id").unwrap().is_some());
}

#[test]
fn test_unreadable_file_does_not_block_open() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("chat_app_users.json"), [0xff, 0xfe, 0x00]).unwrap();

    let store = open_store(&temp_dir);
    assert!(store.get_users().is_empty());
    assert!(store.get_conversations_for_user("u1").is_empty());

    assert!(store.add_user(User::new("u1", "Alice")).unwrap());
    let reopened = open_store(&temp_dir);
    assert_eq!(reopened.get_user_by_id("u1").map(|u| u.name), Some("Alice".to_string()));
}
