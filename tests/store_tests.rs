use tldr_chat::core::models::StoredMessage;
use tldr_chat::storage::MessageStore;

const DAY: i64 = 86_400;

async fn seeded(chat_id: &str, count: i64) -> MessageStore {
    let store = MessageStore::in_memory().await.unwrap();
    for id in 1..=count {
        assert!(store.save(chat_id, id, "U1", 1_000 + id, &format!("m{id}")).await);
    }
    store
}

#[tokio::test]
async fn test_duplicate_key_keeps_first_text() {
    let store = MessageStore::in_memory().await.unwrap();
    assert!(store.save("C1", 1, "U1", 100, "first").await);
    assert!(!store.save("C1", 1, "U1", 200, "second").await);

    assert_eq!(store.fetch_last("C1", 10).await, vec!["first"]);
    assert_eq!(store.count("C1").await, 1);
}

#[tokio::test]
async fn test_fetch_last_returns_newest_first() {
    let store = seeded("C1", 5).await;
    assert_eq!(store.fetch_last("C1", 3).await, vec!["m5", "m4", "m3"]);
    assert_eq!(store.fetch_last("C1", 100).await.len(), 5);
}

#[tokio::test]
async fn test_fetch_orders_by_message_id_not_insertion() {
    let store = MessageStore::in_memory().await.unwrap();
    store.save("C1", 30, "U1", 100, "thirty").await;
    store.save("C1", 10, "U1", 100, "ten").await;
    store.save("C1", 20, "U1", 100, "twenty").await;

    assert_eq!(
        store.fetch_last("C1", 3).await,
        vec!["thirty", "twenty", "ten"]
    );
}

#[tokio::test]
async fn test_chats_are_isolated() {
    let store = seeded("C1", 3).await;
    store.save("C2", 1, "U9", 100, "other chat").await;

    assert_eq!(store.count("C1").await, 3);
    assert_eq!(store.count("C2").await, 1);
    assert_eq!(store.fetch_last("C2", 10).await, vec!["other chat"]);
    assert!(store.fetch_last("C3", 10).await.is_empty());
}

#[tokio::test]
async fn test_delete_older_than_spans_chats() {
    let store = MessageStore::in_memory().await.unwrap();
    store.save("C1", 1, "U1", 100, "old one").await;
    store.save("C2", 1, "U2", 150, "old two").await;
    store.save("C1", 2, "U1", 300, "fresh").await;

    assert_eq!(store.delete_older_than(200).await, 2);
    assert_eq!(store.count("C1").await, 1);
    assert_eq!(store.count("C2").await, 0);
}

#[tokio::test]
async fn test_cleanup_expired_uses_retention_days() {
    let now = 1_700_000_000;
    let store = MessageStore::in_memory().await.unwrap();
    store.save("C1", 1, "U1", now - 3 * DAY, "three days old").await;
    store.save("C1", 2, "U1", now - 60, "a minute old").await;

    assert_eq!(store.cleanup_expired(0, now).await, 0);
    assert_eq!(store.count("C1").await, 2);

    assert_eq!(store.cleanup_expired(2, now).await, 1);
    assert_eq!(store.fetch_last("C1", 10).await, vec!["a minute old"]);
}

#[tokio::test]
async fn test_clear_chat_only_touches_one_chat() {
    let store = seeded("C1", 4).await;
    store.save("C2", 1, "U2", 100, "keep me").await;

    assert_eq!(store.clear_chat("C1").await, 4);
    assert_eq!(store.count("C1").await, 0);
    assert_eq!(store.count("C2").await, 1);
}

#[tokio::test]
async fn test_save_message_record() {
    let store = MessageStore::in_memory().await.unwrap();
    let message = StoredMessage {
        chat_id: "C1".to_string(),
        message_id: 9,
        from_id: "U1".to_string(),
        timestamp: 100,
        text: "from a record".to_string(),
    };
    assert!(store.save_message(&message).await);
    assert!(!store.save_message(&message).await);
    assert_eq!(store.count("C1").await, 1);
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("messages.db").display());

    let store = MessageStore::open(&url).await.unwrap();
    store.save("C1", 1, "U1", 100, "persisted").await;
    store.close().await;

    let reopened = MessageStore::open(&url).await.unwrap();
    assert_eq!(reopened.fetch_last("C1", 5).await, vec!["persisted"]);
    reopened.close().await;
}

#[tokio::test]
async fn test_closed_store_degrades_quietly() {
    let store = seeded("C1", 2).await;
    store.close().await;

    assert!(store.ping().await.is_err());
    assert!(!store.save("C1", 3, "U1", 100, "late").await);
    assert!(store.fetch_last("C1", 5).await.is_empty());
    assert_eq!(store.count("C1").await, 0);
}
