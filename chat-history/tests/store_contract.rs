use std::sync::Arc;

use chat_history::{ConversationStore, HistoryConfig, HistoryError, InMemoryConversationStore, Turn};

async fn exercise(store: Arc<dyn ConversationStore>) {
    for i in 0..3 {
        store
            .append_exchange("sess", &format!("q{i}"), &format!("a{i}"))
            .await
            .unwrap();
    }

    let h = store.history("sess").await.unwrap();
    assert_eq!(h.len(), 6);
    let expected: Vec<Turn> = (0..3)
        .flat_map(|i| [Turn::user(format!("q{i}")), Turn::assistant(format!("a{i}"))])
        .collect();
    assert_eq!(h, expected);

    store.clear("sess").await.unwrap();
    assert!(store.history("sess").await.unwrap().is_empty());
    assert!(matches!(store.clear("sess").await, Err(HistoryError::NotFound(_))));
}

#[tokio::test]
async fn in_memory_store_honours_contract() {
    exercise(Arc::new(InMemoryConversationStore::new())).await;
}

#[tokio::test]
async fn memory_backend_is_built_from_config() {
    let cfg = HistoryConfig::from_lookup(|k| (k == "HISTORY_BACKEND").then(|| "memory".to_string()))
        .unwrap();
    exercise(cfg.build().await.unwrap()).await;
}
