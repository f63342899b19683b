//! Runs against a live server: `MONGODB_URI=... cargo test --features mongodb -- --ignored`
#![cfg(feature = "mongodb")]

use threadline_persist::{Message, MongoPersistenceClient, NewThread, PersistError, PersistenceClient};

async fn client() -> MongoPersistenceClient {
    let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    MongoPersistenceClient::connect(&uri, "threadline_test").await.unwrap()
}

#[tokio::test]
#[ignore]
async fn test_delete_removes_messages_with_thread() {
    let client = client().await;
    let thread = client.create_thread(NewThread::default()).await.unwrap();
    let message = Message::user(&thread.id, "question");
    let message_id = message.id.clone();
    client.save_message(message).await.unwrap();

    client.delete_thread(&thread.id).await.unwrap();

    assert!(client.get_thread(&thread.id).await.unwrap().is_none());
    let err = client.get_message(&message_id).await.unwrap_err();
    assert!(matches!(err, PersistError::MessageNotFound(_)));

    let again = client.delete_thread(&thread.id).await;
    assert!(matches!(again, Err(PersistError::ThreadNotFound(_))));
}
