use std::time::Duration;

use threadline_persist::{
    InMemoryPersistenceClient, Message, NewThread, PersistError, PersistenceClient, ThreadQuery,
    ThreadUpdate, DEFAULT_THREAD_TITLE,
};

fn titled(title: &str) -> NewThread {
    NewThread {
        title: Some(title.to_string()),
        summary: None,
    }
}

#[tokio::test]
async fn test_create_and_get_thread() {
    let client = InMemoryPersistenceClient::new();
    let created = client.create_thread(titled("Test Thread")).await.unwrap();

    let fetched = client.get_thread(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Test Thread");
    assert!(fetched.updated_at >= fetched.created_at);

    let untitled = client.create_thread(NewThread::default()).await.unwrap();
    assert_eq!(untitled.title, DEFAULT_THREAD_TITLE);
}

#[tokio::test]
async fn test_missing_thread_is_none() {
    let client = InMemoryPersistenceClient::new();
    assert!(client.get_thread("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_messages_keep_insertion_order() {
    let client = InMemoryPersistenceClient::new();
    let thread = client.create_thread(NewThread::default()).await.unwrap();

    for i in 0..5 {
        client
            .save_message(Message::user(&thread.id, format!("m{}", i)))
            .await
            .unwrap();
    }

    let contents: Vec<String> = client
        .get_messages(&thread.id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4"]);
    assert_eq!(client.count_messages(&thread.id).await.unwrap(), 5);
}

#[tokio::test]
async fn test_save_message_bumps_updated_at() {
    let client = InMemoryPersistenceClient::new();
    let thread = client.create_thread(NewThread::default()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    client
        .save_message(Message::user(&thread.id, "hello"))
        .await
        .unwrap();

    let fetched = client.get_thread(&thread.id).await.unwrap().unwrap();
    assert!(fetched.updated_at > thread.updated_at);
}

#[tokio::test]
async fn test_save_message_to_missing_thread_fails() {
    let client = InMemoryPersistenceClient::new();
    let result = client.save_message(Message::user("ghost", "hello")).await;
    assert!(matches!(result, Err(PersistError::ThreadNotFound(_))));
}

#[tokio::test]
async fn test_update_thread_fields() {
    let client = InMemoryPersistenceClient::new();
    let thread = client.create_thread(titled("Before")).await.unwrap();

    let updated = client
        .update_thread(&thread.id, ThreadUpdate::summary("- point"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Before");
    assert_eq!(updated.summary.as_deref(), Some("- point"));
    assert!(updated.updated_at >= thread.updated_at);

    let missing = client.update_thread("nope", ThreadUpdate::title("x")).await;
    assert!(matches!(missing, Err(PersistError::ThreadNotFound(_))));
}

#[tokio::test]
async fn test_delete_cascades_to_messages() {
    let client = InMemoryPersistenceClient::new();
    let thread = client.create_thread(NewThread::default()).await.unwrap();
    let first = Message::user(&thread.id, "question");
    let second = Message::assistant(&thread.id, "answer");
    let ids = [first.id.clone(), second.id.clone()];
    client.save_message(first).await.unwrap();
    client.save_message(second).await.unwrap();
    assert!(client.get_message(&ids[0]).await.is_ok());

    client.delete_thread(&thread.id).await.unwrap();

    assert!(client.get_thread(&thread.id).await.unwrap().is_none());
    for id in &ids {
        let err = client.get_message(id).await.unwrap_err();
        assert!(matches!(err, PersistError::MessageNotFound(_)));
        assert!(err.is_not_found());
    }
    assert_eq!(client.count_messages(&thread.id).await.unwrap(), 0);

    let again = client.delete_thread(&thread.id).await;
    assert!(matches!(again, Err(PersistError::ThreadNotFound(_))));
}

#[tokio::test]
async fn test_list_filters_and_orders_by_recent_update() {
    let client = InMemoryPersistenceClient::new();
    let apple_banana = client.create_thread(titled("Apple Banana")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    client.create_thread(titled("Apple Cherry")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    client.create_thread(titled("Orange Banana")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    client
        .save_message(Message::user(&apple_banana.id, "bump"))
        .await
        .unwrap();

    let all = client.list_threads(ThreadQuery::new()).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple Banana", "Orange Banana", "Apple Cherry"]);

    let apples = client
        .list_threads(ThreadQuery::new().title_contains("aPPle"))
        .await
        .unwrap();
    assert_eq!(apples.len(), 2);

    let paged = client
        .list_threads(ThreadQuery::new().skip(1).limit(1))
        .await
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].title, "Orange Banana");
}
