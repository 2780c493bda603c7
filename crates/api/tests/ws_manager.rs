//! Tests for `WsManager` topic routing, without HTTP upgrades.

use axum::extract::ws::Message;
use viewpress_api::ws::WsManager;
use viewpress_core::job_events::TOPIC_WORKITEM;

#[tokio::test]
async fn add_and_remove_track_the_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn new_connections_receive_workitem_notifications() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    let delivered = manager
        .publish(TOPIC_WORKITEM, Message::Text("hello".into()))
        .await;

    assert_eq!(delivered, 2);
    assert_eq!(rx1.recv().await.unwrap(), Message::Text("hello".into()));
    assert_eq!(rx2.recv().await.unwrap(), Message::Text("hello".into()));
}

#[tokio::test]
async fn unsubscribed_connection_is_skipped() {
    let manager = WsManager::new();
    let mut quiet = manager.add("quiet".to_string()).await;
    let mut loud = manager.add("loud".to_string()).await;
    assert!(manager.unsubscribe("quiet", TOPIC_WORKITEM).await);

    let delivered = manager
        .publish(TOPIC_WORKITEM, Message::Text("update".into()))
        .await;

    assert_eq!(delivered, 1);
    assert!(loud.recv().await.is_some());
    assert!(quiet.try_recv().is_err());

    assert!(manager.subscribe("quiet", TOPIC_WORKITEM).await);
    manager
        .publish(TOPIC_WORKITEM, Message::Text("again".into()))
        .await;
    assert_eq!(quiet.recv().await.unwrap(), Message::Text("again".into()));
}

#[tokio::test]
async fn subscription_changes_on_unknown_connection_report_false() {
    let manager = WsManager::new();

    assert!(!manager.subscribe("ghost", TOPIC_WORKITEM).await);
    assert!(!manager.unsubscribe("ghost", TOPIC_WORKITEM).await);
    assert!(!manager.send_to("ghost", Message::Text("x".into())).await);
}

#[tokio::test]
async fn publish_skips_closed_receivers() {
    let manager = WsManager::new();
    let rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;
    drop(rx1);

    let delivered = manager
        .publish(TOPIC_WORKITEM, Message::Text("still here".into()))
        .await;

    assert_eq!(delivered, 1);
    assert!(rx2.recv().await.is_some());
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx.recv().await, Some(Message::Close(None))));
}

#[tokio::test]
async fn ping_all_sends_ping_frames() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    assert!(matches!(rx.recv().await, Some(Message::Ping(_))));
}
