use adcampaign_core::StageEvent;
use adcampaign_session::*;
use serde_json::json;
use std::collections::HashMap;

fn create_req(session_id: Option<&str>) -> CreateRequest {
    CreateRequest {
        app_name: "adcampaign".to_string(),
        user_id: "user1".to_string(),
        session_id: session_id.map(str::to_string),
        state: HashMap::new(),
    }
}

#[tokio::test]
async fn test_create_session() {
    let service = InMemorySessionService::new();

    let session = service.create(create_req(Some("session1"))).await.unwrap();
    assert_eq!(session.id(), "session1");
    assert_eq!(session.app_name(), "adcampaign");
    assert_eq!(session.user_id(), "user1");
    assert!(session.events().is_empty());
}

#[tokio::test]
async fn test_create_generates_unique_ids() {
    let service = InMemorySessionService::new();

    let a = service.create(create_req(None)).await.unwrap();
    let b = service.create(create_req(None)).await.unwrap();
    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn test_duplicate_session_id_rejected() {
    let service = InMemorySessionService::new();

    service.create(create_req(Some("dup"))).await.unwrap();
    assert!(service.create(create_req(Some("dup"))).await.is_err());
}

#[tokio::test]
async fn test_state_is_isolated_per_run() {
    let service = InMemorySessionService::new();

    let first = service.create(create_req(None)).await.unwrap();
    first.store().set("product_info", json!({"name": "EcoBottle"}));

    let second = service.create(create_req(None)).await.unwrap();
    assert!(second.store().get("product_info").is_none());
    assert!(first.store().get("product_info").is_some());
}

#[tokio::test]
async fn test_initial_state_is_seeded() {
    let service = InMemorySessionService::new();

    let mut req = create_req(Some("seeded"));
    req.state.insert("product_info".to_string(), json!({"name": "Seed"}));
    let session = service.create(req).await.unwrap();
    assert_eq!(session.store().get("product_info").unwrap()["name"], "Seed");
}

#[tokio::test]
async fn test_find_shares_live_store() {
    let service = InMemorySessionService::new();

    let created = service.create(create_req(Some("live"))).await.unwrap();
    created.store().set("ads", json!({}));

    let fetched = service.find("live").await.unwrap();
    assert!(fetched.store().contains("ads"));
    assert!(service.find("missing").await.is_err());
}

#[tokio::test]
async fn test_append_event_and_find() {
    let service = InMemorySessionService::new();

    let session = service.create(create_req(Some("events"))).await.unwrap();
    let run = session.run().clone();
    service
        .append_event(&run, StageEvent::new("inv-1", "product_info_agent", "one"))
        .await
        .unwrap();
    service
        .append_event(&run, StageEvent::new("inv-1", "social_metrics_agent", "two"))
        .await
        .unwrap();

    let found = service.find("events").await.unwrap();
    let events = found.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].text(), "one");
    assert_eq!(events[1].author(), "social_metrics_agent");
    assert!(found.last_update_time() >= run.created_at);
}

#[tokio::test]
async fn test_retention_evicts_least_recently_updated() {
    let service = InMemorySessionService::new().with_max_sessions(2);

    let first = service.create(create_req(Some("s1"))).await.unwrap().run().clone();
    service.create(create_req(Some("s2"))).await.unwrap();
    service
        .append_event(&first, StageEvent::new("inv-1", "product_info_agent", "still active"))
        .await
        .unwrap();

    service.create(create_req(Some("s3"))).await.unwrap();
    assert_eq!(service.retained(), 2);
    assert!(service.find("s1").await.is_ok());
    assert!(service.find("s2").await.is_err());
    assert!(service.find("s3").await.is_ok());
}

#[tokio::test]
async fn test_retention_is_bounded_over_many_runs() {
    let service = InMemorySessionService::new().with_max_sessions(10);

    for _ in 0..1000 {
        let session = service.create(create_req(None)).await.unwrap();
        service
            .append_event(session.run(), StageEvent::new("inv", "ad_content_generator", "done"))
            .await
            .unwrap();
    }
    assert_eq!(service.retained(), 10);
}

#[tokio::test]
async fn test_sessions_in_use_are_not_evicted() {
    let service = InMemorySessionService::new().with_max_sessions(1);

    let running = service.create(create_req(Some("running"))).await.unwrap();
    let other = service.create(create_req(Some("other"))).await.unwrap();

    assert_eq!(service.retained(), 2);
    service
        .append_event(running.run(), StageEvent::new("inv", "product_info_agent", "ok"))
        .await
        .unwrap();

    drop(running);
    drop(other);
    service.create(create_req(Some("next"))).await.unwrap();
    assert_eq!(service.retained(), 1);
    assert!(service.find("next").await.is_ok());
}

#[tokio::test]
async fn test_default_limit() {
    let service = InMemorySessionService::default();
    for _ in 0..DEFAULT_MAX_SESSIONS + 5 {
        service.create(create_req(None)).await.unwrap();
    }
    assert_eq!(service.retained(), DEFAULT_MAX_SESSIONS);
}
