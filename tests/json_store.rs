use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use engagement_sim::store::{
    ApplyOutcome, ContentStore, EngagementUpdate, JsonStore, StoreSnapshot,
};
use engagement_sim::{ContentFamily, ContentItem, SimulationSettings, StoreError};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

fn item(id: &str, hours_ago: i64) -> ContentItem {
    ContentItem::new(id, now() - Duration::hours(hours_ago))
}

fn update(likes: u64, dislikes: u64, at: DateTime<Utc>) -> EngagementUpdate {
    EngagementUpdate {
        likes,
        dislikes,
        now: at,
        lifetime_hours: 73.5,
    }
}

fn store_with(articles: Vec<ContentItem>, images: Vec<ContentItem>) -> JsonStore {
    JsonStore::in_memory(StoreSnapshot {
        settings: Some(SimulationSettings::default()),
        articles,
        images,
    })
}

#[tokio::test]
async fn increments_and_sets_start_once() {
    let store = store_with(vec![item("a-1", 10)], Vec::new());

    let first = store
        .apply_engagement(ContentFamily::Article, "a-1", update(5, 1, now()))
        .await
        .unwrap();
    assert_eq!(first, ApplyOutcome::Applied { completed: false });

    let later = now() + Duration::hours(6);
    store
        .apply_engagement(ContentFamily::Article, "a-1", update(3, 2, later))
        .await
        .unwrap();

    let (_, stored) = store.find_item("a-1").await.unwrap().unwrap();
    assert_eq!((stored.likes, stored.dislikes), (8, 3));
    assert_eq!(stored.simulation_started_at, Some(now()));
}

#[tokio::test]
async fn empty_update_does_not_start_the_simulation() {
    let store = store_with(vec![item("a-1", 10)], Vec::new());
    store
        .apply_engagement(ContentFamily::Article, "a-1", update(0, 0, now()))
        .await
        .unwrap();

    let (_, stored) = store.find_item("a-1").await.unwrap().unwrap();
    assert!(stored.simulation_started_at.is_none());
    assert!(!stored.simulation_completed);
}

#[tokio::test]
async fn completion_is_terminal() {
    let store = store_with(vec![item("a-1", 100)], Vec::new());

    let outcome = store
        .apply_engagement(ContentFamily::Article, "a-1", update(1, 0, now()))
        .await
        .unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied { completed: true });

    let again = store
        .apply_engagement(ContentFamily::Article, "a-1", update(9, 9, now()))
        .await
        .unwrap();
    assert_eq!(again, ApplyOutcome::AlreadyCompleted);

    let (_, stored) = store.find_item("a-1").await.unwrap().unwrap();
    assert_eq!((stored.likes, stored.dislikes), (1, 0));
    assert!(stored.simulation_completed);
}

#[tokio::test]
async fn unknown_item_is_not_found() {
    let store = store_with(Vec::new(), Vec::new());
    let err = store
        .apply_engagement(ContentFamily::Image, "nope", update(1, 0, now()))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let store = Arc::new(store_with(vec![item("a-1", 10)], Vec::new()));

    let mut handles = Vec::new();
    for _ in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .apply_engagement(ContentFamily::Article, "a-1", update(2, 1, now()))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let (_, stored) = store.find_item("a-1").await.unwrap().unwrap();
    assert_eq!((stored.likes, stored.dislikes), (100, 50));
}

#[tokio::test]
async fn recent_items_filters_and_orders() {
    let mut done = item("done", 2);
    done.simulation_completed = true;
    let store = store_with(
        vec![item("old", 24 * 9), item("mid", 20), item("new", 1), done, item("newest", 0)],
        Vec::new(),
    );

    let since = now() - Duration::days(7);
    let recent = store
        .recent_items(ContentFamily::Article, since, 10)
        .await
        .unwrap();
    let ids: Vec<&str> = recent.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["newest", "new", "mid"]);

    let capped = store
        .recent_items(ContentFamily::Article, since, 2)
        .await
        .unwrap();
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn find_item_searches_both_families() {
    let store = store_with(vec![item("a-1", 1)], vec![item("img-1", 1)]);
    let (family, _) = store.find_item("img-1").await.unwrap().unwrap();
    assert_eq!(family, ContentFamily::Image);
    assert!(store.find_item("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn last_run_requires_settings() {
    let store = JsonStore::in_memory(StoreSnapshot::default());
    let err = store.record_last_run(now()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn file_store_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("engagement.json");

    let store = JsonStore::load(path.clone()).await.unwrap();
    store.put_settings(SimulationSettings::default()).await.unwrap();
    store
        .upsert_item(ContentFamily::Article, item("a-1", 10))
        .await
        .unwrap();
    store
        .apply_engagement(ContentFamily::Article, "a-1", update(4, 1, now()))
        .await
        .unwrap();
    store.record_last_run(now()).await.unwrap();

    let reloaded = JsonStore::load(path.clone()).await.unwrap();
    let settings = reloaded.settings().await.unwrap().unwrap();
    assert_eq!(settings.last_run_at, Some(now()));
    let (_, stored) = reloaded.find_item("a-1").await.unwrap().unwrap();
    assert_eq!((stored.likes, stored.dislikes), (4, 1));
    assert_eq!(stored.simulation_started_at, Some(now()));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"publishedAt\""));
    assert!(raw.contains("\"simulationStartedAt\""));
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn images_accept_created_at_field() {
    let raw = r#"{
        "settings": null,
        "articles": [],
        "images": [
            { "id": "img-1", "createdAt": "2026-10-15T12:00:00Z", "title": "Cartoon", "likes": 3 }
        ]
    }"#;
    let snapshot: StoreSnapshot = serde_json::from_str(raw).unwrap();
    let store = JsonStore::in_memory(snapshot);

    let (family, image) = store.find_item("img-1").await.unwrap().unwrap();
    assert_eq!(family, ContentFamily::Image);
    assert_eq!(image.likes, 3);
    assert!((image.hours_since_anchor(now()) - 24.0).abs() < 1e-9);
}

#[tokio::test]
async fn images_are_written_back_with_created_at() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engagement.json");

    let store = JsonStore::load(path.clone()).await.unwrap();
    store
        .upsert_item(ContentFamily::Article, item("a-1", 10))
        .await
        .unwrap();
    store
        .upsert_item(ContentFamily::Image, item("img-1", 5))
        .await
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let article = &raw["articles"][0];
    let image = &raw["images"][0];
    assert!(article.get("publishedAt").is_some());
    assert!(image.get("createdAt").is_some());
    assert!(image.get("publishedAt").is_none());

    let reloaded = JsonStore::load(path).await.unwrap();
    let (family, stored) = reloaded.find_item("img-1").await.unwrap().unwrap();
    assert_eq!(family, ContentFamily::Image);
    assert_eq!(stored.anchor_at, now() - Duration::hours(5));
}
