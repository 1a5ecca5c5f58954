//! Sync engine integration tests
//!
//! Exercises the manifest/changes cycle against a mock catalog server:
//! the no-op fast path, delta hydration and checkpoint atomicity when a
//! hydration fetch fails mid-batch.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{card_json, mount_card, mount_changes, mount_manifest, Harness};
use soylem_sync::client::storage::{keys, KeyValueStore};

const T0: &str = "2024-01-01T00:00:00Z";

async fn seed_checkpoint(harness: &Harness, version: u64, last_sync: &str) {
    harness
        .store
        .set(keys::MANIFEST_VERSION, &version.to_string())
        .await
        .unwrap();
    harness.store.set(keys::LAST_SYNC, last_sync).await.unwrap();
}

#[tokio::test]
async fn noop_sync_issues_no_hydration_requests() {
    let harness = Harness::start().await;
    mount_manifest(&harness.server, 5).await;
    seed_checkpoint(&harness, 5, T0).await;
    harness
        .store
        .set("card:a", &card_json("a", "Мысық", 5).to_string())
        .await
        .unwrap();

    let engine = harness.engine();
    let first = engine.sync().await.unwrap();
    let second = engine.sync().await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, "a");
    assert_eq!(first, second);

    // Only the two manifest probes went out: no change-list fetch, no
    // per-card fetch, no preload.
    let requests = harness.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.url.path(), "/api/global/cards/manifest");
    }
}

#[tokio::test]
async fn delta_hydration_applies_adds_updates_and_deletes() {
    let harness = Harness::start().await;
    seed_checkpoint(&harness, 1, T0).await;
    // Card "c" is locally present and about to be deleted upstream
    harness
        .store
        .set("card:c", &card_json("c", "Ит", 1).to_string())
        .await
        .unwrap();

    mount_manifest(&harness.server, 2).await;
    mount_changes(
        &harness.server,
        T0,
        json!([
            {"id": "a", "action": "add", "updatedAt": "2024-05-02T00:00:00Z"},
            {"id": "b", "action": "update", "updatedAt": "2024-05-02T00:00:00Z"},
            {"id": "c", "action": "delete", "updatedAt": "2024-05-02T00:00:00Z"}
        ]),
    )
    .await;
    mount_card(&harness.server, "a", card_json("a", "Мысық", 2)).await;
    mount_card(&harness.server, "b", card_json("b", "Қоян", 2)).await;

    let engine = harness.engine();
    let cards = engine.sync().await.unwrap();

    let mut ids: Vec<&str> = cards.iter().map(|card| card.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);

    // Deleted record is gone from storage, freshly fetched ones persisted
    assert!(harness.store.get("card:c").await.unwrap().is_none());
    assert!(harness.store.get("card:a").await.unwrap().is_some());

    let checkpoint = engine.checkpoint().await.unwrap();
    assert_eq!(checkpoint.version, 2);
    assert_ne!(checkpoint.last_sync.as_deref(), Some(T0));
}

#[tokio::test]
async fn failed_card_fetch_leaves_checkpoint_untouched() {
    let harness = Harness::start().await;
    seed_checkpoint(&harness, 1, T0).await;

    mount_manifest(&harness.server, 2).await;
    mount_changes(
        &harness.server,
        T0,
        json!([
            {"id": "a", "action": "add", "updatedAt": "2024-05-02T00:00:00Z"},
            {"id": "b", "action": "update", "updatedAt": "2024-05-02T00:00:00Z"}
        ]),
    )
    .await;
    mount_card(&harness.server, "a", card_json("a", "Мысық", 2)).await;
    Mock::given(method("GET"))
        .and(path("/api/global/cards/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.server)
        .await;

    let engine = harness.engine();
    let error = engine.sync().await.unwrap_err();
    assert!(error.to_string().contains("card fetch"));

    // The whole cycle aborted before the checkpoint commit
    let checkpoint = engine.checkpoint().await.unwrap();
    assert_eq!(checkpoint.version, 1);
    assert_eq!(checkpoint.last_sync.as_deref(), Some(T0));

    // Next attempt retries the identical window and succeeds
    harness.server.reset().await;
    mount_manifest(&harness.server, 2).await;
    mount_changes(
        &harness.server,
        T0,
        json!([
            {"id": "a", "action": "add", "updatedAt": "2024-05-02T00:00:00Z"},
            {"id": "b", "action": "update", "updatedAt": "2024-05-02T00:00:00Z"}
        ]),
    )
    .await;
    mount_card(&harness.server, "a", card_json("a", "Мысық", 2)).await;
    mount_card(&harness.server, "b", card_json("b", "Қоян", 2)).await;

    let cards = engine.sync().await.unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(engine.checkpoint().await.unwrap().version, 2);
}

#[tokio::test]
async fn first_sync_requests_full_history() {
    let harness = Harness::start().await;

    mount_manifest(&harness.server, 1).await;
    // No `since` query on a never-synced device
    mount_changes(
        &harness.server,
        "",
        json!([
            {"id": "a", "action": "add", "updatedAt": "2024-05-02T00:00:00Z"}
        ]),
    )
    .await;
    mount_card(&harness.server, "a", card_json("a", "Мысық", 1)).await;

    let engine = harness.engine();
    let cards = engine.sync().await.unwrap();
    assert_eq!(cards.len(), 1);

    let changes_requests: Vec<_> = harness
        .server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.url.path() == "/api/global/cards/changes")
        .collect();
    assert_eq!(changes_requests.len(), 1);
    assert!(changes_requests[0].url.query().is_none());
}

#[tokio::test]
async fn snapshot_derives_thumbnails_by_convention() {
    let harness = Harness::start().await;
    mount_manifest(&harness.server, 3).await;
    seed_checkpoint(&harness, 3, T0).await;
    harness
        .store
        .set("card:a", &card_json("a", "Мысық", 3).to_string())
        .await
        .unwrap();

    let cards = harness.engine().sync().await.unwrap();
    assert_eq!(
        cards[0].thumbnail_uri.as_deref(),
        Some("/uploads/thumb_a.jpg")
    );
}
