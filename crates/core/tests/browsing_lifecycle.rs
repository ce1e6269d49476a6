//! Browsing lifecycle integration tests.
//!
//! These tests drive the controllers together against the mock catalog and
//! a SQLite-backed collection:
//! - browse, filter and sort a paged list
//! - debounced search feeding the list
//! - detail sessions sharing collection membership
//! - collection contents surviving a reopen

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio_test::assert_ok;

use gamedex_core::{
    testing::{fixtures, MockCatalogClient},
    CollectionStore, DetailController, ListController, LoadPhase, SearchController,
    SortOption, SqliteStorage,
};

const KEY: &str = "game_collection";

struct TestHarness {
    client: Arc<MockCatalogClient>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            client: Arc::new(MockCatalogClient::new()),
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn open_store(&self) -> CollectionStore {
        let storage = SqliteStorage::new(&self.temp_dir.path().join("gamedex.db"))
            .expect("Failed to open storage");
        CollectionStore::open(Arc::new(storage), KEY)
    }

    fn list(&self) -> ListController {
        ListController::new(self.client.clone())
    }
}

#[tokio::test]
async fn test_browse_filter_and_sort() {
    let harness = TestHarness::new();
    harness
        .client
        .set_pages(
            None,
            None,
            vec![
                vec![
                    fixtures::rated_item(1, "Portal", 4.5, Some("2007-10-09")),
                    fixtures::rated_item(2, "braid", 4.0, Some("2008-08-06")),
                ],
                vec![fixtures::rated_item(3, "Celeste", 4.4, Some("2018-01-25"))],
            ],
        )
        .await;
    harness
        .client
        .set_pages(
            None,
            Some("indie,puzzle"),
            vec![vec![fixtures::rated_item(2, "braid", 4.0, Some("2008-08-06"))]],
        )
        .await;

    let list = harness.list();
    list.ensure_loaded().await;
    list.load_next().await;
    list.load_next().await;

    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.items.len(), 3);
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.query.page, 3);

    list.set_sort(SortOption::NameAsc).await;
    let names: Vec<String> = list.items().await.into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["braid", "Celeste", "Portal"]);

    list.set_sort(SortOption::Newest).await;
    let ids: Vec<u64> = list.items().await.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let genres: BTreeSet<String> = ["puzzle", "indie"].iter().map(|g| g.to_string()).collect();
    list.set_genre_filter(genres).await;
    let snapshot = list.snapshot().await;
    assert_eq!(snapshot.phase, LoadPhase::Loaded);
    assert_eq!(snapshot.items.len(), 1);

    let last = harness.client.search_requests().await.pop().unwrap();
    assert_eq!(last.genres.as_deref(), Some("indie,puzzle"));
    assert_eq!(last.page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_search_box_feeds_list() {
    let harness = TestHarness::new();
    harness
        .client
        .set_pages(Some("zelda"), None, vec![fixtures::page(100, 5)])
        .await;

    let list = harness.list();
    let mut updates = list.subscribe();
    let search = SearchController::with_settings(list.clone(), Duration::from_millis(300), 2);

    for text in ["z", "ze", "zel", "zeld", "zelda"] {
        search.input(text).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let snapshot = updates
        .wait_for(|s| s.query.text == "zelda" && s.phase == LoadPhase::Loaded)
        .await
        .expect("list closed")
        .clone();
    assert_eq!(snapshot.items.len(), 5);
    assert_eq!(harness.client.query_count().await, 1);

    search.clear().await;
    let snapshot = list.snapshot().await;
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.phase, LoadPhase::Idle);
}

#[tokio::test]
async fn test_detail_sessions_share_collection() {
    let harness = TestHarness::new();
    harness
        .client
        .add_detail(fixtures::detail(3328, "The Witcher 3"))
        .await;
    let store = harness.open_store();

    let first = DetailController::new(3328, harness.client.clone());
    let second = DetailController::new(3328, harness.client.clone());
    first.observe_collection_membership(&store);
    second.observe_collection_membership(&store);
    first.fetch_detail().await;
    second.fetch_detail().await;

    assert!(assert_ok!(second.toggle_saved(&store).await));
    assert!(first.is_saved());
    assert_eq!(store.len(), 1);

    assert!(!assert_ok!(first.toggle_saved(&store).await));
    assert!(!second.is_saved());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_collection_survives_reopen() {
    let harness = TestHarness::new();
    harness.client.add_detail(fixtures::detail(1, "Doom")).await;
    harness.client.add_detail(fixtures::detail(2, "Quake")).await;

    {
        let store = harness.open_store();
        for id in [2, 1] {
            let detail = DetailController::new(id, harness.client.clone());
            detail.fetch_detail().await;
            assert_ok!(detail.toggle_saved(&store).await);
        }
    }

    let store = harness.open_store();
    let ids: Vec<u64> = store.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![2, 1]);

    let detail = DetailController::new(1, harness.client.clone());
    detail.observe_collection_membership(&store);
    assert!(detail.is_saved());
}

#[tokio::test]
async fn test_missing_game_reports_not_found() {
    let harness = TestHarness::new();
    let detail = DetailController::new(999_999, harness.client.clone());
    detail.fetch_detail().await;

    let snapshot = detail.snapshot().await;
    assert_eq!(snapshot.phase, LoadPhase::Errored);
    assert!(snapshot.detail.is_none());
    assert!(snapshot.error.unwrap().contains("404"));
}
