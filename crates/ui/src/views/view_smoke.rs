use std::sync::Arc;

use levelup_core::time::fixed_now;
use services::Clock;
use storage::repository::{InMemoryKeyValueStore, KeyValueStore, StorageError};

use super::test_harness::setup_progress_harness;

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_renders_fresh_user() {
    let store = InMemoryKeyValueStore::new();
    let mut harness = setup_progress_harness(Arc::new(store), Clock::fixed(fixed_now()));

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Level 1"), "missing level in {html}");
    assert!(html.contains("0 / 100 XP (0%)"), "missing experience in {html}");
    assert!(html.contains("Never signed in"), "missing sign label in {html}");
    assert!(html.contains("Sign in"), "missing button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_renders_stored_level() {
    let store = InMemoryKeyValueStore::with_entries([
        ("userId", "alice"),
        ("userLevel", "3"),
        ("userExp", "50"),
        ("signDays", "4"),
    ]);
    let mut harness = setup_progress_harness(Arc::new(store), Clock::fixed(fixed_now()));

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("alice"), "missing user in {html}");
    assert!(html.contains("Level 3"), "missing level in {html}");
    assert!(html.contains("50 / 225 XP (22%)"), "missing experience in {html}");
    assert!(html.contains("width: 22%;"), "missing bar width in {html}");
    assert!(html.contains("Signed in on 4 days"), "missing sign days in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_clears_stale_sign_in_on_load() {
    let store = InMemoryKeyValueStore::with_entries([
        ("isSigned", "true"),
        ("signDays", "2"),
        ("lastSignDate", "2023-11-13"),
    ]);
    let mut harness = setup_progress_harness(Arc::new(store.clone()), Clock::fixed(fixed_now()));

    harness.settle().await;
    let html = harness.render();
    assert!(!html.contains("Signed in today"), "stale flag shown in {html}");
    assert!(html.contains("Last sign-in: 2023-11-13"), "missing date in {html}");
    assert_eq!(
        store.snapshot().unwrap().get("isSigned").map(String::as_str),
        Some("false")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_keeps_todays_sign_in() {
    let store = InMemoryKeyValueStore::with_entries([
        ("isSigned", "true"),
        ("signDays", "2"),
        ("lastSignDate", "2023-11-14"),
    ]);
    let mut harness = setup_progress_harness(Arc::new(store), Clock::fixed(fixed_now()));

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Signed in today"), "missing signed state in {html}");
}

struct FailingStore;

#[async_trait::async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_renders_error_state() {
    let mut harness = setup_progress_harness(Arc::new(FailingStore), Clock::fixed(fixed_now()));

    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("could not be saved or loaded"),
        "missing error in {html}"
    );
    assert!(html.contains("Retry"), "missing retry in {html}");
}
