//! Bulk deletion tests.

use stowage_core::SaveSource;
use tokio_util::sync::CancellationToken;

use super::helpers::{memory_storage, seed_objects, TEST_BUCKET};

#[tokio::test]
async fn test_delete_matching_removes_pattern_matches_only() {
    let (storage, remote) = memory_storage();
    let cancel = CancellationToken::new();

    for key in ["logs/a.log", "logs/b.log", "logs/keep.txt", "data/c.log"] {
        storage.save(key, SaveSource::from("x"), &cancel).await.unwrap();
    }

    let deleted = storage.delete_matching(Some("logs/*.log"), &cancel).await.unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(remote.object_count(TEST_BUCKET), 2);
    assert!(storage.exists("logs/keep.txt", &cancel).await.unwrap());
    assert!(storage.exists("data/c.log", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_delete_matching_counts_only_successes() {
    let (storage, remote) = memory_storage();
    let cancel = CancellationToken::new();
    seed_objects(&storage, 5).await;
    remote.inject_removal_failure("obj-01.bin");
    remote.inject_removal_failure("obj-03.bin");

    let deleted = storage.delete_matching(None, &cancel).await.unwrap();
    assert_eq!(deleted, 3);
    assert_eq!(remote.object_count(TEST_BUCKET), 2);
}

#[tokio::test]
async fn test_delete_matching_on_empty_storage() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    let deleted = storage.delete_matching(None, &cancel).await.unwrap();
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn test_multi_page_sweep_skips_objects_that_slid_forward() {
    let (storage, remote) = memory_storage();
    let cancel = CancellationToken::new();
    for i in 0..300 {
        let saved = storage
            .save(&format!("bulk/obj-{:03}.bin", i), SaveSource::from("x"), &cancel)
            .await
            .unwrap();
        assert!(saved);
    }

    // The first 250-item batch is removed in full. The second page then
    // re-enumerates with skip 250, but only 50 objects remain, so the sweep
    // ends without touching them. A repeat call collects the remainder.
    let deleted = storage.delete_matching(Some("bulk/*.bin"), &cancel).await.unwrap();
    assert_eq!(deleted, 250);
    assert_eq!(remote.object_count(TEST_BUCKET), 50);

    let deleted = storage.delete_matching(Some("bulk/*.bin"), &cancel).await.unwrap();
    assert_eq!(deleted, 50);
    assert_eq!(remote.object_count(TEST_BUCKET), 0);
}

#[tokio::test]
async fn test_delete_matching_everything() {
    let (storage, remote) = memory_storage();
    let cancel = CancellationToken::new();
    seed_objects(&storage, 12).await;

    let deleted = storage.delete_matching(None, &cancel).await.unwrap();
    assert_eq!(deleted, 12);
    assert_eq!(remote.object_count(TEST_BUCKET), 0);
}
