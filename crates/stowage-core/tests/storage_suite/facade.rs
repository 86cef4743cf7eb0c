//! Facade operation tests: reads, writes, rename/copy, cancellation, and
//! bucket provisioning.

use bytes::Bytes;
use stowage_core::{Error, SaveSource};
use tokio_util::sync::CancellationToken;

use super::helpers::{memory_storage, TEST_BUCKET};

#[tokio::test]
async fn test_save_then_get_roundtrip() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    assert!(storage
        .save("docs/readme.md", SaveSource::from("hello world"), &cancel)
        .await
        .unwrap());

    let data = storage.get("docs/readme.md", &cancel).await.unwrap().unwrap();
    assert_eq!(data, Bytes::from("hello world"));
}

#[tokio::test]
async fn test_get_absent_is_none() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    assert!(storage.get("missing.txt", &cancel).await.unwrap().is_none());
    assert!(storage
        .get_info("missing.txt", &cancel)
        .await
        .unwrap()
        .is_none());
    assert!(!storage.exists("missing.txt", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_get_info_reflects_saved_object() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    storage
        .save("a/b.bin", vec![1, 2, 3, 4].into(), &cancel)
        .await
        .unwrap();

    let info = storage.get_info("a/b.bin", &cancel).await.unwrap().unwrap();
    assert_eq!(info.path, "a/b.bin");
    assert_eq!(info.size, 4);
    assert_eq!(info.created, info.modified);
}

#[tokio::test]
async fn test_backslash_paths_address_same_object() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    storage
        .save(r"a\b\c.txt", SaveSource::from("x"), &cancel)
        .await
        .unwrap();
    assert!(storage.exists("a/b/c.txt", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_bucket_created_at_most_once() {
    let (storage, remote) = memory_storage();
    let cancel = CancellationToken::new();

    storage.save("1.txt", SaveSource::from("a"), &cancel).await.unwrap();
    storage.save("2.txt", SaveSource::from("b"), &cancel).await.unwrap();
    storage.exists("1.txt", &cancel).await.unwrap();

    assert_eq!(remote.create_bucket_call_count(), 1);
}

#[tokio::test]
async fn test_save_failure_is_false_not_error() {
    let (storage, remote) = memory_storage();
    let cancel = CancellationToken::new();
    // provision the bucket before injecting the failure
    storage.exists("x", &cancel).await.unwrap();
    remote.inject_put_failure("bad.txt");

    let saved = storage
        .save("bad.txt", SaveSource::from("x"), &cancel)
        .await
        .unwrap();
    assert!(!saved);
}

#[tokio::test]
async fn test_save_from_positioned_cursor() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    let mut cursor = std::io::Cursor::new(Bytes::from_static(&[9, 8, 7]));
    cursor.set_position(1);
    storage
        .save("tail.bin", SaveSource::Cursor(cursor), &cancel)
        .await
        .unwrap();

    let info = storage.get_info("tail.bin", &cancel).await.unwrap().unwrap();
    assert_eq!(info.size, 2);
}

#[tokio::test]
async fn test_save_from_reader_counts_all_bytes() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    let reader = std::io::Cursor::new(vec![1u8, 2, 3]);
    storage
        .save("streamed.bin", SaveSource::reader(reader), &cancel)
        .await
        .unwrap();

    let info = storage
        .get_info("streamed.bin", &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.size, 3);
}

#[tokio::test]
async fn test_copy_keeps_source() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    storage.save("src.txt", SaveSource::from("x"), &cancel).await.unwrap();
    assert!(storage.copy("src.txt", "dst.txt", &cancel).await.unwrap());
    assert!(storage.exists("src.txt", &cancel).await.unwrap());
    assert!(storage.exists("dst.txt", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_copy_absent_source_is_false() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    assert!(!storage.copy("ghost.txt", "dst.txt", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_rename_moves_object() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    storage.save("old.txt", SaveSource::from("x"), &cancel).await.unwrap();
    assert!(storage.rename("old.txt", "new.txt", &cancel).await.unwrap());
    assert!(!storage.exists("old.txt", &cancel).await.unwrap());
    assert!(storage.exists("new.txt", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_rename_source_delete_failure_leaves_both_keys() {
    let (storage, remote) = memory_storage();
    let cancel = CancellationToken::new();

    storage.save("old.txt", SaveSource::from("x"), &cancel).await.unwrap();
    remote.inject_removal_failure("old.txt");

    let renamed = storage.rename("old.txt", "new.txt", &cancel).await.unwrap();
    assert!(!renamed);
    assert!(storage.exists("old.txt", &cancel).await.unwrap());
    assert!(storage.exists("new.txt", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_delete_absent_succeeds() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    assert!(storage.delete("never-existed.txt", &cancel).await.unwrap());
}

#[tokio::test]
async fn test_delete_removes_object() {
    let (storage, remote) = memory_storage();
    let cancel = CancellationToken::new();

    storage.save("gone.txt", SaveSource::from("x"), &cancel).await.unwrap();
    assert!(storage.delete("gone.txt", &cancel).await.unwrap());
    assert_eq!(remote.object_count(TEST_BUCKET), 0);
}

#[tokio::test]
async fn test_cancelled_token_is_an_error() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();
    storage.save("a.txt", SaveSource::from("x"), &cancel).await.unwrap();

    cancel.cancel();
    assert!(matches!(
        storage.get("a.txt", &cancel).await,
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        storage.save("b.txt", SaveSource::from("y"), &cancel).await,
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        storage.delete("a.txt", &cancel).await,
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        storage.list(None, &cancel).await,
        Err(Error::Cancelled)
    ));
}

#[tokio::test]
async fn test_list_of_fresh_storage_is_empty() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    let listing = storage.list(None, &cancel).await.unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn test_list_filters_by_pattern() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    for key in ["logs/a.log", "logs/b.log", "logs/a.txt", "data/c.log"] {
        storage.save(key, SaveSource::from("x"), &cancel).await.unwrap();
    }

    let listing = storage.list(Some("logs/*.log"), &cancel).await.unwrap();
    let paths: Vec<&str> = listing.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, vec!["logs/a.log", "logs/b.log"]);
}
