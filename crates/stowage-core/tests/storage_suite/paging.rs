//! Paged listing tests.

use stowage_core::{Error, PageCursor};
use tokio_util::sync::CancellationToken;

use super::helpers::{memory_storage, seed_objects};

#[tokio::test]
async fn test_pages_partition_the_listing() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();
    seed_objects(&storage, 10).await;

    let full: Vec<String> = storage
        .list(None, &cancel)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.path)
        .collect();

    let mut paged = Vec::new();
    let mut page = storage.paged_list(None, 4, &cancel).await.unwrap();
    loop {
        assert!(page.items.len() <= 4);
        paged.extend(page.items.into_iter().map(|s| s.path));
        match page.cursor {
            PageCursor::More(state) => {
                page = storage.next_page(&state, &cancel).await.unwrap();
            }
            PageCursor::Exhausted => break,
        }
    }

    // 10 objects at page size 4 come back as 4, 4, 2 in listing order
    assert_eq!(paged.len(), 10);
    assert_eq!(paged, full);
}

#[tokio::test]
async fn test_final_full_page_reports_exhausted() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();
    seed_objects(&storage, 8).await;

    let page1 = storage.paged_list(None, 4, &cancel).await.unwrap();
    let PageCursor::More(state) = page1.cursor else {
        panic!("expected a second page");
    };
    let page2 = storage.next_page(&state, &cancel).await.unwrap();
    assert_eq!(page2.items.len(), 4);
    assert!(!page2.has_more());
}

#[tokio::test]
async fn test_single_short_page() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();
    seed_objects(&storage, 3).await;

    let page = storage.paged_list(None, 10, &cancel).await.unwrap();
    assert_eq!(page.items.len(), 3);
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_empty_listing_yields_empty_exhausted_page() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    let page = storage.paged_list(None, 4, &cancel).await.unwrap();
    assert!(page.items.is_empty());
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_zero_page_size_rejected() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();

    assert!(matches!(
        storage.paged_list(None, 0, &cancel).await,
        Err(Error::Config(_))
    ));
}

#[tokio::test]
async fn test_paging_respects_pattern() {
    let (storage, _) = memory_storage();
    let cancel = CancellationToken::new();
    seed_objects(&storage, 6).await;
    storage
        .save("other/x.txt", "x".into(), &cancel)
        .await
        .unwrap();

    let page = storage.paged_list(Some("obj-*.bin"), 10, &cancel).await.unwrap();
    assert_eq!(page.items.len(), 6);
    assert!(page.items.iter().all(|s| s.path.starts_with("obj-")));
}
