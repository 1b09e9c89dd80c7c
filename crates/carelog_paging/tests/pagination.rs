//! Full-walk pagination properties.

use carelog_model::{EntityType, Record};
use carelog_paging::{MemoryProvider, Page, PagingEngine};
use proptest::prelude::*;

/// Walks the pagination from page 0 until `next_key` is absent,
/// returning every visited page.
async fn walk(engine: &PagingEngine<MemoryProvider<usize>>, page_size: usize) -> Vec<Page<usize>> {
    let mut pages = Vec::new();
    let mut cursor = None;

    loop {
        let page = engine.load(cursor, page_size, None).await.unwrap();
        let next = page.next_key;
        pages.push(page);
        match next {
            Some(key) => cursor = Some(key),
            None => return pages,
        }
    }
}

proptest! {
    #[test]
    fn full_walk_yields_every_item_once_in_order(n in 0usize..60, p in 1usize..10) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let engine = PagingEngine::new(MemoryProvider::new((0..n).collect()));
            let pages = walk(&engine, p).await;

            // Every item exactly once, in provider order.
            let collected: Vec<usize> = pages.iter().flat_map(|page| page.items.clone()).collect();
            prop_assert_eq!(collected, (0..n).collect::<Vec<_>>());

            // Every page but the last is full; the last is partial and terminal.
            let (last, rest) = pages.split_last().unwrap();
            for page in rest {
                prop_assert_eq!(page.items.len(), p);
                prop_assert!(page.next_key.is_some());
            }
            prop_assert!(last.items.len() < p);
            prop_assert!(last.next_key.is_none());
            prop_assert_eq!(last.items_after, Some(0));

            // Prev keys are absent exactly on page 0.
            for (index, page) in pages.iter().enumerate() {
                prop_assert_eq!(page.prev_key.is_none(), index == 0);
                prop_assert_eq!(page.items_before, (index * p) as u64);
            }
            Ok(())
        })?;
    }

    #[test]
    fn refresh_key_is_stable_for_any_anchor_page(n in 1usize..60, p in 1usize..10) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let engine = PagingEngine::new(MemoryProvider::new((0..n).collect()));
            for page in walk(&engine, p).await {
                let anchor = page.anchor();
                let first = engine.refresh_key(&anchor);
                prop_assert_eq!(engine.refresh_key(&anchor), first);
            }
            Ok(())
        })?;
    }
}

#[tokio::test]
async fn patient_records_page_like_any_item() {
    let records: Vec<Record> = (0..25)
        .map(|i| {
            Record::new(
                EntityType::Patient,
                serde_json::json!({ "name": format!("patient-{i}") }),
            )
        })
        .collect();
    let engine = PagingEngine::new(MemoryProvider::new(records.clone()));

    // 25 records, page size 10: pages of 10, 10, 5.
    let page0 = engine.load(None, 10, None).await.unwrap();
    let page1 = engine.load(page0.next_key, 10, None).await.unwrap();
    let page2 = engine.load(page1.next_key, 10, None).await.unwrap();

    assert_eq!(page0.items.len(), 10);
    assert_eq!(page1.items.len(), 10);
    assert_eq!(page2.items.len(), 5);
    assert!(page2.next_key.is_none());
    assert_eq!(page2.items[0], records[20]);
}
