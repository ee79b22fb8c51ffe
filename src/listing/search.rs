use std::future::Future;
use tracing::{debug, error};

use crate::database::DbError;
use crate::listing::error::ListingError;
use crate::listing::page::PageResult;
use crate::listing::query::{ListingPolicy, PageRequest, QuerySpec};

/// Records matching a [`PageRequest`], counted and sliced from one consistent
/// view of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePage<R> {
    pub records: Vec<R>,
    pub total_count: u64,
}

/// Read side of a record store used by listing pages.
///
/// Implementations must take the count and the slice from a single snapshot,
/// order by `request.sort` and break ties by identifier ascending.
pub trait RecordStore: Send + Sync {
    type Record: Send;

    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<StorePage<Self::Record>, DbError>> + Send;
}

/// Validates `spec` against `policy` and fetches the requested page.
///
/// Validation happens before the store is touched, so a bad column or bad
/// paging never costs a round-trip.
pub async fn search<S: RecordStore>(
    store: &S,
    spec: &QuerySpec,
    policy: &ListingPolicy,
) -> Result<PageResult<S::Record>, ListingError> {
    let request = policy.resolve(spec)?;

    debug!(
        filter = ?request.filter,
        sort = request.sort.column,
        page = request.page_number,
        page_size = request.page_size,
        "Fetching record page"
    );

    let page = store.fetch_page(&request).await.map_err(|e| {
        error!("Record store query failed: {}", e);
        ListingError::StoreUnavailable(e.to_string())
    })?;

    Ok(PageResult::new(
        page.records,
        page.total_count,
        request.page_number,
        request.page_size,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::memory::{CellValue, InMemoryStore, Searchable};
    use crate::listing::query::{FilterColumn, MatchMode, SortDirection, SortSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
        title: String,
    }

    impl Searchable for Item {
        fn id(&self) -> i64 {
            self.id
        }

        fn column_value(&self, column: &str) -> Option<CellValue> {
            match column {
                "id" => Some(CellValue::Int(self.id)),
                "title" => Some(CellValue::Text(self.title.clone())),
                _ => None,
            }
        }
    }

    const POLICY: ListingPolicy = ListingPolicy {
        filter_columns: &[FilterColumn {
            name: "title",
            label: "Title",
            mode: MatchMode::Substring,
        }],
        sort_columns: &["id", "title"],
        default_sort: "id",
        max_page_size: 100,
    };

    fn store_with(count: i64) -> InMemoryStore<Item> {
        InMemoryStore::new(
            (1..=count)
                .rev()
                .map(|id| Item {
                    id,
                    title: format!("item {:02}", id),
                })
                .collect(),
        )
    }

    fn spec(page_number: i64, page_size: i64) -> QuerySpec {
        QuerySpec {
            filter_column: "title".to_string(),
            filter_text: String::new(),
            page_number,
            page_size,
            sort: None,
        }
    }

    /// Store that counts how often it is queried.
    struct CountingStore {
        calls: AtomicUsize,
    }

    impl RecordStore for CountingStore {
        type Record = Item;

        async fn fetch_page(&self, _request: &PageRequest) -> Result<StorePage<Item>, DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StorePage {
                records: Vec::new(),
                total_count: 0,
            })
        }
    }

    /// Store that always fails.
    struct BrokenStore;

    impl RecordStore for BrokenStore {
        type Record = Item;

        async fn fetch_page(&self, _request: &PageRequest) -> Result<StorePage<Item>, DbError> {
            Err("connection refused".into())
        }
    }

    #[test]
    fn test_third_page_of_twenty_five() {
        let store = store_with(25);
        let page = tokio_test::block_on(search(&store, &spec(3, 10), &POLICY)).unwrap();

        assert_eq!(page.records.len(), 5);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.is_last_page());
        let ids: Vec<i64> = page.records.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_page_beyond_end_is_empty_not_an_error() {
        let store = store_with(25);
        let page = tokio_test::block_on(search(&store, &spec(9, 10), &POLICY)).unwrap();

        assert!(page.records.is_empty());
        assert_eq!(page.total_count, 25);
        assert_eq!(page.page_number, 9);
    }

    #[test]
    fn test_filter_and_explicit_sort() {
        let store = store_with(25);
        let mut query = spec(1, 10);
        query.filter_text = "item 1".to_string();
        query.sort = Some(SortSpec {
            column: "title".to_string(),
            direction: SortDirection::Desc,
        });

        let page = tokio_test::block_on(search(&store, &query, &POLICY)).unwrap();
        let ids: Vec<i64> = page.records.iter().map(|item| item.id).collect();

        assert_eq!(page.total_count, 10);
        assert_eq!(ids, vec![19, 18, 17, 16, 15, 14, 13, 12, 11, 10]);
    }

    #[test]
    fn test_repeated_search_is_identical() {
        let store = store_with(40);
        let first = tokio_test::block_on(search(&store, &spec(2, 15), &POLICY)).unwrap();
        let second = tokio_test::block_on(search(&store, &spec(2, 15), &POLICY)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_column_never_reaches_store() {
        let store = CountingStore {
            calls: AtomicUsize::new(0),
        };
        let mut query = spec(1, 10);
        query.filter_column = "password_hash".to_string();

        let result = tokio_test::block_on(search(&store, &query, &POLICY));

        assert_eq!(
            result,
            Err(ListingError::InvalidFilterColumn("password_hash".to_string()))
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_paging_never_reaches_store() {
        let store = CountingStore {
            calls: AtomicUsize::new(0),
        };

        let result = tokio_test::block_on(search(&store, &spec(0, 10), &POLICY));

        assert!(matches!(result, Err(ListingError::InvalidPaging { .. })));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_store_failure_is_surfaced() {
        let result = tokio_test::block_on(search(&BrokenStore, &spec(1, 10), &POLICY));
        assert_eq!(
            result,
            Err(ListingError::StoreUnavailable("connection refused".to_string()))
        );
    }
}
