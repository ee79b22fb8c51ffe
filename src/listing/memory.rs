use std::sync::{Arc, RwLock};

use crate::database::DbResult;
use crate::listing::query::{Filter, MatchMode, PageRequest, SortDirection};
use crate::listing::search::{RecordStore, StorePage};

/// A column value as seen by filtering and sorting.
///
/// The derived ordering puts integers before text, the same as SQLite.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CellValue {
    Int(i64),
    Text(String),
}

impl CellValue {
    fn matches(&self, mode: MatchMode, needle: &str) -> bool {
        match (self, mode) {
            (CellValue::Int(value), MatchMode::Exact) => needle.parse::<i64>() == Ok(*value),
            (CellValue::Int(value), MatchMode::Substring) => value.to_string().contains(needle),
            (CellValue::Text(value), MatchMode::Exact) => value.eq_ignore_ascii_case(needle),
            (CellValue::Text(value), MatchMode::Substring) => {
                value.to_lowercase().contains(&needle.to_lowercase())
            }
        }
    }
}

/// Records that can be listed from memory.
pub trait Searchable {
    fn id(&self) -> i64;

    /// Value of `column`, `None` when the column is unset (SQL `NULL`).
    fn column_value(&self, column: &str) -> Option<CellValue>;
}

/// Record store over a vector, with the same matching and ordering rules as
/// the SQLite repository. Used for fixtures and tests.
#[derive(Debug)]
pub struct InMemoryStore<R> {
    records: Arc<RwLock<Vec<R>>>,
}

impl<R> Clone for InMemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<R: Searchable + Clone> InMemoryStore<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn insert(&self, record: R) -> DbResult<()> {
        self.records
            .write()
            .map_err(|_| "in-memory store lock poisoned")?
            .push(record);
        Ok(())
    }

    fn select(&self, request: &PageRequest) -> DbResult<StorePage<R>> {
        let records = self
            .records
            .read()
            .map_err(|_| "in-memory store lock poisoned")?;

        let mut matching: Vec<&R> = records
            .iter()
            .filter(|record| matches_filter(*record, request.filter.as_ref()))
            .collect();

        matching.sort_by(|a, b| {
            let ordering = a
                .column_value(request.sort.column)
                .cmp(&b.column_value(request.sort.column));
            let ordering = match request.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id().cmp(&b.id()))
        });

        let total_count = matching.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);

        Ok(StorePage {
            records: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            total_count,
        })
    }
}

fn matches_filter<R: Searchable>(record: &R, filter: Option<&Filter>) -> bool {
    match filter {
        None => true,
        Some(filter) => record
            .column_value(filter.column)
            .is_some_and(|value| value.matches(filter.mode, &filter.text)),
    }
}

impl<R> RecordStore for InMemoryStore<R>
where
    R: Searchable + Clone + Send + Sync,
{
    type Record = R;

    async fn fetch_page(&self, request: &PageRequest) -> DbResult<StorePage<R>> {
        self.select(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::query::{Filter, ResolvedSort};

    #[derive(Debug, Clone, PartialEq)]
    struct Contact {
        id: i64,
        name: Option<String>,
    }

    impl Searchable for Contact {
        fn id(&self) -> i64 {
            self.id
        }

        fn column_value(&self, column: &str) -> Option<CellValue> {
            match column {
                "id" => Some(CellValue::Int(self.id)),
                "name" => self.name.clone().map(CellValue::Text),
                _ => None,
            }
        }
    }

    fn contact(id: i64, name: Option<&str>) -> Contact {
        Contact {
            id,
            name: name.map(str::to_string),
        }
    }

    fn request(filter: Option<Filter>, sort: &'static str, direction: SortDirection) -> PageRequest {
        PageRequest {
            filter,
            sort: ResolvedSort {
                column: sort,
                direction,
            },
            page_number: 1,
            page_size: 10,
        }
    }

    fn ids(page: &StorePage<Contact>) -> Vec<i64> {
        page.records.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_substring_filter_is_case_insensitive_and_skips_nulls() {
        let store = InMemoryStore::new(vec![
            contact(1, Some("Ada Lovelace")),
            contact(2, Some("Grace Hopper")),
            contact(3, None),
            contact(4, Some("ADA Byron")),
        ]);
        let filter = Filter {
            column: "name",
            mode: MatchMode::Substring,
            text: "ada".to_string(),
        };

        let page =
            tokio_test::block_on(store.fetch_page(&request(Some(filter), "id", SortDirection::Asc)))
                .unwrap();

        assert_eq!(ids(&page), vec![1, 4]);
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn test_exact_filter_on_integer_column() {
        let store = InMemoryStore::new(vec![contact(5, None), contact(15, None), contact(50, None)]);
        let filter = Filter {
            column: "id",
            mode: MatchMode::Exact,
            text: "05".to_string(),
        };

        let page =
            tokio_test::block_on(store.fetch_page(&request(Some(filter), "id", SortDirection::Asc)))
                .unwrap();

        assert_eq!(ids(&page), vec![5]);
    }

    #[test]
    fn test_descending_sort_breaks_ties_by_id() {
        let store = InMemoryStore::new(vec![
            contact(3, Some("b")),
            contact(1, Some("b")),
            contact(2, Some("a")),
            contact(4, None),
        ]);

        let page = tokio_test::block_on(store.fetch_page(&request(None, "name", SortDirection::Desc)))
            .unwrap();

        // NULL sorts first ascending, so last descending
        assert_eq!(ids(&page), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_insert_is_visible_to_clones() {
        let store = InMemoryStore::new(Vec::new());
        let view = store.clone();
        store.insert(contact(7, Some("late"))).unwrap();

        let page = tokio_test::block_on(view.fetch_page(&request(None, "id", SortDirection::Asc)))
            .unwrap();
        assert_eq!(page.total_count, 1);
    }
}
