use serde::Serialize;

use crate::listing::page::PageResult;

/// Pages shown on each side of the current one in the pagination bar.
const PAGE_WINDOW: u64 = 2;

/// Maps one record attribute to a table column.
pub struct ColumnDescriptor<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub format: fn(&R) -> String,
    pub sortable: bool,
}

impl<R> Clone for ColumnDescriptor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ColumnDescriptor<R> {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableHeader {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub number: u64,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub page_size: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: u64,
    pub next_page: u64,
    pub pages: Vec<PageLink>,
}

impl Pagination {
    pub fn new(current_page: u64, total_pages: u64, total_count: u64, page_size: u64) -> Self {
        let has_previous = current_page > 1;
        let has_next = current_page < total_pages;

        let pages = if total_pages == 0 {
            Vec::new()
        } else {
            let anchor = current_page.clamp(1, total_pages);
            let first = anchor.saturating_sub(PAGE_WINDOW).max(1);
            let last = anchor.saturating_add(PAGE_WINDOW).min(total_pages);
            (first..=last)
                .map(|number| PageLink {
                    number,
                    current: number == current_page,
                })
                .collect()
        };

        Self {
            current_page,
            total_pages,
            total_count,
            page_size,
            has_previous,
            has_next,
            // Past the end, "previous" leads back to the last real page.
            previous_page: if has_previous {
                (current_page - 1).min(total_pages).max(1)
            } else {
                1
            },
            next_page: if has_next { current_page + 1 } else { current_page },
            pages,
        }
    }
}

/// Renderer-neutral table: headers, formatted rows and pagination state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableViewModel {
    pub headers: Vec<TableHeader>,
    pub rows: Vec<Vec<String>>,
    pub pagination: Pagination,
}

impl TableViewModel {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn present<R>(page: &PageResult<R>, columns: &[ColumnDescriptor<R>]) -> TableViewModel {
    let headers = columns
        .iter()
        .map(|column| TableHeader {
            key: column.key,
            label: column.label,
            sortable: column.sortable,
        })
        .collect();

    let rows = page
        .records
        .iter()
        .map(|record| columns.iter().map(|column| (column.format)(record)).collect())
        .collect();

    TableViewModel {
        headers,
        rows,
        pagination: Pagination::new(
            page.page_number,
            page.total_pages,
            page.total_count,
            page.page_size,
        ),
    }
}
