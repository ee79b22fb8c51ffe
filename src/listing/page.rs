use serde::Serialize;

/// One page of records plus the totals needed to paginate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult<R> {
    pub records: Vec<R>,
    pub total_count: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<R> PageResult<R> {
    pub fn new(records: Vec<R>, total_count: u64, page_number: u64, page_size: u64) -> Self {
        debug_assert!(page_size > 0);
        debug_assert!(records.len() as u64 <= page_size);
        debug_assert!(records.len() as u64 <= total_count);

        Self {
            total_pages: total_pages(total_count, page_size),
            records,
            total_count,
            page_number,
            page_size,
        }
    }

    pub fn is_last_page(&self) -> bool {
        self.page_number >= self.total_pages
    }
}

/// `ceil(total_count / page_size)`, zero for an empty result.
pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}
