//! Paginated, searchable listings.
//!
//! A listing request flows through three steps: [`QuerySpec::from_params`]
//! normalizes the query string, [`search`] validates it against a
//! [`ListingPolicy`] and fetches one page from a [`RecordStore`], and
//! [`present`] turns the page into a [`TableViewModel`] for a template.

pub mod error;
pub mod memory;
pub mod page;
pub mod query;
pub mod search;
pub mod table;

pub use error::ListingError;
pub use memory::{CellValue, InMemoryStore, Searchable};
pub use page::PageResult;
pub use query::{
    Filter, FilterColumn, ListParams, ListingPolicy, MatchMode, PageRequest, QuerySpec,
    ResolvedSort, SortDirection, SortSpec,
};
pub use search::{search, RecordStore, StorePage};
pub use table::{present, ColumnDescriptor, PageLink, Pagination, TableHeader, TableViewModel};
