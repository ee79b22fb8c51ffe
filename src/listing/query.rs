use serde::{Deserialize, Serialize};

use crate::config::ListingSettings;
use crate::listing::error::ListingError;

/// Raw listing parameters as they arrive on the query string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub filter_by: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl From<&str> for SortDirection {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Normalized filter and paging parameters for one listing request.
///
/// Values are not validated here; `search` checks them against a
/// [`ListingPolicy`] before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub filter_column: String,
    pub filter_text: String,
    pub page_number: i64,
    pub page_size: i64,
    pub sort: Option<SortSpec>,
}

impl QuerySpec {
    /// Builds a spec from request parameters, filling gaps from configuration.
    pub fn from_params(params: &ListParams, settings: &ListingSettings) -> Self {
        let filter_column = params
            .filter_by
            .as_deref()
            .map(str::trim)
            .filter(|column| !column.is_empty())
            .unwrap_or(&settings.filter_by)
            .to_string();

        let sort = params
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|column| !column.is_empty())
            .map(|column| SortSpec {
                column: column.to_string(),
                direction: params
                    .dir
                    .as_deref()
                    .map(SortDirection::from)
                    .unwrap_or(SortDirection::Asc),
            });

        Self {
            filter_column,
            filter_text: params.q.as_deref().unwrap_or("").trim().to_string(),
            page_number: params.page.unwrap_or(1),
            page_size: params.per_page.unwrap_or(settings.records_per_page),
            sort,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive substring match.
    Substring,
    /// Case-insensitive equality; numeric equality on integer columns.
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterColumn {
    pub name: &'static str,
    pub label: &'static str,
    pub mode: MatchMode,
}

/// Allow-lists and bounds for one resource's listing.
#[derive(Debug, Clone, Copy)]
pub struct ListingPolicy {
    pub filter_columns: &'static [FilterColumn],
    pub sort_columns: &'static [&'static str],
    pub default_sort: &'static str,
    pub max_page_size: i64,
}

impl ListingPolicy {
    pub fn with_max_page_size(self, max_page_size: i64) -> Self {
        Self {
            max_page_size,
            ..self
        }
    }

    pub fn filter_column(&self, name: &str) -> Option<&'static FilterColumn> {
        self.filter_columns.iter().find(|column| column.name == name)
    }

    fn sort_column(&self, name: &str) -> Option<&'static str> {
        self.sort_columns.iter().copied().find(|column| *column == name)
    }

    /// Validates `spec` and turns it into a request the store can run as is.
    ///
    /// Column names in the result always come from the allow-lists, never
    /// from the request.
    pub fn resolve(&self, spec: &QuerySpec) -> Result<PageRequest, ListingError> {
        let column = self
            .filter_column(&spec.filter_column)
            .ok_or_else(|| ListingError::InvalidFilterColumn(spec.filter_column.clone()))?;

        let sort = match &spec.sort {
            Some(sort) => ResolvedSort {
                column: self
                    .sort_column(&sort.column)
                    .ok_or_else(|| ListingError::InvalidSortColumn(sort.column.clone()))?,
                direction: sort.direction,
            },
            None => ResolvedSort {
                column: self.default_sort,
                direction: SortDirection::Asc,
            },
        };

        if spec.page_number < 1 || spec.page_size < 1 || spec.page_size > self.max_page_size {
            return Err(ListingError::InvalidPaging {
                page_number: spec.page_number,
                page_size: spec.page_size,
            });
        }

        let filter_text = spec.filter_text.trim();
        let filter = (!filter_text.is_empty()).then(|| Filter {
            column: column.name,
            mode: column.mode,
            text: filter_text.to_string(),
        });

        Ok(PageRequest {
            filter,
            sort,
            page_number: spec.page_number as u64,
            page_size: spec.page_size as u64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub mode: MatchMode,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSort {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// A validated page query, ready for a [`RecordStore`](crate::listing::RecordStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub filter: Option<Filter>,
    pub sort: ResolvedSort,
    pub page_number: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}
