use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    InvalidFilterColumn(String),
    InvalidSortColumn(String),
    InvalidPaging { page_number: i64, page_size: i64 },
    StoreUnavailable(String),
}

impl ListingError {
    pub fn status(&self) -> StatusCode {
        match self {
            ListingError::InvalidFilterColumn(_)
            | ListingError::InvalidSortColumn(_)
            | ListingError::InvalidPaging { .. } => StatusCode::BAD_REQUEST,
            ListingError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the requester. Store failures are not echoed.
    pub fn public_message(&self) -> String {
        match self {
            ListingError::StoreUnavailable(_) => "Records are temporarily unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ListingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingError::InvalidFilterColumn(column) => {
                write!(f, "Cannot filter by column '{}'", column)
            }
            ListingError::InvalidSortColumn(column) => {
                write!(f, "Cannot sort by column '{}'", column)
            }
            ListingError::InvalidPaging {
                page_number,
                page_size,
            } => write!(
                f,
                "Invalid paging: page {} with {} records per page",
                page_number, page_size
            ),
            ListingError::StoreUnavailable(reason) => write!(f, "Record store unavailable: {}", reason),
        }
    }
}

impl std::error::Error for ListingError {}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.public_message(),
        }));

        (self.status(), body).into_response()
    }
}
