use crate::admin::users::models::UserRecord;
use crate::listing::{ColumnDescriptor, FilterColumn, ListingPolicy, MatchMode};

pub const USER_FILTER_COLUMNS: &[FilterColumn] = &[
    FilterColumn {
        name: "email",
        label: "Email",
        mode: MatchMode::Substring,
    },
    FilterColumn {
        name: "first_name",
        label: "First name",
        mode: MatchMode::Substring,
    },
    FilterColumn {
        name: "last_name",
        label: "Last name",
        mode: MatchMode::Substring,
    },
    FilterColumn {
        name: "status",
        label: "Status",
        mode: MatchMode::Exact,
    },
    FilterColumn {
        name: "id",
        label: "ID",
        mode: MatchMode::Exact,
    },
];

/// Listing rules for users. `max_page_size` is overridden from configuration.
pub const USER_LISTING: ListingPolicy = ListingPolicy {
    filter_columns: USER_FILTER_COLUMNS,
    sort_columns: &["id", "email", "first_name", "last_name", "status", "created_at"],
    default_sort: "id",
    max_page_size: 100,
};

pub fn user_columns() -> [ColumnDescriptor<UserRecord>; 6] {
    [
        ColumnDescriptor {
            key: "id",
            label: "ID",
            format: |user| user.id.to_string(),
            sortable: true,
        },
        ColumnDescriptor {
            key: "email",
            label: "Email",
            format: |user| user.email.clone(),
            sortable: true,
        },
        ColumnDescriptor {
            key: "first_name",
            label: "First name",
            format: |user| user.first_name.clone().unwrap_or_default(),
            sortable: true,
        },
        ColumnDescriptor {
            key: "last_name",
            label: "Last name",
            format: |user| user.last_name.clone().unwrap_or_default(),
            sortable: true,
        },
        ColumnDescriptor {
            key: "status",
            label: "Status",
            format: |user| user.status.display_name().to_string(),
            sortable: true,
        },
        ColumnDescriptor {
            key: "created_at",
            label: "Created",
            format: |user| user.created_at.format("%Y-%m-%d %H:%M").to_string(),
            sortable: true,
        },
    ]
}
