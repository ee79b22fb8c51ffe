pub mod columns;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod templates;

// Re-export commonly used items
pub use columns::{user_columns, USER_FILTER_COLUMNS, USER_LISTING};
pub use handlers::{create_user, list_users, user_listing};
pub use models::{NewUser, NewUserForm, UserRecord};
pub use repository::AdminUserRepository;
pub use templates::{
    admin_users_list_handler, new_user_form_handler, USER_CREATE_PRIVILEGE, USER_VIEW_PRIVILEGE,
};
