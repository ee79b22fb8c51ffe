use axum::{middleware, routing::get, Router};

use crate::auth::{require_privilege, PrivilegeRequirement};
use crate::AppState;

pub mod users;

// Re-export commonly used items
pub use users::{AdminUserRepository, NewUser, UserRecord};

/// Admin routes, each group behind the guard stage for its privilege.
pub fn admin_routes() -> Router<AppState> {
    let view = Router::new()
        .route("/admin/user", get(users::admin_users_list_handler))
        .route("/api/admin/users", get(users::list_users))
        .route_layer(middleware::from_fn_with_state(
            PrivilegeRequirement::new(users::USER_VIEW_PRIVILEGE),
            require_privilege,
        ));

    let create = Router::new()
        .route(
            "/admin/user/new",
            get(users::new_user_form_handler).post(users::create_user),
        )
        .route_layer(middleware::from_fn_with_state(
            PrivilegeRequirement::new(users::USER_CREATE_PRIVILEGE),
            require_privilege,
        ));

    view.merge(create)
}
