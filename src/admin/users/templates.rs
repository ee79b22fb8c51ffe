use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension,
};
use tower_sessions::Session;
use tracing::error;

use crate::admin::users::columns::{user_columns, USER_FILTER_COLUMNS};
use crate::admin::users::handlers::search_users;
use crate::auth::csrf;
use crate::auth::principal::{Principal, PrivilegeRequirement};
use crate::flash::{self, FlashMessage};
use crate::listing::{present, FilterColumn, ListParams, ListingError, TableViewModel};
use crate::AppState;

pub const USER_CREATE_PRIVILEGE: &str = "user.create";
pub const USER_VIEW_PRIVILEGE: &str = "user.view";

fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        error!("Failed to render template: {}", e);
        "Template render error".to_string()
    }))
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub status: u16,
    pub message: String,
}

/// Failure of an admin page, rendered as an HTML error page.
#[derive(Debug)]
pub enum AdminPageError {
    Listing(ListingError),
    Session(String),
}

impl From<ListingError> for AdminPageError {
    fn from(e: ListingError) -> Self {
        AdminPageError::Listing(e)
    }
}

impl IntoResponse for AdminPageError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminPageError::Listing(e) => (e.status(), e.public_message()),
            AdminPageError::Session(e) => {
                error!("Session failure on admin page: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Your session could not be read".to_string(),
                )
            }
        };

        let template = ErrorTemplate {
            title: format!("Error {} - Backoffice", status.as_u16()),
            status: status.as_u16(),
            message,
        };

        (status, render(&template)).into_response()
    }
}

#[derive(Template)]
#[template(path = "admin/user/index.html")]
pub struct AdminUsersListTemplate {
    pub title: String,
    pub controller: String,
    pub table: TableViewModel,
    pub total_records: u64,
    pub search_query: String,
    pub filter_by: String,
    pub filter_columns: &'static [FilterColumn],
    pub sort: String,
    pub dir: String,
    pub flashes: Vec<FlashMessage>,
    pub principal_email: String,
    pub can_create: bool,
}

/// Handler for the admin user listing page
pub async fn admin_users_list_handler(
    session: Session,
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, AdminPageError> {
    let (spec, page) = search_users(&state, &params).await?;
    let table = present(&page, &user_columns());

    let (sort, dir) = spec
        .sort
        .as_ref()
        .map(|sort| (sort.column.clone(), sort.direction.as_str().to_string()))
        .unwrap_or_default();

    let template = AdminUsersListTemplate {
        title: "User Administration - Backoffice".to_string(),
        controller: "user".to_string(),
        total_records: page.total_count,
        table,
        search_query: spec.filter_text,
        filter_by: spec.filter_column,
        filter_columns: USER_FILTER_COLUMNS,
        sort,
        dir,
        flashes: flash::take(&session).await,
        can_create: principal.satisfies(&PrivilegeRequirement::new(USER_CREATE_PRIVILEGE)),
        principal_email: principal.email,
    };

    Ok(render(&template))
}

#[derive(Template)]
#[template(path = "admin/user/new.html")]
pub struct NewUserTemplate {
    pub title: String,
    pub form_action: String,
    pub csrf_token: String,
    pub flashes: Vec<FlashMessage>,
    pub principal_email: String,
}

/// Handler for the new user form
pub async fn new_user_form_handler(
    session: Session,
    Extension(principal): Extension<Principal>,
) -> Result<Html<String>, AdminPageError> {
    let csrf_token = csrf::issue_token(&session)
        .await
        .map_err(|e| AdminPageError::Session(e.to_string()))?;

    let template = NewUserTemplate {
        title: "New User - Backoffice".to_string(),
        form_action: crate::admin::users::handlers::NEW_USER_PATH.to_string(),
        csrf_token,
        flashes: flash::take(&session).await,
        principal_email: principal.email,
    };

    Ok(render(&template))
}
