use axum::{
    extract::{Query, State},
    response::Redirect,
    Form, Json,
};
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::admin::users::columns::USER_LISTING;
use crate::admin::users::models::{NewUserForm, UserRecord};
use crate::admin::users::repository::{is_unique_violation, AdminUserRepository};
use crate::auth::csrf;
use crate::config::AppConfig;
use crate::flash::{self, FlashMessage};
use crate::listing::{search, ListParams, ListingError, ListingPolicy, PageResult, QuerySpec};
use crate::AppState;

pub const NEW_USER_PATH: &str = "/admin/user/new";
pub const NEW_ADDED_MESSAGE: &str = "New user added successfully.";
pub const FAIL_SUBMISSION_MESSAGE: &str = "The user could not be added.";
const DUPLICATE_EMAIL_MESSAGE: &str = "A user with this email already exists.";

/// User listing rules with the configured page-size ceiling.
pub fn user_listing(config: &AppConfig) -> ListingPolicy {
    USER_LISTING.with_max_page_size(config.listing.max_records_per_page)
}

/// Runs a user search for the given query-string parameters.
pub(crate) async fn search_users(
    state: &AppState,
    params: &ListParams,
) -> Result<(QuerySpec, PageResult<UserRecord>), ListingError> {
    let spec = QuerySpec::from_params(params, &state.config.listing);
    let repo = AdminUserRepository::new(state.db.clone());
    let page = search(&repo, &spec, &user_listing(&state.config)).await?;
    Ok((spec, page))
}

/// List users as JSON
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResult<UserRecord>>, ListingError> {
    let (_, page) = search_users(&state, &params).await?;
    Ok(Json(page))
}

/// Handle the new-user form. Every outcome redirects back to the form with a
/// flash message.
pub async fn create_user(
    session: Session,
    State(state): State<AppState>,
    Form(form): Form<NewUserForm>,
) -> Redirect {
    let message = match submit_new_user(&state, &session, form).await {
        Ok(user) => {
            info!(user_id = user.id, "User created from admin form");
            FlashMessage::success(NEW_ADDED_MESSAGE)
        }
        Err(reason) => {
            warn!("New user submission rejected: {}", reason);
            FlashMessage::warning(format!("{} {}", FAIL_SUBMISSION_MESSAGE, reason))
        }
    };

    if let Err(e) = flash::push(&session, message).await {
        error!("Failed to flash new user outcome: {}", e);
    }

    Redirect::to(NEW_USER_PATH)
}

async fn submit_new_user(
    state: &AppState,
    session: &Session,
    form: NewUserForm,
) -> Result<UserRecord, String> {
    let token_valid = csrf::verify_token(session, &form.csrf_token)
        .await
        .map_err(|e| {
            error!("Failed to read form token: {}", e);
            "Please try again.".to_string()
        })?;
    if !token_valid {
        return Err("The form has expired, please try again.".to_string());
    }

    let new_user = form.validate()?;
    let repo = AdminUserRepository::new(state.db.clone());

    match repo.email_exists(&new_user.email).await {
        Ok(false) => {}
        Ok(true) => return Err(DUPLICATE_EMAIL_MESSAGE.to_string()),
        Err(e) => {
            error!("Failed to check existing user: {}", e);
            return Err("Please try again later.".to_string());
        }
    }

    // The check above can race with another insert; the constraint decides.
    repo.create_user(new_user).await.map_err(|e| {
        if is_unique_violation(&e) {
            return DUPLICATE_EMAIL_MESSAGE.to_string();
        }
        error!("Failed to create user: {}", e);
        "Please try again later.".to_string()
    })
}
