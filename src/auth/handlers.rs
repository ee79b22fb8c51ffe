use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::auth::guard::LOGIN_PATH;
use crate::auth::password::verify_password;
use crate::auth::principal::Principal;
use crate::auth::repository::CredentialRepository;
use crate::auth::session;
use crate::flash::{self, FlashMessage};
use crate::AppState;

/// Where a successful form login lands.
pub const HOME_PATH: &str = "/admin/user";

#[derive(Debug)]
pub enum ApiError {
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub id: i64,
    pub email: String,
    pub privileges: Vec<String>,
}

impl From<Principal> for PrincipalResponse {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            privileges: principal.privileges().iter().cloned().collect(),
            email: principal.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub principal: Option<PrincipalResponse>,
    pub message: String,
}

#[derive(Debug)]
enum LoginFailure {
    InvalidCredentials,
    Locked,
    Internal(String),
}

impl LoginFailure {
    fn message(&self) -> &str {
        match self {
            LoginFailure::InvalidCredentials => "Invalid email or password",
            LoginFailure::Locked => "Account is locked. Please contact an administrator.",
            LoginFailure::Internal(_) => "Login is temporarily unavailable",
        }
    }
}

/// Checks credentials and, on success, stores the principal in the session.
async fn authenticate(
    state: &AppState,
    session: &Session,
    request: &LoginRequest,
) -> Result<Principal, LoginFailure> {
    let repo = CredentialRepository::new(state.db.clone());

    let credentials = repo
        .find_by_email(request.email.trim())
        .await
        .map_err(|e| LoginFailure::Internal(format!("Failed to find user: {}", e)))?
        .ok_or(LoginFailure::InvalidCredentials)?;

    if !credentials.status.can_log_in() {
        return Err(LoginFailure::Locked);
    }

    match verify_password(&request.password, &credentials.password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(LoginFailure::InvalidCredentials),
        Err(e) => {
            return Err(LoginFailure::Internal(format!(
                "Failed to verify password: {}",
                e
            )))
        }
    }

    let principal = credentials.to_principal();
    session::establish(session, &principal)
        .await
        .map_err(|e| LoginFailure::Internal(format!("Failed to create session: {}", e)))?;

    info!(user_id = principal.id, "User logged in");
    Ok(principal)
}

pub async fn login_user(
    session: Session,
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    match authenticate(&state, &session, &request).await {
        Ok(principal) => Ok(Json(LoginResponse {
            success: true,
            principal: Some(PrincipalResponse::from(principal)),
            message: "Login successful".to_string(),
        })),
        Err(LoginFailure::Internal(reason)) => Err(ApiError::InternalError(reason)),
        Err(failure) => Ok(Json(LoginResponse {
            success: false,
            principal: None,
            message: failure.message().to_string(),
        })),
    }
}

pub async fn login_form_submit(
    session: Session,
    State(state): State<AppState>,
    Form(request): Form<LoginRequest>,
) -> Redirect {
    match authenticate(&state, &session, &request).await {
        Ok(_) => Redirect::to(HOME_PATH),
        Err(failure) => {
            if let LoginFailure::Internal(reason) = &failure {
                error!("Form login failed: {}", reason);
            }
            if let Err(e) = flash::push(&session, FlashMessage::warning(failure.message())).await {
                warn!("Failed to flash login failure: {}", e);
            }
            Redirect::to(LOGIN_PATH)
        }
    }
}

pub async fn logout_user(session: Session) -> Result<Redirect, ApiError> {
    session::clear(&session)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to clear session: {}", e)))?;

    Ok(Redirect::to(LOGIN_PATH))
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub flashes: Vec<FlashMessage>,
}

pub async fn login_handler(session: Session) -> Html<String> {
    let template = LoginTemplate {
        title: "Login - Backoffice".to_string(),
        flashes: flash::take(&session).await,
    };

    Html(template.render().unwrap_or_else(|e| {
        error!("Failed to render login template: {}", e);
        "Template render error".to_string()
    }))
}
