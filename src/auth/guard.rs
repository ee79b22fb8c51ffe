//! The access guard stage that runs in front of every admin handler.

use askama::Template;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use http::{header, StatusCode};
use tower_sessions::Session;
use tracing::{debug, error, warn};

use crate::auth::principal::{Principal, PrivilegeRequirement};
use crate::auth::session::current_principal;
use crate::flash::{self, FlashMessage};

pub const LOGIN_PATH: &str = "/login";
pub const ACCESS_DENIED_MESSAGE: &str = "You are not allowed to access that resource.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Anonymous,
    MissingPrivilege,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

pub fn authorize(principal: Option<&Principal>, requirement: &PrivilegeRequirement) -> Decision {
    match principal {
        None => Decision::Deny(DenyReason::Anonymous),
        Some(principal) if principal.satisfies(requirement) => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::MissingPrivilege),
    }
}

/// Route layer enforcing `requirement`.
///
/// ```ignore
/// Router::new()
///     .route("/admin/user", get(index))
///     .route_layer(middleware::from_fn_with_state(
///         PrivilegeRequirement::new("user.view"),
///         require_privilege,
///     ))
/// ```
///
/// On success the [`Principal`] is added to the request extensions for the
/// handler to pick up with `Extension<Principal>`.
pub async fn require_privilege(
    State(requirement): State<PrivilegeRequirement>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match current_principal(&session).await {
        Ok(principal) => principal,
        Err(e) => {
            error!("Failed to read principal from session: {}", e);
            None
        }
    };

    match authorize(principal.as_ref(), &requirement) {
        Decision::Allow => {
            if let Some(principal) = principal {
                debug!(user_id = principal.id, %requirement, "Access granted");
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
        Decision::Deny(reason) => {
            warn!(
                ?reason,
                %requirement,
                path = %request.uri().path(),
                user_id = principal.as_ref().map(|p| p.id),
                "Access denied"
            );
            deny(&session).await
        }
    }
}

#[derive(Template)]
#[template(path = "denied.html")]
struct DeniedTemplate<'a> {
    title: &'a str,
    message: &'a str,
    login_path: &'a str,
}

/// Builds the denial response: 403, a warning message and a redirect to the
/// login page. The message is flashed and also written into the body, so it
/// reaches the user even if the session write fails.
pub async fn deny(session: &Session) -> Response {
    if let Err(e) = flash::push(session, FlashMessage::warning(ACCESS_DENIED_MESSAGE)).await {
        error!("Failed to flash access denied message: {}", e);
    }

    let page = DeniedTemplate {
        title: "Access denied - Backoffice",
        message: ACCESS_DENIED_MESSAGE,
        login_path: LOGIN_PATH,
    };
    let body = page.render().unwrap_or_else(|e| {
        error!("Failed to render access denied page: {}", e);
        ACCESS_DENIED_MESSAGE.to_string()
    });

    (
        StatusCode::FORBIDDEN,
        [(header::LOCATION, LOGIN_PATH)],
        Html(body),
    )
        .into_response()
}
