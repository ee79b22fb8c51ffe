use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use backoffice::{
    admin::{AdminUserRepository, NewUser, UserRecord},
    auth::parse_privileges,
    config::{AppConfig, ListingSettings},
    database::Database,
    models::UserStatus,
    AppState,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "password123";

/// Creates a test app with a fresh database for integration testing
#[allow(dead_code)]
pub async fn create_test_app() -> Router {
    let app_state = create_test_app_state().await;
    backoffice::create_router(app_state)
}

/// Creates a test app state with a unique temporary database
pub async fn create_test_app_state() -> AppState {
    let temp_dir = std::env::temp_dir();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    let test_db_path = temp_dir
        .join(format!("test_backoffice_{}.db", timestamp))
        .to_string_lossy()
        .to_string();

    let config = Arc::new(AppConfig {
        server_address: "0.0.0.0:3000".to_string(),
        database_url: test_db_path,
        environment: "test".to_string(),
        listing: ListingSettings::default(),
        bootstrap_admin: None,
    });

    let db = Arc::new(Database::new(&config.database_url).await.unwrap());
    db.migrate().await.unwrap();

    AppState::new(db, config)
}

/// Inserts an active user holding the given comma separated privileges
#[allow(dead_code)]
pub async fn create_user(app_state: &AppState, email: &str, privileges: &str) -> UserRecord {
    create_user_with_status(app_state, email, privileges, UserStatus::Active).await
}

#[allow(dead_code)]
pub async fn create_user_with_status(
    app_state: &AppState,
    email: &str,
    privileges: &str,
    status: UserStatus,
) -> UserRecord {
    let repo = AdminUserRepository::new(app_state.db.clone());
    repo.create_user(NewUser {
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        first_name: Some("Test".to_string()),
        last_name: None,
        status,
        privileges: parse_privileges(privileges),
    })
    .await
    .unwrap()
}

/// Logs in through the JSON endpoint and returns the session cookie
#[allow(dead_code)]
pub async fn login(app_state: &AppState, email: &str) -> String {
    let app = backoffice::create_router(app_state.clone());
    let login_body = json!({
        "email": email,
        "password": TEST_PASSWORD
    });

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&login_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    session_cookie(&response).expect("login should set a session cookie")
}

/// Creates a user with the given privileges and logs them in
#[allow(dead_code)]
pub async fn create_and_login(app_state: &AppState, email: &str, privileges: &str) -> String {
    create_user(app_state, email, privileges).await;
    login(app_state, email).await
}

/// Name and value part of the session cookie, if the response set one
#[allow(dead_code)]
pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookie| cookie.split(';').next())
        .map(|cookie| cookie.to_string())
}

/// Sends a GET request with an optional session cookie
#[allow(dead_code)]
pub async fn get(app_state: &AppState, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let app = backoffice::create_router(app_state.clone());
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header("Cookie", cookie);
    }

    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Sends a url-encoded form POST with an optional session cookie
#[allow(dead_code)]
pub async fn post_form(
    app_state: &AppState,
    uri: &str,
    cookie: Option<&str>,
    body: String,
) -> Response<Body> {
    let app = backoffice::create_router(app_state.clone());
    let mut request = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header("Cookie", cookie);
    }

    app.oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
