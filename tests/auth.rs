mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use backoffice::models::UserStatus;

async fn login_json(app_state: &backoffice::AppState, email: &str, password: &str) -> serde_json::Value {
    let app = backoffice::create_router(app_state.clone());
    let body = json!({ "email": email, "password": password });

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    common::body_json(response).await
}

#[tokio::test]
async fn test_login_success_returns_principal() {
    let app_state = common::create_test_app_state().await;
    common::create_user(&app_state, "viewer@example.com", "user.view, user.create").await;

    let body = login_json(&app_state, "Viewer@Example.com", common::TEST_PASSWORD).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["principal"]["email"], "viewer@example.com");
    assert_eq!(body["principal"]["privileges"], json!(["user.create", "user.view"]));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app_state = common::create_test_app_state().await;
    common::create_user(&app_state, "viewer@example.com", "user.view").await;

    let body = login_json(&app_state, "viewer@example.com", "wrongpassword").await;

    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email or password");
    assert!(body["principal"].is_null());
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app_state = common::create_test_app_state().await;

    let body = login_json(&app_state, "ghost@example.com", common::TEST_PASSWORD).await;

    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_locked_account_cannot_log_in() {
    let app_state = common::create_test_app_state().await;
    common::create_user_with_status(&app_state, "locked@example.com", "all", UserStatus::Locked)
        .await;

    let body = login_json(&app_state, "locked@example.com", common::TEST_PASSWORD).await;

    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("locked"));
}

#[tokio::test]
async fn test_pending_account_can_log_in() {
    let app_state = common::create_test_app_state().await;
    common::create_user_with_status(&app_state, "pending@example.com", "", UserStatus::Pending)
        .await;

    let body = login_json(&app_state, "pending@example.com", common::TEST_PASSWORD).await;

    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_form_login_redirects_home() {
    let app_state = common::create_test_app_state().await;
    common::create_user(&app_state, "admin@example.com", "all").await;

    let body = format!("email=admin%40example.com&password={}", common::TEST_PASSWORD);
    let response = common::post_form(&app_state, "/login", None, body).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/user"
    );
    let cookie = common::session_cookie(&response).unwrap();

    let response = common::get(&app_state, "/admin/user", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_form_login_failure_flashes_warning() {
    let app_state = common::create_test_app_state().await;

    let body = "email=ghost%40example.com&password=whatever1".to_string();
    let response = common::post_form(&app_state, "/login", None, body).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    let cookie = common::session_cookie(&response).unwrap();

    let page = common::get(&app_state, "/login", Some(&cookie)).await;
    let html = common::body_string(page).await;
    assert!(html.contains("Invalid email or password"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app_state = common::create_test_app_state().await;
    let cookie = common::create_and_login(&app_state, "admin@example.com", "all").await;

    let response = common::get(&app_state, "/admin/user", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = common::post_form(&app_state, "/logout", Some(&cookie), String::new()).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    let response = common::get(&app_state, "/admin/user", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
