use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::warn;

pub mod admin;
pub mod auth;
pub mod config;
pub mod database;
pub mod flash;
pub mod listing;
pub mod models;

pub use config::AppConfig;
pub use database::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<AppConfig>,
    /// Shared by every router built from this state.
    pub sessions: MemoryStore,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Arc<AppConfig>) -> Self {
        Self {
            db,
            config,
            sessions: MemoryStore::default(),
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(app_state.sessions.clone())
        .with_secure(app_state.config.is_production())
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    Router::new()
        .route("/", get(|| async { Redirect::to(auth::handlers::HOME_PATH) }))
        .route("/health", get(health_handler))
        .route(
            "/login",
            get(auth::login_handler).post(auth::login_form_submit),
        )
        .route("/logout", post(auth::logout_user))
        .route("/api/auth/login", post(auth::login_user))
        .merge(admin::admin_routes())
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(session_layer)
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
}

async fn health_handler(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    match state.db.health_check().await {
        Ok(_) => Ok("OK"),
        Err(e) => {
            warn!("Health check failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
