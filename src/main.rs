use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backoffice::{
    admin::AdminUserRepository, config::AppConfig, create_router, database::Database, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::load()?);
    info!("Configuration loaded for {} environment", config.environment);

    let db = Arc::new(Database::new(&config.database_url).await?);
    info!("Database initialized successfully");

    db.migrate().await?;
    info!("Database migrations completed");

    if let Some(bootstrap) = &config.bootstrap_admin {
        let created = AdminUserRepository::new(db.clone())
            .ensure_bootstrap_admin(&bootstrap.email, &bootstrap.password)
            .await?;
        if !created {
            info!("Bootstrap admin already present");
        }
    }

    let app = create_router(AppState::new(db, config.clone()));

    let listener = TcpListener::bind(&config.server_address).await?;
    info!("Server starting on {}", config.server_address);

    axum::serve(listener, app).await?;

    Ok(())
}
