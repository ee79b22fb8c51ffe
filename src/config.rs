use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub server_address: String,
    pub database_url: String,
    pub environment: String,
    pub listing: ListingSettings,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Defaults for admin listing pages.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ListingSettings {
    pub records_per_page: i64,
    pub max_records_per_page: i64,
    pub filter_by: String,
}

/// Account created at startup when no user owns `email` yet.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let env = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Local overrides, never committed
            .add_source(File::with_name("config/local").required(false))
            // BACKOFFICE_SERVER_ADDRESS, BACKOFFICE_LISTING__RECORDS_PER_PAGE, ...
            .add_source(
                Environment::with_prefix("BACKOFFICE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

        Ok(s.try_deserialize()?)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:3000".to_string(),
            database_url: "sqlite:data/backoffice.db".to_string(),
            environment: "development".to_string(),
            listing: ListingSettings::default(),
            bootstrap_admin: None,
        }
    }
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            records_per_page: 10,
            max_records_per_page: 100,
            filter_by: "email".to_string(),
        }
    }
}
