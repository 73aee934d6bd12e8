pub mod auth;
pub mod chat;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpResponse;

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

pub use auth::{AuthService, AuthedUser};
pub use chat::ChatService;
pub use completion::CompletionClient;
pub use db::{Message, PgStore, Store, User};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_service: Arc<AuthService>,
    pub chat_service: Arc<ChatService>,
}

impl AppState {
    /// Connects to Postgres, runs migrations, and wires up the services.
    pub async fn new(config: Settings) -> Result<Self> {
        let store = PgStore::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(5),
        )
        .await?;
        store.run_migrations().await?;
        let store: Arc<dyn Store> = Arc::new(store);

        let auth_service = Arc::new(AuthService::new(
            store.clone(),
            config.auth.jwt_secret.clone(),
            config.auth.access_token_ttl_minutes,
        ));

        let completion = CompletionClient::new(&config.completion)
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        let chat_service = Arc::new(ChatService::new(store, completion));

        Ok(Self {
            config: Arc::new(config),
            auth_service,
            chat_service,
        })
    }
}
