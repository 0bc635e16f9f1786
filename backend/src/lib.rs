//! # Expense Tracker Backend
//!
//! Server side of the expense tracker. One process serves two surfaces over
//! the same persisted expense sheet:
//!
//! - **Sheet surface** (`/exec`): `action=read|create|update|delete` requests
//!   authenticated by a shared `apiKey`, answering `{status, ...}` envelopes.
//! - **REST surface** (`/api/...`): JSON resources behind a password login
//!   and session cookie; failures are `{error}` bodies with non-2xx codes.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (rest/*_apis.rs, sheet/sheet_apis.rs)
//!     ↓
//! Domain Layer (services, commands, models)
//!     ↓
//! Storage Layer (CSV sheets, write lock)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{CalendarService, ExpenseService, PayeeService, SessionService, StatisticsService};
use crate::io::{rest, sheet};
use crate::storage::{CsvConnection, WriteLock};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub expense_service: ExpenseService<CsvConnection>,
    pub payee_service: PayeeService<CsvConnection>,
    pub calendar_service: CalendarService,
    pub statistics_service: StatisticsService,
    pub session_service: SessionService,
    pub settings: Arc<AppConfig>,
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: AppConfig) -> Result<AppState> {
    info!("Setting up CSV storage in {}", config.data_dir.display());
    let connection = Arc::new(CsvConnection::new(&config.data_dir)?);
    connection.ensure_expenses_file_exists()?;
    connection.ensure_payees_file_exists()?;

    info!("Setting up domain model");
    let write_lock = WriteLock::new(config.lock_timeout());
    let expense_service = ExpenseService::new(connection.clone(), write_lock.clone());
    let payee_service = PayeeService::new(connection, write_lock);
    let session_service = SessionService::new(config.app_password.clone());

    Ok(AppState {
        expense_service,
        payee_service,
        calendar_service: CalendarService::new(),
        statistics_service: StatisticsService::new(),
        session_service,
        settings: Arc::new(config),
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = match app_state.settings.cors_origin.as_deref().map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => CorsLayer::new().allow_origin(origin).allow_credentials(true),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS_ORIGIN: {}", e);
            CorsLayer::new().allow_origin(Any)
        }
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers([axum::http::header::CONTENT_TYPE]);

    let protected_routes = Router::new()
        .nest("/expenses", rest::expense_apis::router())
        .nest("/payees", rest::payee_apis::router())
        .nest("/import", rest::exchange_apis::import_router())
        .nest("/export", rest::exchange_apis::export_router())
        .route("/statistics", get(rest::statistics_apis::get_statistics))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            rest::auth_apis::require_session,
        ));

    let api_routes = Router::new()
        .merge(protected_routes)
        .merge(rest::auth_apis::router());

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/exec", get(sheet::sheet_apis::handle_get).post(sheet::sheet_apis::handle_post));

    if let Some(static_dir) = app_state.settings.static_dir.clone() {
        info!("Serving static files from {}", static_dir.display());
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    pub const TEST_API_KEY: &str = "test-key";
    pub const TEST_PASSWORD: &str = "test-password";

    /// App state over a temporary data directory; keep the `TempDir` alive
    pub async fn test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: temp_dir.path().to_path_buf(),
            api_key: TEST_API_KEY.to_string(),
            app_password: TEST_PASSWORD.to_string(),
            lock_timeout_ms: 500,
            ..AppConfig::default()
        };
        let state = initialize_backend(config).await.unwrap();
        (state, temp_dir)
    }
}
