//! Slate Server - Script Breakdown Backend
//!
//! A standalone Rust backend for the Slate script-breakdown platform:
//! - RESTful HTTP API via axum
//! - SQLite checkpoint storage with rusqlite
//! - Analysis workflow driven by an Anthropic-compatible generation API
//!
//! This crate can be used standalone or embedded in other applications.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use slate_core::agents::{Generator, HttpGenerator};
use slate_core::db::Database;
use slate_core::state::{AppState, AppStateInner};

/// Configuration for the Slate backend server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    /// Optional path to static frontend files. When set, the server serves
    /// these files for all non-API routes.
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            db_path: "slate.db".to_string(),
            static_dir: None,
        }
    }
}

/// Create a shared `AppState` from a database path, using the generation
/// backend configured through the environment.
pub async fn create_app_state(db_path: &str) -> Result<AppState, String> {
    let db = Database::open(db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    let generator: Arc<dyn Generator> = Arc::new(HttpGenerator::from_env());
    Ok(Arc::new(AppStateInner::new(db, generator)))
}

/// Start the backend server.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(config: ServerConfig) -> Result<SocketAddr, String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slate_server=info,tower_http=info".into()),
        )
        .init();

    tracing::info!(
        "Starting Slate backend server on {}:{}",
        config.host,
        config.port
    );

    let state = create_app_state(&config.db_path).await?;

    start_server_with_state(config, state).await
}

/// Start the HTTP server with a pre-built `AppState`.
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let app = build_router(state, config.static_dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("Slate backend server listening on {}", local_addr);

    // Spawn the server in a background task
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

/// Build the full application router.
pub fn build_router(state: AppState, static_dir: Option<&str>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .merge(api::api_router())
        .route("/health", axum::routing::get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(static_dir) = static_dir {
        let static_path = std::path::Path::new(static_dir);
        if static_path.exists() && static_path.is_dir() {
            tracing::info!("Serving static frontend from: {}", static_dir);
            let serve_dir = tower_http::services::ServeDir::new(static_dir)
                .not_found_service(tower_http::services::ServeFile::new(
                    static_path.join("index.html"),
                ));
            app = app.fallback_service(serve_dir);
        } else {
            tracing::warn!(
                "Static directory not found: {}. Frontend won't be served.",
                static_dir
            );
        }
    }

    app
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "status": "healthy",
        "message": "Script analysis API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
