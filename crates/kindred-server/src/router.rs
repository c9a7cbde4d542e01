//! Router construction and the server entry point

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use kindred_storage::StorageBackend;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handlers::{self, AppState};

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the API router over a storage backend
pub fn create_router<S: StorageBackend + 'static>(storage: Arc<S>, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState::new(storage, config.passcode_cost));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/trees", post(handlers::create_tree::<S>))
        .route("/api/trees/:id/verify", post(handlers::verify_tree::<S>))
        .route(
            "/api/trees/:id/members",
            get(handlers::list_members::<S>).post(handlers::create_member::<S>),
        )
        .route(
            "/api/trees/:tree_id/members/:member_id",
            put(handlers::update_member::<S>).delete(handlers::delete_member::<S>),
        )
        .route(
            "/api/trees/:id/relationships",
            get(handlers::list_relationships::<S>).post(handlers::create_relationship::<S>),
        )
        .route(
            "/api/trees/:tree_id/relationships/:rel_id",
            delete(handlers::delete_relationship::<S>),
        )
        .route(
            "/api/trees/:id/relationship-path",
            get(handlers::relationship_path::<S>),
        )
        .with_state(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(RequestBodyLimitLayer::new(config.body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until interrupted
pub async fn run_server<S: StorageBackend + 'static>(
    storage: Arc<S>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    storage.initialize().await?;
    let router = create_router(storage.clone(), &config);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("Kindred server listening on {}", config.bind);
    tracing::info!("  API: http://{}/api/trees", config.bind);
    tracing::info!("  Health check: http://{}/health", config.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close().await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
