use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::handlers::{self, AppState};
use crate::keypair::KeyPair;
use crate::rsa_service::RsaService;

/// Build the router (exported for testing).
pub fn router(keys: Arc<KeyPair>) -> Router {
    let state = Arc::new(AppState::new(RsaService::new(keys)));

    // Browser clients call this service from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/public-key", get(handlers::get_public_key))
        .route("/encrypt", post(handlers::encrypt))
        .route("/decrypt", post(handlers::decrypt))
        .route("/sign", post(handlers::sign))
        .route("/stats", get(handlers::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the four operations until the listener fails.
pub async fn run(config: &ServiceConfig, keys: Arc<KeyPair>) -> std::io::Result<()> {
    let app = router(keys);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("RSA operations service listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await
}
