//! OCR Gateway Server Library
//!
//! Exposes the router and the OCR pipeline so the binary and the
//! integration tests build the same application.
//!
//! # Modules
//!
//! - `ocr`: upload validation, backend submission, polling and result transforms
//! - `routes`: HTTP endpoints
//! - `config`: environment configuration

pub mod config;
pub mod error;
pub mod ocr;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let server = state.server_config().clone();

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(routes::health::router())
        .nest("/ocr", routes::ocr::router(server.max_upload_bytes));

    if let Some(assets_dir) = &server.assets_dir {
        tracing::info!("Serving sample assets from {}", assets_dir.display());
        router = router.nest_service("/assets", ServeDir::new(assets_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
