//! HTTP service exposing ROIC quality analysis.
//!
//! # Routes
//!
//! - `GET /` - Service information
//! - `GET /health` - Liveness probe
//! - `GET /api/v1/roic/metrics/:symbol` - Quality assessment
//! - `GET /api/v1/roic/forecast/:symbol?years=N` - Quality forecast
//! - `GET /api/v1/analysis/complete/:symbol` - Quality plus valuation
//! - `POST /api/v1/analysis/compare` - Ranked comparison
//! - `GET /mcp/`, `GET /mcp/tools/list`, `POST /mcp/tools/call` - Tool calls
//!   for chat agents
//!
//! Handlers are thin: they fetch through the [`AppState`]'s data source and
//! delegate every computation to [`roic_quality::QualityCalculator`].

#![warn(missing_docs)]

pub mod error;
pub mod routes;
pub mod state;

pub use error::{AppError, AppResult};
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{analysis, health, roic, tools};

/// Create the Axum application with all routes.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        // Service endpoints
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Quality endpoints
        .route("/api/v1/roic/metrics/:symbol", get(roic::metrics))
        .route("/api/v1/roic/forecast/:symbol", get(roic::forecast))
        .route("/api/v1/analysis/complete/:symbol", get(analysis::complete))
        .route("/api/v1/analysis/compare", post(analysis::compare))
        // Tool-call protocol
        .route("/mcp/", get(tools::capabilities))
        .route("/mcp/tools/list", get(tools::list))
        .route("/mcp/tools/call", post(tools::call))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("ROIC server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
