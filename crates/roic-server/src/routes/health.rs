//! Service information and liveness.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::AppState;

/// Response for `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Active data source.
    pub provider: String,
    /// Route templates by name.
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: &'static str,
    /// Active data source.
    pub provider: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
}

/// Service information: `GET /`
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    let endpoints = BTreeMap::from([
        ("roic_metrics", "/api/v1/roic/metrics/:symbol"),
        ("roic_forecast", "/api/v1/roic/forecast/:symbol"),
        ("complete_analysis", "/api/v1/analysis/complete/:symbol"),
        ("compare", "/api/v1/analysis/compare"),
        ("mcp", "/mcp/"),
        ("health", "/health"),
    ]);

    Json(ServiceInfo {
        name: "ROIC Quality Service",
        version: env!("CARGO_PKG_VERSION"),
        description: "Return on invested capital, quality classification and forecasts",
        provider: state.provider().to_string(),
        endpoints,
    })
}

/// Liveness probe: `GET /health`
///
/// Returns 200 if the server is running.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        provider: state.provider().to_string(),
        uptime_secs: state.uptime_secs(),
    })
}
