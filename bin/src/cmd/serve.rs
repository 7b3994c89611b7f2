//! Serve command implementation.

use anyhow::{Context, Result};
use roic::server::{AppState, run_server};
use roic::{FundamentalsSource, QualityCalculator};
use std::sync::Arc;

/// Run the HTTP service until the process is stopped.
pub(crate) async fn run(
    source: Arc<dyn FundamentalsSource>,
    calculator: QualityCalculator,
    host: &str,
    port: u16,
    periods: u32,
) -> Result<()> {
    let addr = tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("cannot resolve {host}:{port}"))?
        .next()
        .with_context(|| format!("no address for {host}:{port}"))?;

    tracing::info!(provider = source.name(), %addr, "starting ROIC server");
    let state = AppState::new(source, calculator).with_periods(periods);
    run_server(addr, state)
        .await
        .with_context(|| format!("server on {addr} failed"))
}
