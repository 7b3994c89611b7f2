//! Data source selection for CLI commands.

use crate::config::Settings;
use anyhow::{Context, Result};
use roic::fmp::FmpClient;
use roic::{FundamentalsSource, InMemorySource};
use std::path::Path;
use std::sync::Arc;

/// Opens the data source for this invocation.
///
/// A `--data` file takes precedence; otherwise fundamentals come from FMP
/// with the configured key, falling back to `FMP_API_KEY`.
pub(crate) fn open_source(
    data: Option<&Path>,
    settings: &Settings,
) -> Result<Arc<dyn FundamentalsSource>> {
    if let Some(path) = data {
        let source = InMemorySource::from_path(path)
            .with_context(|| format!("failed to load fundamentals from {}", path.display()))?;
        tracing::info!(path = %path.display(), symbols = source.len(), "using local fundamentals");
        return Ok(Arc::new(source));
    }

    let client = match settings.api_key() {
        Some(key) => FmpClient::new(key),
        None => FmpClient::from_env()
            .context("no data source: pass --data or set ROIC_FMP_API_KEY / FMP_API_KEY")?,
    };
    Ok(Arc::new(client))
}
