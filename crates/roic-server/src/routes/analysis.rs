//! Complete analysis and multi-symbol comparison.

use axum::Json;
use axum::extract::{Path, State};
use roic_quality::{
    AnalysisBatch, Comparison, CompleteAnalysis, MAX_COMPARE_SYMBOLS, normalise_symbol,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

/// Response for `GET /api/v1/analysis/complete/:symbol`.
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    /// Data source name.
    pub provider: String,
    /// Analysis.
    #[serde(flatten)]
    pub analysis: CompleteAnalysis,
}

/// Body of `POST /api/v1/analysis/compare`.
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    /// Symbols to compare.
    pub symbols: Vec<String>,
}

/// Response for `POST /api/v1/analysis/compare`.
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    /// Data source name.
    pub provider: String,
    /// Ranked rows and the best symbol.
    #[serde(flatten)]
    pub comparison: Comparison,
    /// Symbols that could not be analysed.
    pub skipped: Vec<String>,
}

pub(crate) async fn load_analysis(state: &AppState, symbol: &str) -> AppResult<CompleteAnalysis> {
    let symbol = normalise_symbol(symbol)?;
    let company = state.company(&symbol).await?;
    Ok(state.calculator().complete_analysis(&company)?)
}

/// Analyses up to `limit` distinct symbols through the shared comparison
/// rules.
pub(crate) async fn load_many(
    state: &AppState,
    symbols: &[String],
    limit: usize,
) -> AppResult<AnalysisBatch> {
    Ok(state
        .calculator()
        .analyse_symbols(state.source(), symbols, state.periods(), limit)
        .await?)
}

/// Quality plus valuation: `GET /api/v1/analysis/complete/:symbol`
pub async fn complete(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> AppResult<Json<CompleteResponse>> {
    let analysis = load_analysis(&state, &symbol).await?;
    Ok(Json(CompleteResponse {
        provider: state.provider().to_string(),
        analysis,
    }))
}

/// Ranked comparison: `POST /api/v1/analysis/compare`
pub async fn compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> AppResult<Json<CompareResponse>> {
    let batch = load_many(&state, &request.symbols, MAX_COMPARE_SYMBOLS).await?;
    Ok(Json(CompareResponse {
        provider: state.provider().to_string(),
        comparison: batch.comparison(),
        skipped: batch.skipped,
    }))
}
