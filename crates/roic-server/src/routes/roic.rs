//! Quality metrics and forecast endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use roic_quality::{QualityForecast, normalise_symbol};
use roic_traits::{Date, QualityAssessment};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Forecast horizon when none is requested.
pub const DEFAULT_FORECAST_YEARS: u32 = 3;

/// Longest forecast horizon served.
pub const MAX_FORECAST_YEARS: u32 = 5;

/// Response for `GET /api/v1/roic/metrics/:symbol`.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    /// Upper-cased symbol.
    pub symbol: String,
    /// Data source name.
    pub provider: String,
    /// End of the period the assessment is based on.
    pub period_ending: Option<Date>,
    /// Quality assessment.
    pub data: QualityAssessment,
    /// ROIC relative to a 20% benchmark.
    pub capital_efficiency: Option<f64>,
}

/// Query string for the forecast endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    /// Horizon in years, 1 to 5.
    pub years: Option<u32>,
}

/// Response for `GET /api/v1/roic/forecast/:symbol`.
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    /// Upper-cased symbol.
    pub symbol: String,
    /// Horizon in years.
    pub years: u32,
    /// Data source name.
    pub provider: String,
    /// Forecast.
    pub data: QualityForecast,
}

/// Validates a requested horizon, defaulting to three years.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] outside `1..=5`.
pub fn forecast_years(years: Option<u32>) -> AppResult<u32> {
    match years.unwrap_or(DEFAULT_FORECAST_YEARS) {
        y @ 1..=MAX_FORECAST_YEARS => Ok(y),
        y => Err(AppError::BadRequest(format!(
            "years must be between 1 and {MAX_FORECAST_YEARS}, got {y}"
        ))),
    }
}

pub(crate) async fn load_metrics(state: &AppState, symbol: &str) -> AppResult<MetricsResponse> {
    let symbol = normalise_symbol(symbol)?;
    let company = state.company(&symbol).await?;
    let calc = state.calculator();
    let snapshot = company.latest_snapshot(calc.tax_rate())?;
    let data = calc.assess(&snapshot);

    Ok(MetricsResponse {
        symbol,
        provider: state.provider().to_string(),
        period_ending: snapshot.period_ending(),
        capital_efficiency: data.capital_efficiency(),
        data,
    })
}

pub(crate) async fn load_forecast(
    state: &AppState,
    symbol: &str,
    years: Option<u32>,
) -> AppResult<ForecastResponse> {
    let years = forecast_years(years)?;
    let symbol = normalise_symbol(symbol)?;
    let company = state.company(&symbol).await?;
    let data = state.calculator().forecast(&company, years)?;

    Ok(ForecastResponse {
        symbol,
        years,
        provider: state.provider().to_string(),
        data,
    })
}

/// Quality metrics: `GET /api/v1/roic/metrics/:symbol`
pub async fn metrics(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> AppResult<Json<MetricsResponse>> {
    load_metrics(&state, &symbol).await.map(Json)
}

/// Quality forecast: `GET /api/v1/roic/forecast/:symbol?years=N`
pub async fn forecast(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<ForecastResponse>> {
    load_forecast(&state, &symbol, query.years).await.map(Json)
}
