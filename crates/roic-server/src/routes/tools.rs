//! Tool-call protocol for chat agents.
//!
//! Agents discover tools with `GET /mcp/tools/list` and invoke them with
//! `POST /mcp/tools/call`. Results are plain-text content blocks; failures
//! are reported in the body with code `-32603`, never as an HTTP error.

use axum::Json;
use axum::extract::State;
use roic_quality::AnalysisBatch;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt::Write as _;

use super::analysis::load_many;
use super::roic::{load_forecast, load_metrics};
use crate::error::AppError;
use crate::state::AppState;

/// JSON-RPC internal error code used for every tool failure.
pub const INTERNAL_ERROR_CODE: i32 = -32603;

/// Most symbols accepted by `roic_compare`.
pub const MAX_TOOL_COMPARE_SYMBOLS: usize = 5;

/// Body of `POST /mcp/tools/call`.
#[derive(Debug, Deserialize)]
pub struct ToolCall {
    /// Protocol method, `tools/call`.
    pub method: String,
    /// Tool name and arguments.
    #[serde(default)]
    pub params: ToolParams,
}

/// Tool name and arguments.
#[derive(Debug, Default, Deserialize)]
pub struct ToolParams {
    /// Tool to invoke.
    pub name: Option<String>,
    /// Tool arguments.
    #[serde(default)]
    pub arguments: Value,
}

/// One block of tool output.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentBlock {
    /// Always `text`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Rendered output.
    pub text: String,
}

/// Failure details.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
}

/// Response of `POST /mcp/tools/call`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ToolResponse {
    /// Successful call.
    Content {
        /// Output blocks.
        content: Vec<ContentBlock>,
    },
    /// Failed call.
    Error {
        /// Failure details.
        error: ToolError,
    },
}

impl ToolResponse {
    fn text(text: String) -> Self {
        Self::Content {
            content: vec![ContentBlock {
                kind: "text".into(),
                text,
            }],
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: ToolError {
                code: INTERNAL_ERROR_CODE,
                message: message.into(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SymbolArgs {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct ForecastArgs {
    symbol: String,
    #[serde(default)]
    years: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompareArgs {
    symbols: Vec<String>,
}

fn args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T, AppError> {
    serde_json::from_value(arguments)
        .map_err(|e| AppError::BadRequest(format!("invalid arguments: {e}")))
}

fn or_na(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.decimals$}"))
}

fn schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Capabilities: `GET /mcp/`
pub async fn capabilities() -> Json<Value> {
    Json(json!({
        "name": "ROIC Quality Tools",
        "version": env!("CARGO_PKG_VERSION"),
        "protocol_version": "0.1.0",
        "capabilities": {
            "tools": true,
            "resources": false,
            "prompts": false
        }
    }))
}

/// Tool catalogue: `GET /mcp/tools/list`
pub async fn list() -> Json<Value> {
    let symbol = json!({ "type": "string", "description": "Stock symbol (e.g., AAPL)" });
    Json(json!({
        "tools": [
            {
                "name": "roic_quality",
                "description": "Get ROIC quality metrics for a stock symbol",
                "inputSchema": schema(json!({ "symbol": symbol }), &["symbol"]),
            },
            {
                "name": "roic_forecast",
                "description": "Get quality-based price forecast for a stock",
                "inputSchema": schema(json!({
                    "symbol": symbol,
                    "years": { "type": "integer", "description": "Forecast years (1-5)", "default": 3 }
                }), &["symbol"]),
            },
            {
                "name": "roic_compare",
                "description": "Compare ROIC metrics for multiple stocks",
                "inputSchema": schema(json!({
                    "symbols": {
                        "type": "array",
                        "items": { "type": "string" },
                        "maxItems": MAX_TOOL_COMPARE_SYMBOLS,
                        "description": "Stock symbols to compare"
                    }
                }), &["symbols"]),
            },
            {
                "name": "complete_analysis",
                "description": "Get quality and valuation analysis for a stock",
                "inputSchema": schema(json!({ "symbol": symbol }), &["symbol"]),
            }
        ]
    }))
}

/// Tool invocation: `POST /mcp/tools/call`
pub async fn call(State(state): State<AppState>, Json(call): Json<ToolCall>) -> Json<ToolResponse> {
    if call.method != "tools/call" {
        return Json(ToolResponse::error(format!("Unsupported method: {}", call.method)));
    }
    let name = call.params.name.unwrap_or_default();
    tracing::debug!(tool = %name, "tool call");

    let result = match name.as_str() {
        "roic_quality" => quality_text(&state, call.params.arguments).await,
        "roic_forecast" => forecast_text(&state, call.params.arguments).await,
        "roic_compare" => compare_text(&state, call.params.arguments).await,
        "complete_analysis" => complete_text(&state, call.params.arguments).await,
        other => Err(AppError::BadRequest(format!("Unknown tool: {other}"))),
    };

    Json(match result {
        Ok(text) => ToolResponse::text(text),
        Err(e) => {
            tracing::warn!(tool = %name, error = %e, "tool call failed");
            ToolResponse::error(e.to_string())
        }
    })
}

async fn quality_text(state: &AppState, arguments: Value) -> Result<String, AppError> {
    let SymbolArgs { symbol } = args(arguments)?;
    let metrics = load_metrics(state, &symbol).await?;
    let a = &metrics.data;
    Ok(format!(
        "ROIC Metrics for {}:\n• ROIC: {}%\n• Quality Score: {}/100\n• Moat Rating: {}\n• Implied Growth: {:.1}%",
        metrics.symbol,
        or_na(a.roic, 2),
        a.quality_score.map_or_else(|| "N/A".to_string(), |s| s.to_string()),
        a.moat_rating,
        a.implied_growth_rate,
    ))
}

async fn forecast_text(state: &AppState, arguments: Value) -> Result<String, AppError> {
    let ForecastArgs { symbol, years } = args(arguments)?;
    let response = load_forecast(state, &symbol, years).await?;
    let forecast = &response.data;

    let mut text = format!("Quality-Based Forecast for {}:\n", response.symbol);
    match &forecast.projection {
        Some(projection) => {
            for point in &projection.points {
                let _ = writeln!(text, "• {} Year: ${:.2}", point.year, point.price);
            }
        }
        None => text.push_str("• No current price available\n"),
    }
    let _ = write!(
        text,
        "• Blended Growth: {:.1}%\n• Thesis: {}",
        forecast.growth.rate, forecast.thesis
    );
    Ok(text)
}

async fn compare_text(state: &AppState, arguments: Value) -> Result<String, AppError> {
    let CompareArgs { symbols } = args(arguments)?;
    let AnalysisBatch {
        mut analyses,
        skipped,
    } = load_many(state, &symbols, MAX_TOOL_COMPARE_SYMBOLS).await?;
    // Best quality first, unknown quality last.
    analyses.sort_by_key(|a| std::cmp::Reverse(a.assessment.quality_score));

    let mut text = String::from("ROIC Comparison:\n");
    for a in &analyses {
        let _ = writeln!(
            text,
            "• {}: ROIC {}%, Quality {}/100",
            a.symbol,
            or_na(a.assessment.roic, 1),
            a.assessment
                .quality_score
                .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
        );
    }
    if let Some(best) = analyses.first().filter(|a| a.assessment.quality_score.is_some()) {
        let _ = write!(text, "\nBest Quality: {}", best.symbol);
    }
    if !skipped.is_empty() {
        let _ = write!(text, "\nSkipped: {}", skipped.join(", "));
    }
    Ok(text)
}

async fn complete_text(state: &AppState, arguments: Value) -> Result<String, AppError> {
    let SymbolArgs { symbol } = args(arguments)?;
    let analysis = super::analysis::load_analysis(state, &symbol).await?;
    let market = &analysis.market;
    Ok(format!(
        "Analysis for {}:\n• P/E Ratio: {}\n• Market Cap: {}\n\nROIC Analysis:\n• ROIC: {}%\n• Quality: {}/100\n• 1Y Target: {}\n• Combined Score: {}",
        analysis.symbol,
        or_na(market.pe_ratio, 1),
        market
            .market_cap
            .map_or_else(|| "N/A".to_string(), |m| format!("${:.1}B", m / 1e9)),
        or_na(analysis.assessment.roic, 2),
        analysis
            .assessment
            .quality_score
            .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
        analysis
            .target_1y
            .map_or_else(|| "N/A".to_string(), |t| format!("${t:.2}")),
        or_na(analysis.combined_score, 1),
    ))
}
