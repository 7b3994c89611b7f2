//! History command implementation.

use super::{OutputFormat, banner, or_na, section, to_json};
use anyhow::{Context, Result};
use roic::quality::{ExportFormat, RoicHistory, RoicTrend};
use roic::{FundamentalsSource, QualityCalculator};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Serialize)]
struct HistoryReport<'a> {
    #[serde(flatten)]
    history: &'a RoicHistory,
    trend: Option<RoicTrend>,
}

/// Show or export up to `years` annual periods of ROIC for `symbol`.
pub(crate) async fn run(
    source: &dyn FundamentalsSource,
    calculator: &QualityCalculator,
    symbol: &str,
    years: u32,
    export: Option<ExportFormat>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let company = source.company(symbol, years).await?;
    let history = calculator.history(&company)?;

    if let Some(export) = export {
        match output {
            Some(path) => {
                history
                    .export_to_path(path, export)
                    .with_context(|| format!("failed to export to {}", path.display()))?;
                eprintln!(
                    "Exported {} period(s) for {} to {}",
                    history.rows.len(),
                    history.symbol,
                    path.display()
                );
            }
            None => history.export(&mut std::io::stdout().lock(), export)?,
        }
        return Ok(());
    }

    let output = match format {
        OutputFormat::Text => render(&history),
        OutputFormat::Json => to_json(&HistoryReport {
            history: &history,
            trend: history.trend(),
        })?,
    };
    println!("{output}");
    Ok(())
}

fn render(history: &RoicHistory) -> String {
    let mut out = banner("Historical ROIC");
    let _ = writeln!(out, "Symbol: {}\n", history.symbol);

    if history.is_empty() {
        let _ = writeln!(out, "No annual statements available");
        return out;
    }

    out.push_str(&section("ANNUAL"));
    let _ = writeln!(
        out,
        "{:<6} {:>14} {:>14} {:>9} {:>9} {:>9}",
        "Year", "Revenue", "Op. Income", "ROIC %", "Margin %", "Turnover"
    );
    let _ = writeln!(out, "{}", "─".repeat(66));
    for row in &history.rows {
        let _ = writeln!(
            out,
            "{:<6} {:>14} {:>14} {:>9} {:>9} {:>9}",
            row.year.map_or_else(|| "N/A".to_string(), |y| y.to_string()),
            or_na(row.revenue, 0),
            or_na(row.operating_income, 0),
            or_na(row.roic, 2),
            or_na(row.profit_margin, 1),
            or_na(row.asset_turnover, 2),
        );
    }
    out.push('\n');

    out.push_str(&section("TREND"));
    match history.trend() {
        Some(trend) => {
            let _ = writeln!(out, "Average ROIC:  {:.2}%", trend.average);
            let _ = writeln!(out, "Latest ROIC:   {:.2}%", trend.latest);
            let _ = writeln!(
                out,
                "Change:        {:+.2} pts over {} year(s) ({})",
                trend.change, trend.years, trend.direction
            );
            let _ = writeln!(out, "Consistency:   {:.0}% of years above 20%", trend.consistency);
            let _ = writeln!(out, "Assessment:    {}", trend.assessment);
        }
        None => {
            let _ = writeln!(out, "No year with a computable ROIC");
        }
    }
    out
}
