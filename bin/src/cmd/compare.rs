//! Compare command implementation.

use super::{OutputFormat, banner, billions, or_na, pct, section, to_json};
use anyhow::Result;
use roic::quality::{Comparison, MAX_COMPARE_SYMBOLS};
use roic::{FundamentalsSource, QualityCalculator};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
struct CompareReport {
    #[serde(flatten)]
    comparison: Comparison,
    skipped: Vec<String>,
}

async fn gather(
    source: &dyn FundamentalsSource,
    calculator: &QualityCalculator,
    symbols: &[String],
    periods: u32,
) -> Result<CompareReport> {
    let batch = calculator
        .analyse_symbols(source, symbols, periods, MAX_COMPARE_SYMBOLS)
        .await?;
    Ok(CompareReport {
        comparison: batch.comparison(),
        skipped: batch.skipped,
    })
}

/// Rank `symbols` by combined quality and valuation score.
///
/// Symbols the source does not know or cannot fetch are skipped with a
/// warning; any other failure aborts the comparison.
pub(crate) async fn run(
    source: &dyn FundamentalsSource,
    calculator: &QualityCalculator,
    symbols: &[String],
    periods: u32,
    format: OutputFormat,
) -> Result<()> {
    let report = gather(source, calculator, symbols, periods).await?;
    let output = match format {
        OutputFormat::Text => render(&report),
        OutputFormat::Json => to_json(&report)?,
    };
    println!("{output}");
    Ok(())
}

fn render(report: &CompareReport) -> String {
    let mut out = banner("ROIC Comparison");

    out.push_str(&section("RANKING (60% quality, 40% valuation)"));
    let _ = writeln!(
        out,
        "{:<5} {:<10} {:>9} {:>8} {:>8} {:>10} {:>9}",
        "Rank", "Symbol", "ROIC", "Quality", "P/E", "Mkt Cap", "Combined"
    );
    let _ = writeln!(out, "{}", "─".repeat(65));
    for (rank, row) in report.comparison.rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<5} {:<10} {:>9} {:>8} {:>8} {:>10} {:>9}",
            rank + 1,
            row.symbol,
            pct(row.roic),
            row.quality_score
                .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
            or_na(row.pe_ratio, 1),
            billions(row.market_cap),
            or_na(row.combined_score, 1),
        );
    }

    if let Some(best) = &report.comparison.best_overall {
        let _ = writeln!(out, "\nBest overall: {best}");
    }
    if !report.skipped.is_empty() {
        let _ = writeln!(out, "Skipped:      {}", report.skipped.join(", "));
    }
    out
}
