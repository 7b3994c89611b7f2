//! Forecast command implementation.

use super::{OutputFormat, banner, money, or_na, pct, score, section, to_json};
use anyhow::Result;
use roic::quality::{GrowthSource, QualityForecast};
use roic::{FundamentalsSource, QualityCalculator};
use std::fmt::Write as _;

/// Build the quality-based forecast for `symbol` over `years`.
pub(crate) async fn run(
    source: &dyn FundamentalsSource,
    calculator: &QualityCalculator,
    symbol: &str,
    years: u32,
    periods: u32,
    format: OutputFormat,
) -> Result<()> {
    let company = source.company(symbol, periods).await?;
    let forecast = calculator.forecast(&company, years)?;

    let output = match format {
        OutputFormat::Text => render(&forecast, years),
        OutputFormat::Json => to_json(&forecast)?,
    };
    println!("{output}");
    Ok(())
}

const fn source_label(source: GrowthSource) -> &'static str {
    match source {
        GrowthSource::Quality => "ROIC quality",
        GrowthSource::Analyst => "Analyst target",
        GrowthSource::Historical => "Revenue CAGR (capped)",
    }
}

fn render(forecast: &QualityForecast, years: u32) -> String {
    let a = &forecast.assessment;
    let mut out = banner("Quality-Based Forecast");

    let _ = writeln!(out, "Symbol:         {}", forecast.symbol);
    let _ = writeln!(out, "Current Price:  {}", money(forecast.current_price));
    let _ = writeln!(out, "Analyst Target: {}", money(forecast.analyst_target));
    let _ = writeln!(out, "Horizon:        {years} year(s)\n");

    out.push_str(&section("QUALITY"));
    let _ = writeln!(out, "ROIC:               {}", pct(a.roic));
    let _ = writeln!(out, "Quality Score:      {}", score(a.quality_score));
    let _ = writeln!(out, "Moat Rating:        {}", a.moat_rating);
    let _ = writeln!(
        out,
        "Capital Efficiency: {}x",
        or_na(forecast.capital_efficiency, 2)
    );
    let _ = writeln!(out, "Revenue CAGR:       {}\n", pct(forecast.revenue_cagr));

    out.push_str(&section("GROWTH"));
    if forecast.growth.is_default() {
        let _ = writeln!(out, "No growth inputs available, using the default rate");
    }
    for factor in &forecast.growth.factors {
        let _ = writeln!(out, "  {:<24} {:>7.1}%", source_label(factor.source), factor.rate);
    }
    let _ = writeln!(out, "  {:<24} {:>7.1}%\n", "Blended", forecast.growth.rate);

    out.push_str(&section("PROJECTION"));
    match &forecast.projection {
        Some(projection) => {
            let _ = writeln!(out, "{:<8} {:>12} {:>12}", "Year", "Price", "Return");
            let _ = writeln!(out, "{}", "─".repeat(34));
            for point in &projection.points {
                let _ = writeln!(
                    out,
                    "{:<8} {:>12.2} {:>11.1}%",
                    point.year,
                    point.price,
                    (point.price / projection.current_price - 1.0) * 100.0
                );
            }
            out.push('\n');

            let _ = writeln!(out, "{:<14} {:>8} {:>14}", "Scenario", "Growth", "Target");
            let _ = writeln!(out, "{}", "─".repeat(38));
            for s in &forecast.scenarios {
                let _ = writeln!(
                    out,
                    "{:<14} {:>7.1}% {:>14}",
                    s.scenario.label(),
                    s.growth_rate,
                    money(s.projection.target(years))
                );
            }
        }
        None => {
            let _ = writeln!(out, "No current price available, projection skipped");
        }
    }
    out.push('\n');

    out.push_str(&section("VERDICT"));
    let _ = writeln!(out, "Fair Value:  {}", money(forecast.fair_value));
    let _ = writeln!(
        out,
        "Confidence:  {}",
        forecast.confidence.map_or("N/A", |c| c.label())
    );
    let _ = writeln!(
        out,
        "Rating:      {}",
        forecast.rating.map_or("N/A", |r| r.label())
    );
    let _ = writeln!(out, "Thesis:      {}", forecast.thesis.label());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use roic::{AnnualFundamentals, CompanyFundamentals};

    fn acme() -> CompanyFundamentals {
        CompanyFundamentals {
            symbol: "ACME".into(),
            current_price: Some(100.0),
            analyst_target: Some(120.0),
            annual: vec![AnnualFundamentals {
                fiscal_year: Some(2024),
                operating_income: Some(300.0),
                total_assets: Some(1200.0),
                current_liabilities: Some(200.0),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_with_price() {
        let forecast = QualityCalculator::default().forecast(&acme(), 2).unwrap();
        let text = render(&forecast, 2);
        assert!(text.contains("Quality-Based Forecast"));
        assert!(text.contains("ROIC quality"));
        assert!(text.contains("Analyst target"));
        assert!(text.contains("115.00"));
        assert!(text.contains("Base Case"));
        assert!(text.contains("Conservative"));
        assert!(text.contains("Thesis:      Strong Buy"));
    }

    #[test]
    fn test_render_without_price() {
        let company = CompanyFundamentals {
            current_price: None,
            ..acme()
        };
        let forecast = QualityCalculator::default().forecast(&company, 3).unwrap();
        let text = render(&forecast, 3);
        assert!(text.contains("projection skipped"));
        assert!(text.contains("Current Price:  N/A"));
    }
}
