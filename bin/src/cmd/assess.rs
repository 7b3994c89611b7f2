//! Assess command implementation.

use super::{OutputFormat, banner, or_na, pct, score, section, to_json};
use anyhow::Result;
use roic::{Date, FundamentalsSource, QualityAssessment, QualityCalculator};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
struct AssessReport<'a> {
    symbol: &'a str,
    provider: &'a str,
    period_ending: Option<Date>,
    assessment: QualityAssessment,
    capital_efficiency: Option<f64>,
    /// Why ROIC is unknown, when it is.
    unavailable: Option<String>,
}

/// Assess the latest reported period of `symbol`.
pub(crate) async fn run(
    source: &dyn FundamentalsSource,
    calculator: &QualityCalculator,
    symbol: &str,
    periods: u32,
    format: OutputFormat,
) -> Result<()> {
    let company = source.company(symbol, periods).await?;
    let snapshot = company.latest_snapshot(calculator.tax_rate())?;
    let assessment = calculator.assess(&snapshot);

    let report = AssessReport {
        symbol: &company.symbol,
        provider: source.name(),
        period_ending: snapshot.period_ending(),
        capital_efficiency: assessment.capital_efficiency(),
        unavailable: calculator.try_roic(&snapshot).err().map(|e| e.to_string()),
        assessment,
    };

    let output = match format {
        OutputFormat::Text => render(&report),
        OutputFormat::Json => to_json(&report)?,
    };
    println!("{output}");
    Ok(())
}

fn render(report: &AssessReport<'_>) -> String {
    let a = &report.assessment;
    let mut out = banner("ROIC Quality Assessment");

    let _ = writeln!(out, "Symbol:   {}", report.symbol);
    let _ = writeln!(
        out,
        "Period:   {}",
        report
            .period_ending
            .map_or_else(|| "N/A".to_string(), |d| d.to_string())
    );
    let _ = writeln!(out, "Provider: {}\n", report.provider);

    out.push_str(&section("QUALITY"));
    let _ = writeln!(out, "ROIC:               {}", pct(a.roic));
    let _ = writeln!(out, "Quality Score:      {}", score(a.quality_score));
    let _ = writeln!(out, "Moat Rating:        {}", a.moat_rating);
    let _ = writeln!(
        out,
        "Tier:               {}",
        a.tier.map_or("N/A", |t| t.label())
    );
    let _ = writeln!(out, "Implied Growth:     {:.1}%", a.implied_growth_rate);
    let _ = writeln!(
        out,
        "Capital Efficiency: {}x",
        or_na(report.capital_efficiency, 2)
    );

    if let Some(reason) = &report.unavailable {
        let _ = writeln!(
            out,
            "\nROIC unavailable ({reason}); the default growth rate applies."
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use roic::MoatRating;

    #[test]
    fn test_render_known_assessment() {
        let calculator = QualityCalculator::default();
        let assessment = calculator.classify(Some(22.5));
        let report = AssessReport {
            symbol: "ACME",
            provider: "memory",
            period_ending: Date::from_ymd_opt(2024, 12, 31),
            assessment,
            capital_efficiency: assessment.capital_efficiency(),
            unavailable: None,
        };
        let text = render(&report);
        assert!(text.contains("ROIC:               22.50%"));
        assert!(text.contains("85/100"));
        assert!(text.contains("Excellent"));
        assert!(text.contains("2024-12-31"));
        assert!(!text.contains("unavailable"));
    }

    #[test]
    fn test_render_unknown_assessment() {
        let assessment = QualityCalculator::default().classify(None);
        assert_eq!(assessment.moat_rating, MoatRating::Unknown);
        let report = AssessReport {
            symbol: "BARE",
            provider: "memory",
            period_ending: None,
            assessment,
            capital_efficiency: None,
            unavailable: Some("missing operating_income".into()),
        };
        let text = render(&report);
        assert!(text.contains("ROIC:               N/A"));
        assert!(text.contains("Implied Growth:     10.0%"));
        assert!(text.contains("missing operating_income"));
    }
}
