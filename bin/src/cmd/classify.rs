//! Classify command implementation.

use super::{OutputFormat, banner, pct, score, to_json};
use anyhow::Result;
use roic::{QualityAssessment, QualityCalculator};
use std::fmt::Write as _;

/// Look up the band for a ROIC percentage without fetching anything.
pub(crate) fn run(calculator: &QualityCalculator, roic: f64, format: OutputFormat) -> Result<()> {
    let assessment = calculator.classify(Some(roic));
    let output = match format {
        OutputFormat::Text => render(&assessment),
        OutputFormat::Json => to_json(&assessment)?,
    };
    println!("{output}");
    Ok(())
}

fn render(a: &QualityAssessment) -> String {
    let mut out = banner("ROIC Classification");
    let _ = writeln!(out, "ROIC:           {}", pct(a.roic));
    let _ = writeln!(out, "Quality Score:  {}", score(a.quality_score));
    let _ = writeln!(out, "Moat Rating:    {}", a.moat_rating);
    let _ = writeln!(out, "Tier:           {}", a.tier.map_or("N/A", |t| t.label()));
    let _ = writeln!(out, "Implied Growth: {:.1}%", a.implied_growth_rate);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_band() {
        let text = render(&QualityCalculator::default().classify(Some(35.0)));
        assert!(text.contains("95/100"));
        assert!(text.contains("Wide"));
        assert!(text.contains("Exceptional"));
        assert!(text.contains("18.0%"));
    }

    #[test]
    fn test_render_nan_is_unknown() {
        let text = render(&QualityCalculator::default().classify(Some(f64::NAN)));
        assert!(text.contains("Unknown"));
        assert!(text.contains("Quality Score:  N/A"));
    }
}
