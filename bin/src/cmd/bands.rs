//! Bands command implementation.

use super::{OutputFormat, banner, to_json};
use anyhow::Result;
use roic::QualityPolicy;
use std::fmt::Write as _;

/// Print the active quality policy.
pub(crate) fn run(policy: &QualityPolicy, format: OutputFormat) -> Result<()> {
    let output = match format {
        OutputFormat::Text => render(policy),
        OutputFormat::Json => to_json(policy)?,
    };
    println!("{output}");
    Ok(())
}

fn render(policy: &QualityPolicy) -> String {
    let mut out = banner("Quality Bands");
    let _ = writeln!(out, "Tax rate:       {:.1}%", policy.tax_rate * 100.0);
    let _ = writeln!(
        out,
        "Default growth: {:.1}% (when ROIC is unknown)\n",
        policy.default_growth_rate
    );

    let _ = writeln!(
        out,
        "{:<12} {:>7} {:<8} {:>8}  {}",
        "ROIC", "Score", "Moat", "Growth", "Tier"
    );
    let _ = writeln!(out, "{}", "─".repeat(50));

    let mut ceiling: Option<f64> = None;
    for band in &policy.bands {
        let range = match (band.above, ceiling) {
            (Some(lo), None) => format!("> {lo}"),
            (Some(lo), Some(hi)) => format!("({lo}, {hi}]"),
            (None, Some(hi)) => format!("<= {hi}"),
            (None, None) => "any".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<12} {:>7} {:<8} {:>7.1}%  {}",
            range,
            band.quality_score,
            band.moat_rating.as_str(),
            band.growth_rate,
            band.tier.label()
        );
        ceiling = band.above;
    }
    out
}
