//! ROIC calculator and quality analytics.
//!
//! This crate turns fundamentals into quality judgements:
//! - Calculator: ROIC, band classification and compounding projections
//! - Forecast: blended growth, scenarios, fair value and thesis
//! - History: multi-year ROIC with trend and consistency, CSV/JSON export
//! - Compare: quality-versus-valuation score, symbol lists and ranked comparisons
//!
//! The calculations are synchronous and pure. Fetching is the job of a
//! [`roic_traits::FundamentalsSource`]; [`QualityCalculator::analyse_symbols`]
//! is the one place that drives a source, so every surface compares symbols
//! under the same rules.
//!
//! # Example
//!
//! ```
//! use roic_quality::{QualityCalculator, project};
//! use roic_traits::FinancialSnapshot;
//!
//! let calc = QualityCalculator::default();
//! let snapshot = FinancialSnapshot::try_new(Some(400.0), Some(1200.0), Some(200.0), 0.25).unwrap();
//! let assessment = calc.assess(&snapshot);
//! assert_eq!(assessment.quality_score, Some(85));
//!
//! let path = project(100.0, assessment.implied_growth_fraction(), 3).unwrap();
//! assert_eq!(path.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod calculator;
pub mod compare;
pub mod forecast;
pub mod history;
pub mod policy;

// Re-export key types
pub use calculator::{
    MAX_PROJECTION_YEARS, QualityCalculator, RoicUnavailable, classify, compute_roic, project,
    try_roic,
};
pub use compare::{
    AnalysisBatch, CompleteAnalysis, Comparison, ComparisonRow, MAX_COMPARE_SYMBOLS,
    MarketContext, combined_score, normalise_symbol, pe_score, symbol_list,
};
pub use forecast::{
    BlendedGrowth, Confidence, GrowthFactor, GrowthSource, QualityForecast, Rating, Scenario,
    ScenarioProjection, revenue_cagr,
};
pub use history::{
    ConsistencyAssessment, ExportFormat, HistoricalRow, RoicHistory, RoicTrend, TrendDirection,
};
pub use policy::{QualityBand, QualityPolicy};
