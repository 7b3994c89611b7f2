#![doc(issue_tracker_base_url = "https://github.com/factordynamics/roic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # roic
//!
//! ROIC quality metrics and quality-based price forecasts.
//!
//! roic is an umbrella crate that re-exports all roic sub-crates for convenience.
//! It provides a unified API for computing return on invested capital, mapping it
//! to a quality score and moat rating, and compounding prices at the implied growth.
//!
//! ## Quick Start
//!
//! ```
//! use roic::{FinancialSnapshot, QualityCalculator, Result};
//!
//! # fn main() -> Result<()> {
//! let calc = QualityCalculator::default();
//!
//! // Operating income 300, total assets 1200, current liabilities 200
//! let snapshot = FinancialSnapshot::try_new(Some(300.0), Some(1200.0), Some(200.0), 0.25)?;
//! let assessment = calc.assess(&snapshot);
//! assert_eq!(assessment.quality_score, Some(85));
//!
//! // Compound a price of 100 at the implied 15%
//! let path = calc.project_assessment(&assessment, 100.0, 3)?;
//! assert_eq!(path.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types, the error type and the [`FundamentalsSource`] seam
//! - [`quality`] - Calculator, policy, forecasts, history and comparisons
//! - [`fmp`] - Financial Modeling Prep data source
//! - [`server`] - HTTP and tool-call service
//!
//! ## Architecture
//!
//! 1. **Sources** fetch annual statements, a quote and the analyst consensus
//! 2. **The calculator** turns the latest period into a [`QualityAssessment`]
//! 3. **Forecasts** blend quality, analyst and historical growth into price paths
//! 4. **Comparisons** weigh quality against valuation across symbols

/// Version information for the roic crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types and trait definitions.
///
/// - [`FinancialSnapshot`] - Validated inputs for one period
/// - [`QualityAssessment`] - ROIC, score, moat and implied growth
/// - [`PriceProjection`] - Compounded price path
/// - [`FundamentalsSource`] - Where fundamentals come from
pub mod traits {
    pub use roic_traits::*;
}

// Re-export the data source seam at top level
pub use roic_traits::{FundamentalsSource, InMemorySource};

// Re-export error types
pub use roic_traits::{Result, RoicError};

// Re-export common types
pub use roic_traits::types::{
    AnnualFundamentals, CompanyFundamentals, Date, FinancialSnapshot, MoatRating,
    PriceProjection, QualityAssessment, QualityTier, Symbol,
};

// ============================================================================
// Quality Analytics
// ============================================================================

/// ROIC calculator and quality analytics.
///
/// ## Quality Bands
///
/// | ROIC | score | moat | growth |
/// |---|---|---|---|
/// | > 30 | 95 | Wide | 18 |
/// | (20, 30] | 85 | Wide | 15 |
/// | (15, 20] | 75 | Narrow | 12 |
/// | (10, 15] | 65 | Narrow | 10 |
/// | (5, 10] | 50 | None | 7 |
/// | ≤ 5 | 30 | None | 5 |
///
/// ROIC itself is NOPAT over invested capital:
///
/// ```text
/// ROIC = operating_income * (1 - tax_rate) / (total_assets - current_liabilities) * 100
/// ```
///
/// The bands are a [`quality::QualityPolicy`] and can be replaced through
/// configuration.
pub mod quality {
    pub use roic_quality::*;
}

pub use roic_quality::{QualityCalculator, QualityPolicy};

// ============================================================================
// Data Providers
// ============================================================================

/// Financial Modeling Prep (FMP) API client.
///
/// ## Setup
///
/// 1. Get an API key at <https://financialmodelingprep.com/>
/// 2. Set `ROIC_FMP_API_KEY` or `FMP_API_KEY`, or add it to a `.env` file
///
/// ## Example
///
/// ```ignore
/// use roic::{FundamentalsSource, QualityCalculator};
/// use roic::fmp::FmpClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = FmpClient::from_env()?;
///     let company = client.company("AAPL", 5).await?;
///
///     let forecast = QualityCalculator::default().forecast(&company, 3)?;
///     println!("Thesis: {}", forecast.thesis);
///     Ok(())
/// }
/// ```
pub mod fmp {
    pub use roic_fmp::*;
}

// ============================================================================
// HTTP Service
// ============================================================================

/// HTTP and tool-call service.
///
/// See [`server::router`] for the route table.
pub mod server {
    pub use roic_server::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use roic::prelude::*;
/// ```
///
/// This brings into scope:
/// - The calculator and its policy: [`QualityCalculator`], [`QualityPolicy`]
/// - The data source seam: [`FundamentalsSource`], [`InMemorySource`]
/// - Common types: [`FinancialSnapshot`], [`QualityAssessment`], [`CompanyFundamentals`]
/// - Error types: [`Result`], [`RoicError`]
pub mod prelude {
    pub use crate::{
        AnnualFundamentals, CompanyFundamentals, FinancialSnapshot, FundamentalsSource,
        InMemorySource, MoatRating, PriceProjection, QualityAssessment, QualityCalculator,
        QualityPolicy, QualityTier,
    };
    pub use crate::{Result, RoicError};
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_error_types() {
        let _result: Result<()> = Ok(());
        let error = RoicError::invalid_argument("test");
        assert!(error.to_string().contains("test"));
    }

    #[tokio::test]
    async fn test_source_to_forecast() {
        let source = InMemorySource::new().with_company(CompanyFundamentals {
            symbol: "ACME".into(),
            current_price: Some(100.0),
            annual: vec![AnnualFundamentals {
                fiscal_year: Some(2024),
                operating_income: Some(300.0),
                total_assets: Some(1200.0),
                current_liabilities: Some(200.0),
                ..Default::default()
            }],
            ..Default::default()
        });

        let company = source.company("acme", 5).await.unwrap();
        let forecast = QualityCalculator::default().forecast(&company, 1).unwrap();
        assert_relative_eq!(forecast.assessment.roic.unwrap(), 22.5, epsilon = 1e-9);
        assert_eq!(forecast.assessment.moat_rating, MoatRating::Wide);

        let projection = forecast.projection.unwrap();
        assert_relative_eq!(projection.target(1).unwrap(), 115.0, epsilon = 1e-9);
    }
}
