//! Common types used throughout ROIC analysis.
//!
//! The derivation chain is one-to-one: a [`FinancialSnapshot`] yields a
//! [`QualityAssessment`], which together with a current price yields a
//! [`PriceProjection`]. None of these are persisted.

use crate::{Result, RoicError};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, e.g. "AAPL" or "600519.SS".
pub type Symbol = String;

/// Effective tax rate assumed when none is configured.
pub const DEFAULT_TAX_RATE: f64 = 0.25;

/// A single period's fundamentals for one entity.
///
/// Monetary fields are optional: an absent field means the figure is unknown,
/// which is different from zero. All present fields are expressed in the same
/// currency and as of the same reporting period.
///
/// Construction validates the tax rate and rejects non-finite figures, so a
/// snapshot that exists is always internally consistent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotFields")]
pub struct FinancialSnapshot {
    operating_income: Option<f64>,
    total_assets: Option<f64>,
    current_liabilities: Option<f64>,
    tax_rate: f64,
    period_ending: Option<Date>,
}

#[derive(Deserialize)]
struct SnapshotFields {
    #[serde(default)]
    operating_income: Option<f64>,
    #[serde(default)]
    total_assets: Option<f64>,
    #[serde(default)]
    current_liabilities: Option<f64>,
    #[serde(default = "default_tax_rate")]
    tax_rate: f64,
    #[serde(default)]
    period_ending: Option<Date>,
}

const fn default_tax_rate() -> f64 {
    DEFAULT_TAX_RATE
}

impl TryFrom<SnapshotFields> for FinancialSnapshot {
    type Error = RoicError;

    fn try_from(fields: SnapshotFields) -> Result<Self> {
        Ok(Self::try_new(
            fields.operating_income,
            fields.total_assets,
            fields.current_liabilities,
            fields.tax_rate,
        )?
        .with_period_ending(fields.period_ending))
    }
}

impl FinancialSnapshot {
    /// Creates a validated snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RoicError::InvalidArgument`] if `tax_rate` is not in `[0, 1)`
    /// or any present figure is not finite.
    pub fn try_new(
        operating_income: Option<f64>,
        total_assets: Option<f64>,
        current_liabilities: Option<f64>,
        tax_rate: f64,
    ) -> Result<Self> {
        if !tax_rate.is_finite() || !(0.0..1.0).contains(&tax_rate) {
            return Err(RoicError::invalid_argument(format!(
                "tax rate must be in [0, 1), got {tax_rate}"
            )));
        }

        for (name, value) in [
            ("operating_income", operating_income),
            ("total_assets", total_assets),
            ("current_liabilities", current_liabilities),
        ] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(RoicError::invalid_argument(format!(
                    "{name} must be finite, got {v}"
                )));
            }
        }

        Ok(Self {
            operating_income,
            total_assets,
            current_liabilities,
            tax_rate,
            period_ending: None,
        })
    }

    /// A snapshot with every figure unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if `tax_rate` is out of range.
    pub fn empty(tax_rate: f64) -> Result<Self> {
        Self::try_new(None, None, None, tax_rate)
    }

    /// Attaches the reporting date.
    #[must_use]
    pub const fn with_period_ending(mut self, period_ending: Option<Date>) -> Self {
        self.period_ending = period_ending;
        self
    }

    /// Period operating income.
    pub const fn operating_income(&self) -> Option<f64> {
        self.operating_income
    }

    /// Total assets at period end.
    pub const fn total_assets(&self) -> Option<f64> {
        self.total_assets
    }

    /// Current liabilities at period end.
    pub const fn current_liabilities(&self) -> Option<f64> {
        self.current_liabilities
    }

    /// Assumed effective tax rate.
    pub const fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    /// Reporting date, if known.
    pub const fn period_ending(&self) -> Option<Date> {
        self.period_ending
    }

    /// Invested capital (`total_assets - current_liabilities`), if both are known.
    pub fn invested_capital(&self) -> Option<f64> {
        Some(self.total_assets? - self.current_liabilities?)
    }

    /// Net operating profit after tax, if operating income is known.
    pub fn nopat(&self) -> Option<f64> {
        self.operating_income.map(|oi| oi * (1.0 - self.tax_rate))
    }
}

/// Competitive-advantage tier inferred from ROIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoatRating {
    /// Durable advantage.
    Wide,
    /// Some advantage.
    Narrow,
    /// No discernible advantage.
    None,
    /// ROIC could not be computed.
    Unknown,
}

impl MoatRating {
    /// Display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wide => "Wide",
            Self::Narrow => "Narrow",
            Self::None => "None",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MoatRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable label of a ROIC band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    /// Top band.
    Exceptional,
    /// Second band.
    Excellent,
    /// Third band.
    VeryGood,
    /// Fourth band.
    Good,
    /// Fifth band.
    Fair,
    /// Floor band.
    Poor,
}

impl QualityTier {
    /// Display name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Exceptional => "Exceptional",
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Quality classification derived from a snapshot's ROIC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Return on invested capital, in percent.
    pub roic: Option<f64>,
    /// Score in `[0, 100]`, absent when ROIC is unknown.
    pub quality_score: Option<u8>,
    /// Moat rating; `Unknown` when ROIC is unknown.
    pub moat_rating: MoatRating,
    /// Annual growth assumption in percent (e.g. `18.0`).
    pub implied_growth_rate: f64,
    /// Band label, absent when ROIC is unknown.
    pub tier: Option<QualityTier>,
}

impl QualityAssessment {
    /// Implied growth as a fraction (`0.18` for 18%).
    #[must_use]
    pub fn implied_growth_fraction(&self) -> f64 {
        self.implied_growth_rate / 100.0
    }

    /// ROIC normalised to a 20% benchmark.
    #[must_use]
    pub fn capital_efficiency(&self) -> Option<f64> {
        self.roic.map(|r| r / 20.0)
    }

    /// Whether ROIC was computable.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.roic.is_some()
    }
}

/// One projected point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPrice {
    /// Years from now, starting at 1.
    pub year: u32,
    /// Compounded price.
    pub price: f64,
}

/// Compounding price path for years `1..=n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceProjection {
    /// Price at year 0.
    pub current_price: f64,
    /// Annual growth as a fraction.
    pub growth_rate: f64,
    /// Points in ascending year order.
    pub points: Vec<ProjectedPrice>,
}

impl PriceProjection {
    /// Projected price for `year`, if within the horizon.
    #[must_use]
    pub fn target(&self, year: u32) -> Option<f64> {
        self.points.iter().find(|p| p.year == year).map(|p| p.price)
    }

    /// Total return in percent from the current price to `year`.
    #[must_use]
    pub fn total_return_pct(&self, year: u32) -> Option<f64> {
        self.target(year)
            .map(|p| (p - self.current_price) / self.current_price * 100.0)
    }

    /// Number of projected years.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the projection has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Annual statement figures for one fiscal period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualFundamentals {
    /// Period end date.
    #[serde(default)]
    pub period_ending: Option<Date>,
    /// Fiscal year, when the vendor reports one explicitly.
    #[serde(default)]
    pub fiscal_year: Option<i32>,
    /// Total revenue.
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Operating income.
    #[serde(default)]
    pub operating_income: Option<f64>,
    /// Net income.
    #[serde(default)]
    pub net_income: Option<f64>,
    /// Total assets.
    #[serde(default)]
    pub total_assets: Option<f64>,
    /// Total current liabilities.
    #[serde(default)]
    pub current_liabilities: Option<f64>,
}

impl AnnualFundamentals {
    /// Fiscal year, falling back to the year of the period end.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.fiscal_year
            .or_else(|| self.period_ending.map(|d| d.year()))
    }

    /// Builds the ROIC snapshot for this period.
    ///
    /// # Errors
    ///
    /// Returns an error if `tax_rate` is out of range or a figure is not finite.
    pub fn snapshot(&self, tax_rate: f64) -> Result<FinancialSnapshot> {
        Ok(FinancialSnapshot::try_new(
            self.operating_income,
            self.total_assets,
            self.current_liabilities,
            tax_rate,
        )?
        .with_period_ending(self.period_ending))
    }
}

/// Everything a data source knows about one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFundamentals {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Last traded price.
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Price to earnings ratio.
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Analyst consensus price target.
    #[serde(default)]
    pub analyst_target: Option<f64>,
    /// Annual statements, most recent first.
    #[serde(default)]
    pub annual: Vec<AnnualFundamentals>,
}

impl CompanyFundamentals {
    /// Creates an empty record for `symbol`.
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// The most recent annual period.
    #[must_use]
    pub fn latest(&self) -> Option<&AnnualFundamentals> {
        self.annual.first()
    }

    /// Snapshot of the most recent period; every figure is absent when no
    /// statements are available.
    ///
    /// # Errors
    ///
    /// Returns an error if `tax_rate` is out of range or a figure is not finite.
    pub fn latest_snapshot(&self, tax_rate: f64) -> Result<FinancialSnapshot> {
        match self.latest() {
            Some(period) => period.snapshot(tax_rate),
            None => FinancialSnapshot::empty(tax_rate),
        }
    }

    /// Known revenues, most recent first.
    #[must_use]
    pub fn revenues(&self) -> Vec<f64> {
        self.annual.iter().filter_map(|a| a.revenue).collect()
    }
}
