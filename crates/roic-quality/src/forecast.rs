//! Multi-factor quality forecast.
//!
//! Blends the quality-implied growth with the analyst consensus and the
//! historical revenue trend, then projects conservative, base and optimistic
//! price paths from the blended rate.

use crate::calculator::{QualityCalculator, project};
use roic_traits::{CompanyFundamentals, PriceProjection, QualityAssessment, Result, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ceiling applied to the historical revenue factor, in percent.
pub const REVENUE_GROWTH_CAP: f64 = 20.0;

/// Number of most recent revenues used for the CAGR.
pub const CAGR_WINDOW: usize = 3;

/// ROIC benchmark used for the quality-based fair value, in percent.
const FAIR_VALUE_HURDLE: f64 = 10.0;

/// Forecast scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    /// 70% of the blended growth.
    Conservative,
    /// The blended growth.
    Base,
    /// 130% of the blended growth.
    Optimistic,
}

impl Scenario {
    /// All scenarios, most cautious first.
    pub const ALL: [Self; 3] = [Self::Conservative, Self::Base, Self::Optimistic];

    /// Multiplier applied to the blended growth.
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        match self {
            Self::Conservative => 0.7,
            Self::Base => 1.0,
            Self::Optimistic => 1.3,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Base => "Base Case",
            Self::Optimistic => "Optimistic",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a growth factor comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthSource {
    /// Implied growth of the ROIC band.
    Quality,
    /// Upside to the analyst consensus target.
    Analyst,
    /// Historical revenue CAGR, capped.
    Historical,
}

/// One input to the blended growth rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthFactor {
    /// Origin of the factor.
    pub source: GrowthSource,
    /// Growth in percent.
    pub rate: f64,
}

/// Equal-weight blend of the available growth factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedGrowth {
    /// Blended growth in percent.
    pub rate: f64,
    /// Factors that contributed; empty when the default was used.
    pub factors: Vec<GrowthFactor>,
}

impl BlendedGrowth {
    /// Whether no factor was available and the default rate applies.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.factors.is_empty()
    }
}

/// Forecast confidence, driven by ROIC alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    /// ROIC above 30.
    High,
    /// ROIC above 20.
    MediumHigh,
    /// ROIC above 15.
    Medium,
    /// Anything lower.
    Low,
}

impl Confidence {
    /// Display name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::MediumHigh => "Medium-High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recommendation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    /// Strong buy.
    StrongBuy,
    /// Buy.
    Buy,
    /// Hold.
    Hold,
    /// Neutral.
    Neutral,
}

impl Rating {
    /// Display name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Confidence and rating implied by a ROIC level.
#[must_use]
pub fn confidence(roic: Option<f64>) -> Option<(Confidence, Rating)> {
    let roic = roic.filter(|r| !r.is_nan())?;
    Some(if roic > 30.0 {
        (Confidence::High, Rating::StrongBuy)
    } else if roic > 20.0 {
        (Confidence::MediumHigh, Rating::Buy)
    } else if roic > 15.0 {
        (Confidence::Medium, Rating::Hold)
    } else {
        (Confidence::Low, Rating::Neutral)
    })
}

/// Rating from quality and analyst upside.
///
/// A Strong Buy needs ROIC above 20 and a target above the price; otherwise
/// the upside alone decides (above 10% is a Buy, any upside a Hold).
#[must_use]
pub fn investment_thesis(
    roic: Option<f64>,
    current_price: Option<f64>,
    analyst_target: Option<f64>,
) -> Rating {
    let (Some(price), Some(target)) = (current_price, analyst_target) else {
        return Rating::Neutral;
    };
    if roic.is_some_and(|r| r > 20.0) && target > price {
        Rating::StrongBuy
    } else if target > price * 1.1 {
        Rating::Buy
    } else if target > price {
        Rating::Hold
    } else {
        Rating::Neutral
    }
}

/// Compound annual growth, in percent, of the most recent revenues.
///
/// `revenues` are most recent first; at most [`CAGR_WINDOW`] are used. Returns
/// `None` with fewer than two values or when the endpoints are not positive.
///
/// `n` annual figures span `n - 1` years of growth, so the exponent is
/// `1 / (n - 1)`. Some spreadsheet formulations use `1 / n`, which gives a
/// lower rate for the same data.
#[must_use]
pub fn revenue_cagr(revenues: &[f64]) -> Option<f64> {
    let window = &revenues[..revenues.len().min(CAGR_WINDOW)];
    let (&newest, &oldest) = (window.first()?, window.last()?);
    if window.len() < 2 || newest <= 0.0 || oldest <= 0.0 {
        return None;
    }
    let periods = (window.len() - 1) as f64;
    let cagr = ((newest / oldest).powf(1.0 / periods) - 1.0) * 100.0;
    cagr.is_finite().then_some(cagr)
}

/// Upside to the analyst target, in percent.
#[must_use]
pub fn analyst_implied_growth(current_price: Option<f64>, analyst_target: Option<f64>) -> Option<f64> {
    let price = current_price.filter(|p| p.is_finite() && *p > 0.0)?;
    let target = analyst_target.filter(|t| t.is_finite() && *t > 0.0)?;
    Some((target / price - 1.0) * 100.0)
}

/// Fair value with a premium for ROIC above the 10% hurdle.
#[must_use]
pub fn quality_fair_value(current_price: f64, roic: Option<f64>) -> Option<f64> {
    roic.filter(|r| *r > FAIR_VALUE_HURDLE)
        .map(|r| current_price * (1.0 + (r - FAIR_VALUE_HURDLE) / 100.0))
}

/// Price path for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    /// Scenario.
    pub scenario: Scenario,
    /// Scenario growth in percent.
    pub growth_rate: f64,
    /// Compounded prices.
    pub projection: PriceProjection,
}

/// Full forecast for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityForecast {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Last traded price.
    pub current_price: Option<f64>,
    /// Analyst consensus target.
    pub analyst_target: Option<f64>,
    /// Quality of the latest period.
    pub assessment: QualityAssessment,
    /// ROIC relative to a 20% benchmark.
    pub capital_efficiency: Option<f64>,
    /// Historical revenue CAGR, uncapped.
    pub revenue_cagr: Option<f64>,
    /// Blended growth and its inputs.
    pub growth: BlendedGrowth,
    /// Path at the quality-implied growth; absent without a price.
    pub projection: Option<PriceProjection>,
    /// Scenario paths at the blended growth; empty without a price.
    pub scenarios: Vec<ScenarioProjection>,
    /// Quality-based fair value.
    pub fair_value: Option<f64>,
    /// Confidence from ROIC.
    pub confidence: Option<Confidence>,
    /// Rating from ROIC.
    pub rating: Option<Rating>,
    /// Rating from quality and analyst upside.
    pub thesis: Rating,
}

impl QualityForecast {
    /// The scenario path for `scenario`, if projected.
    #[must_use]
    pub fn scenario(&self, scenario: Scenario) -> Option<&ScenarioProjection> {
        self.scenarios.iter().find(|s| s.scenario == scenario)
    }
}

impl QualityCalculator {
    /// Blends the available growth factors for `assessment`.
    #[must_use]
    pub fn blended_growth(
        &self,
        assessment: &QualityAssessment,
        current_price: Option<f64>,
        analyst_target: Option<f64>,
        revenue_cagr: Option<f64>,
    ) -> BlendedGrowth {
        let quality = assessment.is_known().then_some(GrowthFactor {
            source: GrowthSource::Quality,
            rate: assessment.implied_growth_rate,
        });
        let analyst = analyst_implied_growth(current_price, analyst_target).map(|rate| GrowthFactor {
            source: GrowthSource::Analyst,
            rate,
        });
        let historical = revenue_cagr.filter(|g| *g > 0.0).map(|g| GrowthFactor {
            source: GrowthSource::Historical,
            rate: g.min(REVENUE_GROWTH_CAP),
        });

        let factors: Vec<_> = [quality, analyst, historical].into_iter().flatten().collect();
        let rate = if factors.is_empty() {
            self.policy().default_growth_rate
        } else {
            factors.iter().map(|f| f.rate).sum::<f64>() / factors.len() as f64
        };

        BlendedGrowth { rate, factors }
    }

    /// Builds the forecast for `company` over `years`.
    ///
    /// # Errors
    ///
    /// Returns [`roic_traits::RoicError::InvalidArgument`] if `years` is out of
    /// range or the latest statement is malformed. A non-positive price is
    /// treated as unknown.
    pub fn forecast(&self, company: &CompanyFundamentals, years: u32) -> Result<QualityForecast> {
        let snapshot = company.latest_snapshot(self.tax_rate())?;
        let assessment = self.assess(&snapshot);
        let current_price = company.current_price.filter(|p| p.is_finite() && *p > 0.0);
        let cagr = revenue_cagr(&company.revenues());
        let growth = self.blended_growth(&assessment, current_price, company.analyst_target, cagr);

        let (projection, scenarios, fair_value) = match current_price {
            Some(price) => {
                let projection = self.project_assessment(&assessment, price, years)?;
                let scenarios = Scenario::ALL
                    .into_iter()
                    .filter_map(|scenario| {
                        let rate = growth.rate * scenario.multiplier();
                        match project(price, rate / 100.0, years) {
                            Ok(projection) => Some(ScenarioProjection {
                                scenario,
                                growth_rate: rate,
                                projection,
                            }),
                            Err(e) => {
                                tracing::warn!(symbol = %company.symbol, %scenario, error = %e, "scenario skipped");
                                None
                            }
                        }
                    })
                    .collect();
                (Some(projection), scenarios, quality_fair_value(price, assessment.roic))
            }
            None => {
                tracing::debug!(symbol = %company.symbol, "no current price, projections skipped");
                (None, Vec::new(), None)
            }
        };

        let (confidence, rating) = confidence(assessment.roic).unzip();

        Ok(QualityForecast {
            symbol: company.symbol.clone(),
            current_price,
            analyst_target: company.analyst_target,
            capital_efficiency: assessment.capital_efficiency(),
            revenue_cagr: cagr,
            growth,
            projection,
            scenarios,
            fair_value,
            confidence,
            rating,
            thesis: investment_thesis(assessment.roic, current_price, company.analyst_target),
            assessment,
        })
    }
}
