//! Return on invested capital and quality classification.

use crate::policy::QualityPolicy;
use roic_traits::{
    FinancialSnapshot, MoatRating, PriceProjection, ProjectedPrice, QualityAssessment, Result,
    RoicError,
};
use std::sync::OnceLock;
use thiserror::Error;

/// Longest projection horizon accepted, in years.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Why ROIC could not be computed.
///
/// Neither case is a failure of the calculation: both mean the ratio is not
/// meaningful for this snapshot and must be read as "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RoicUnavailable {
    /// A required figure is absent.
    #[error("missing {0}")]
    MissingData(&'static str),

    /// Invested capital is zero, negative or overflows, or the ratio does.
    #[error("invested capital is not usable ({invested_capital})")]
    DivisionGuard {
        /// The offending invested capital.
        invested_capital: f64,
    },
}

/// ROIC calculator bound to a validated [`QualityPolicy`].
///
/// All operations are pure: identical inputs always produce identical outputs
/// and nothing is cached between calls.
///
/// # Example
///
/// ```
/// use roic_quality::QualityCalculator;
/// use roic_traits::{FinancialSnapshot, MoatRating};
///
/// let calc = QualityCalculator::default();
/// let snapshot = FinancialSnapshot::try_new(Some(100.0), Some(1000.0), Some(200.0), 0.25).unwrap();
/// let assessment = calc.assess(&snapshot);
/// assert_eq!(assessment.quality_score, Some(50));
/// assert_eq!(assessment.moat_rating, MoatRating::None);
/// ```
#[derive(Debug, Clone)]
pub struct QualityCalculator {
    policy: QualityPolicy,
}

impl QualityCalculator {
    /// Creates a calculator after validating `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`RoicError::InvalidPolicy`] if the policy is inconsistent.
    pub fn new(policy: QualityPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The policy in use.
    #[must_use]
    pub const fn policy(&self) -> &QualityPolicy {
        &self.policy
    }

    /// Tax rate applied when snapshots are built from vendor data.
    #[must_use]
    pub const fn tax_rate(&self) -> f64 {
        self.policy.tax_rate
    }

    /// Computes ROIC, reporting why it is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`RoicUnavailable`] when a figure is missing or invested
    /// capital is not a positive finite number.
    pub fn try_roic(&self, snapshot: &FinancialSnapshot) -> std::result::Result<f64, RoicUnavailable> {
        try_roic(snapshot)
    }

    /// Computes ROIC in percent, or `None` when it is not meaningful.
    #[must_use]
    pub fn compute_roic(&self, snapshot: &FinancialSnapshot) -> Option<f64> {
        compute_roic(snapshot)
    }

    /// Classifies a ROIC value. `None` (and NaN) classify as unknown.
    #[must_use]
    pub fn classify(&self, roic: Option<f64>) -> QualityAssessment {
        let roic = roic.filter(|r| !r.is_nan());
        match roic.and_then(|r| self.policy.band_for(r)) {
            Some(band) => QualityAssessment {
                roic,
                quality_score: Some(band.quality_score),
                moat_rating: band.moat_rating,
                implied_growth_rate: band.growth_rate,
                tier: Some(band.tier),
            },
            None => QualityAssessment {
                roic: None,
                quality_score: None,
                moat_rating: MoatRating::Unknown,
                implied_growth_rate: self.policy.default_growth_rate,
                tier: None,
            },
        }
    }

    /// Computes and classifies ROIC for a snapshot.
    #[must_use]
    pub fn assess(&self, snapshot: &FinancialSnapshot) -> QualityAssessment {
        let roic = match self.try_roic(snapshot) {
            Ok(roic) => Some(roic),
            Err(reason) => {
                tracing::debug!(%reason, "ROIC unavailable");
                None
            }
        };
        self.classify(roic)
    }

    /// Projects `current_price` forward with the assessment's implied growth.
    ///
    /// # Errors
    ///
    /// Returns [`RoicError::InvalidArgument`] on an invalid price or horizon.
    pub fn project_assessment(
        &self,
        assessment: &QualityAssessment,
        current_price: f64,
        years: u32,
    ) -> Result<PriceProjection> {
        project(current_price, assessment.implied_growth_fraction(), years)
    }
}

impl Default for QualityCalculator {
    fn default() -> Self {
        Self {
            policy: QualityPolicy::default(),
        }
    }
}

fn canonical() -> &'static QualityCalculator {
    static CANONICAL: OnceLock<QualityCalculator> = OnceLock::new();
    CANONICAL.get_or_init(QualityCalculator::default)
}

/// Computes ROIC, reporting why it is unavailable.
///
/// `nopat = operating_income * (1 - tax_rate)`,
/// `invested_capital = total_assets - current_liabilities`,
/// `roic = nopat / invested_capital * 100`.
///
/// # Errors
///
/// Returns [`RoicUnavailable`] when a figure is missing, invested capital is
/// not a positive finite number, or the ratio overflows.
pub fn try_roic(snapshot: &FinancialSnapshot) -> std::result::Result<f64, RoicUnavailable> {
    let nopat = snapshot
        .nopat()
        .ok_or(RoicUnavailable::MissingData("operating_income"))?;
    let total_assets = snapshot
        .total_assets()
        .ok_or(RoicUnavailable::MissingData("total_assets"))?;
    let current_liabilities = snapshot
        .current_liabilities()
        .ok_or(RoicUnavailable::MissingData("current_liabilities"))?;

    let invested_capital = total_assets - current_liabilities;
    if !invested_capital.is_finite() || invested_capital <= 0.0 {
        return Err(RoicUnavailable::DivisionGuard { invested_capital });
    }

    let roic = nopat / invested_capital * 100.0;
    if !roic.is_finite() {
        return Err(RoicUnavailable::DivisionGuard { invested_capital });
    }
    Ok(roic)
}

/// Computes ROIC in percent, or `None` when it is not meaningful.
#[must_use]
pub fn compute_roic(snapshot: &FinancialSnapshot) -> Option<f64> {
    try_roic(snapshot).ok()
}

/// Classifies a ROIC value against the canonical policy.
#[must_use]
pub fn classify(roic: Option<f64>) -> QualityAssessment {
    canonical().classify(roic)
}

/// Compounds `current_price` at `growth_rate` (a fraction) for years `1..=years`.
///
/// # Errors
///
/// Returns [`RoicError::InvalidArgument`] if `years` is zero or above
/// [`MAX_PROJECTION_YEARS`], `current_price` is not a positive finite number,
/// or `growth_rate` is not finite or at most `-1`.
pub fn project(current_price: f64, growth_rate: f64, years: u32) -> Result<PriceProjection> {
    if years == 0 || years > MAX_PROJECTION_YEARS {
        return Err(RoicError::invalid_argument(format!(
            "years must be in 1..={MAX_PROJECTION_YEARS}, got {years}"
        )));
    }
    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(RoicError::invalid_argument(format!(
            "current price must be positive, got {current_price}"
        )));
    }
    if !growth_rate.is_finite() || growth_rate <= -1.0 {
        return Err(RoicError::invalid_argument(format!(
            "growth rate must be a finite fraction above -1, got {growth_rate}"
        )));
    }

    let points = (1..=years)
        .map(|year| ProjectedPrice {
            year,
            price: current_price * (1.0 + growth_rate).powi(year as i32),
        })
        .collect();

    Ok(PriceProjection {
        current_price,
        growth_rate,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::QualityBand;
    use approx::assert_relative_eq;
    use roic_traits::QualityTier;

    fn snapshot(oi: Option<f64>, ta: Option<f64>, cl: Option<f64>) -> FinancialSnapshot {
        FinancialSnapshot::try_new(oi, ta, cl, 0.25).unwrap()
    }

    #[test]
    fn test_roic_formula() {
        let roic = compute_roic(&snapshot(Some(100.0), Some(1000.0), Some(200.0))).unwrap();
        assert_relative_eq!(roic, 9.375, epsilon = 1e-12);

        let expected = 100.0 * 250.0 * (1.0 - 0.25) / (2000.0 - 300.0);
        let roic = compute_roic(&snapshot(Some(250.0), Some(2000.0), Some(300.0))).unwrap();
        assert_relative_eq!(roic, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_roic_uses_snapshot_tax_rate() {
        let untaxed = FinancialSnapshot::try_new(Some(100.0), Some(600.0), Some(100.0), 0.0).unwrap();
        assert_relative_eq!(compute_roic(&untaxed).unwrap(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_invested_capital_is_absent() {
        let s = snapshot(Some(100.0), Some(500.0), Some(600.0));
        assert!(compute_roic(&s).is_none());
        assert_eq!(
            try_roic(&s),
            Err(RoicUnavailable::DivisionGuard {
                invested_capital: -100.0
            })
        );

        for oi in [-50.0, 0.0, 1e12] {
            assert!(compute_roic(&snapshot(Some(oi), Some(500.0), Some(600.0))).is_none());
        }
    }

    #[test]
    fn test_zero_invested_capital_is_absent() {
        assert!(compute_roic(&snapshot(Some(100.0), Some(300.0), Some(300.0))).is_none());
    }

    #[test]
    fn test_overflowing_figures_are_absent() {
        let s = snapshot(Some(100.0), Some(1e308), Some(-1e308));
        assert!(matches!(
            try_roic(&s),
            Err(RoicUnavailable::DivisionGuard { invested_capital }) if invested_capital.is_infinite()
        ));
        assert_eq!(QualityCalculator::default().assess(&s).moat_rating, MoatRating::Unknown);

        // Finite but tiny invested capital overflows the ratio.
        let s = snapshot(Some(1e300), Some(1e-10), Some(0.0));
        assert!(matches!(try_roic(&s), Err(RoicUnavailable::DivisionGuard { .. })));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        assert_eq!(
            try_roic(&snapshot(None, Some(1000.0), Some(200.0))),
            Err(RoicUnavailable::MissingData("operating_income"))
        );
        assert_eq!(
            try_roic(&snapshot(Some(100.0), None, Some(200.0))),
            Err(RoicUnavailable::MissingData("total_assets"))
        );
        assert_eq!(
            try_roic(&snapshot(Some(100.0), Some(1000.0), None)),
            Err(RoicUnavailable::MissingData("current_liabilities"))
        );
    }

    #[test]
    fn test_zero_operating_income_is_zero_roic() {
        let roic = compute_roic(&snapshot(Some(0.0), Some(1000.0), Some(200.0)));
        assert_eq!(roic, Some(0.0));
    }

    #[test]
    fn test_classify_table() {
        let cases = [
            (45.0, 95, MoatRating::Wide, 18.0, QualityTier::Exceptional),
            (25.0, 85, MoatRating::Wide, 15.0, QualityTier::Excellent),
            (17.5, 75, MoatRating::Narrow, 12.0, QualityTier::VeryGood),
            (12.0, 65, MoatRating::Narrow, 10.0, QualityTier::Good),
            (9.375, 50, MoatRating::None, 7.0, QualityTier::Fair),
            (2.0, 30, MoatRating::None, 5.0, QualityTier::Poor),
            (-15.0, 30, MoatRating::None, 5.0, QualityTier::Poor),
        ];
        for (roic, score, moat, growth, tier) in cases {
            let a = classify(Some(roic));
            assert_eq!(a.quality_score, Some(score), "roic {roic}");
            assert_eq!(a.moat_rating, moat, "roic {roic}");
            assert_relative_eq!(a.implied_growth_rate, growth);
            assert_eq!(a.tier, Some(tier));
            assert_eq!(a.roic, Some(roic));
        }
    }

    #[test]
    fn test_classify_boundaries_are_upper_inclusive() {
        assert_eq!(classify(Some(30.0)).quality_score, Some(85));
        assert_eq!(classify(Some(20.0)).quality_score, Some(75));
        assert_eq!(classify(Some(15.0)).quality_score, Some(65));
        assert_eq!(classify(Some(10.0)).quality_score, Some(50));
        assert_eq!(classify(Some(5.0)).quality_score, Some(30));
    }

    #[test]
    fn test_classify_absent() {
        let a = classify(None);
        assert_eq!(a.roic, None);
        assert_eq!(a.quality_score, None);
        assert_eq!(a.moat_rating, MoatRating::Unknown);
        assert_relative_eq!(a.implied_growth_rate, 10.0);
        assert!(a.tier.is_none());

        assert_eq!(classify(Some(f64::NAN)).moat_rating, MoatRating::Unknown);
    }

    #[test]
    fn test_classify_infinite_roic() {
        assert_eq!(classify(Some(f64::INFINITY)).quality_score, Some(95));
        assert_eq!(classify(Some(f64::NEG_INFINITY)).quality_score, Some(30));
    }

    #[test]
    fn test_assess_concrete_scenario() {
        let calc = QualityCalculator::default();
        let a = calc.assess(&snapshot(Some(100.0), Some(1000.0), Some(200.0)));
        assert_relative_eq!(a.roic.unwrap(), 9.375, epsilon = 1e-12);
        assert_eq!(a.quality_score, Some(50));
        assert_eq!(a.moat_rating, MoatRating::None);
        assert_relative_eq!(a.implied_growth_rate, 7.0);
    }

    #[test]
    fn test_custom_policy() {
        let policy = QualityPolicy {
            default_growth_rate: 4.0,
            bands: vec![
                QualityBand {
                    above: Some(15.0),
                    quality_score: 90,
                    moat_rating: MoatRating::Wide,
                    growth_rate: 14.0,
                    tier: QualityTier::Excellent,
                },
                QualityBand {
                    above: None,
                    quality_score: 40,
                    moat_rating: MoatRating::None,
                    growth_rate: 3.0,
                    tier: QualityTier::Fair,
                },
            ],
            ..Default::default()
        };
        let calc = QualityCalculator::new(policy).unwrap();
        assert_eq!(calc.classify(Some(16.0)).moat_rating, MoatRating::Wide);
        assert_eq!(calc.classify(Some(15.0)).quality_score, Some(40));
        assert_relative_eq!(calc.classify(None).implied_growth_rate, 4.0);
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let policy = QualityPolicy {
            bands: Vec::new(),
            ..Default::default()
        };
        assert!(QualityCalculator::new(policy).is_err());
    }

    #[test]
    fn test_project_known_values() {
        let p = project(100.0, 0.10, 3).unwrap();
        let expected = [(1, 110.0), (2, 121.0), (3, 133.1)];
        assert_eq!(p.points.len(), 3);
        for (point, (year, price)) in p.points.iter().zip(expected) {
            assert_eq!(point.year, year);
            assert!((point.price - price).abs() < 1e-9);
        }
    }

    #[test]
    fn test_project_is_idempotent_and_monotonic() {
        let a = project(57.3, 0.07, 10).unwrap();
        let b = project(57.3, 0.07, 10).unwrap();
        assert_eq!(a, b);
        for pair in a.points.windows(2) {
            assert!(pair[1].price > pair[0].price);
            assert_eq!(pair[1].year, pair[0].year + 1);
        }
    }

    #[test]
    fn test_project_zero_growth_is_flat() {
        let p = project(42.0, 0.0, 2).unwrap();
        assert!(p.points.iter().all(|pt| (pt.price - 42.0).abs() < 1e-12));
    }

    #[test]
    fn test_project_contract_violations() {
        for result in [
            project(100.0, 0.1, 0),
            project(-1.0, 0.1, 3),
            project(0.0, 0.1, 3),
            project(f64::NAN, 0.1, 3),
            project(100.0, f64::INFINITY, 3),
            project(100.0, -1.0, 3),
            project(100.0, 0.1, MAX_PROJECTION_YEARS + 1),
        ] {
            assert!(matches!(result, Err(RoicError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_project_assessment_uses_implied_growth() {
        let calc = QualityCalculator::default();
        let assessment = calc.classify(Some(35.0));
        let p = calc.project_assessment(&assessment, 100.0, 1).unwrap();
        assert_relative_eq!(p.target(1).unwrap(), 118.0, epsilon = 1e-9);
        assert_relative_eq!(p.growth_rate, 0.18);
    }
}
