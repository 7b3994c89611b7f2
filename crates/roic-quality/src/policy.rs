//! ROIC band policy.
//!
//! The policy maps a ROIC percentage to a quality score, a moat rating, an
//! implied growth rate and a tier label. Bands are ordered from the highest
//! threshold down; a ROIC qualifies for the first band whose threshold it
//! strictly exceeds, and the last band (without a threshold) catches the rest.

use roic_traits::{MoatRating, QualityTier, Result, RoicError, types::DEFAULT_TAX_RATE};
use serde::{Deserialize, Serialize};

/// Growth assumed when ROIC is unknown, in percent.
pub const DEFAULT_GROWTH_RATE: f64 = 10.0;

/// One row of the policy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityBand {
    /// Exclusive lower bound on ROIC (percent). `None` marks the floor band.
    #[serde(default)]
    pub above: Option<f64>,
    /// Quality score in `[0, 100]`.
    pub quality_score: u8,
    /// Moat rating for the band.
    pub moat_rating: MoatRating,
    /// Implied annual growth, in percent.
    pub growth_rate: f64,
    /// Band label.
    pub tier: QualityTier,
}

impl QualityBand {
    const fn new(
        above: Option<f64>,
        quality_score: u8,
        moat_rating: MoatRating,
        growth_rate: f64,
        tier: QualityTier,
    ) -> Self {
        Self {
            above,
            quality_score,
            moat_rating,
            growth_rate,
            tier,
        }
    }

    /// Whether `roic` falls in this band, ignoring the bands above it.
    #[must_use]
    pub fn admits(&self, roic: f64) -> bool {
        self.above.is_none_or(|threshold| roic > threshold)
    }
}

/// Configuration for the quality calculator.
///
/// The defaults are the canonical table:
///
/// | ROIC | score | moat | growth |
/// |---|---|---|---|
/// | > 30 | 95 | Wide | 18 |
/// | (20, 30] | 85 | Wide | 15 |
/// | (15, 20] | 75 | Narrow | 12 |
/// | (10, 15] | 65 | Narrow | 10 |
/// | (5, 10] | 50 | None | 7 |
/// | ≤ 5 | 30 | None | 5 |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPolicy {
    /// Effective tax rate applied when building snapshots (default: 0.25).
    pub tax_rate: f64,
    /// Growth used when ROIC is unknown, in percent (default: 10).
    pub default_growth_rate: f64,
    /// Bands, highest threshold first, floor band last.
    pub bands: Vec<QualityBand>,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            default_growth_rate: DEFAULT_GROWTH_RATE,
            bands: vec![
                QualityBand::new(Some(30.0), 95, MoatRating::Wide, 18.0, QualityTier::Exceptional),
                QualityBand::new(Some(20.0), 85, MoatRating::Wide, 15.0, QualityTier::Excellent),
                QualityBand::new(Some(15.0), 75, MoatRating::Narrow, 12.0, QualityTier::VeryGood),
                QualityBand::new(Some(10.0), 65, MoatRating::Narrow, 10.0, QualityTier::Good),
                QualityBand::new(Some(5.0), 50, MoatRating::None, 7.0, QualityTier::Fair),
                QualityBand::new(None, 30, MoatRating::None, 5.0, QualityTier::Poor),
            ],
        }
    }
}

/// Growth in percent that a projection can compound.
fn is_valid_growth(rate: f64) -> bool {
    rate.is_finite() && rate > -100.0
}

impl QualityPolicy {
    /// Checks the policy for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RoicError::InvalidPolicy`] if the tax rate is outside
    /// `[0, 1)`, a growth rate is not finite or is at most -100%, a score
    /// exceeds 100, thresholds are not strictly descending, or the floor band
    /// is missing or misplaced.
    pub fn validate(&self) -> Result<()> {
        if !self.tax_rate.is_finite() || !(0.0..1.0).contains(&self.tax_rate) {
            return Err(RoicError::InvalidPolicy(format!(
                "tax_rate must be in [0, 1), got {}",
                self.tax_rate
            )));
        }
        if !is_valid_growth(self.default_growth_rate) {
            return Err(RoicError::InvalidPolicy(format!(
                "default_growth_rate must be finite and above -100, got {}",
                self.default_growth_rate
            )));
        }

        let Some((floor, ranked)) = self.bands.split_last() else {
            return Err(RoicError::InvalidPolicy("no bands configured".to_string()));
        };
        if floor.above.is_some() {
            return Err(RoicError::InvalidPolicy(
                "the last band must have no threshold".to_string(),
            ));
        }

        let mut previous = f64::INFINITY;
        for band in ranked {
            let Some(threshold) = band.above else {
                return Err(RoicError::InvalidPolicy(
                    "only the last band may omit its threshold".to_string(),
                ));
            };
            if !threshold.is_finite() || threshold >= previous {
                return Err(RoicError::InvalidPolicy(format!(
                    "thresholds must be finite and strictly descending (at {threshold})"
                )));
            }
            previous = threshold;
        }

        for band in &self.bands {
            if band.quality_score > 100 {
                return Err(RoicError::InvalidPolicy(format!(
                    "quality score {} exceeds 100",
                    band.quality_score
                )));
            }
            if !is_valid_growth(band.growth_rate) {
                return Err(RoicError::InvalidPolicy(format!(
                    "band growth rates must be finite and above -100, got {}",
                    band.growth_rate
                )));
            }
        }

        Ok(())
    }

    /// The band a ROIC value falls in.
    #[must_use]
    pub fn band_for(&self, roic: f64) -> Option<&QualityBand> {
        self.bands.iter().find(|band| band.admits(roic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = QualityPolicy::default();
        policy.validate().unwrap();
        assert_eq!(policy.bands.len(), 6);
        assert_relative_eq!(policy.tax_rate, 0.25);
        assert_relative_eq!(policy.default_growth_rate, 10.0);
    }

    #[test]
    fn test_band_for_boundaries() {
        let policy = QualityPolicy::default();
        assert_eq!(policy.band_for(30.0).unwrap().quality_score, 85);
        assert_eq!(policy.band_for(30.0001).unwrap().quality_score, 95);
        assert_eq!(policy.band_for(5.0).unwrap().quality_score, 30);
        assert_eq!(policy.band_for(-40.0).unwrap().tier, QualityTier::Poor);
    }

    #[test]
    fn test_rejects_missing_floor() {
        let mut policy = QualityPolicy::default();
        policy.bands.pop();
        assert!(matches!(policy.validate(), Err(RoicError::InvalidPolicy(_))));
    }

    #[test]
    fn test_rejects_unsorted_thresholds() {
        let mut policy = QualityPolicy::default();
        policy.bands.swap(0, 1);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_and_bad_tax() {
        let empty = QualityPolicy {
            bands: Vec::new(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let taxed = QualityPolicy {
            tax_rate: 1.2,
            ..Default::default()
        };
        assert!(taxed.validate().is_err());
    }

    #[test]
    fn test_rejects_score_above_hundred() {
        let mut policy = QualityPolicy::default();
        policy.bands[0].quality_score = 101;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rejects_growth_that_cannot_compound() {
        let mut policy = QualityPolicy::default();
        policy.bands[5].growth_rate = -100.0;
        assert!(matches!(
            policy.validate(),
            Err(RoicError::InvalidPolicy(msg)) if msg.contains("band growth")
        ));

        let policy = QualityPolicy {
            default_growth_rate: -150.0,
            ..Default::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(RoicError::InvalidPolicy(msg)) if msg.contains("default_growth_rate")
        ));

        let mut shrinking = QualityPolicy::default();
        shrinking.bands[5].growth_rate = -99.0;
        shrinking.validate().unwrap();
    }

    #[test]
    fn test_deserialize_partial_policy() {
        let policy: QualityPolicy = serde_json::from_str(r#"{"tax_rate": 0.21}"#).unwrap();
        assert_relative_eq!(policy.tax_rate, 0.21);
        assert_eq!(policy.bands, QualityPolicy::default().bands);
    }
}
