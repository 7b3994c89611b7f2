//! Multi-year ROIC history and trend analysis.

use crate::calculator::QualityCalculator;
use polars::prelude::*;
use roic_traits::{CompanyFundamentals, Result, RoicError, Symbol};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Write, path::Path, str::FromStr};

/// ROIC above which a year counts as high quality, in percent.
pub const HIGH_QUALITY_ROIC: f64 = 20.0;

/// Drop in ROIC (percentage points) beyond which the trend is declining.
const DECLINE_TOLERANCE: f64 = 5.0;

/// One annual period with derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRow {
    /// Fiscal year.
    pub year: Option<i32>,
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Operating income.
    pub operating_income: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total current liabilities.
    pub current_liabilities: Option<f64>,
    /// ROIC in percent.
    pub roic: Option<f64>,
    /// Net income over revenue, in percent.
    pub profit_margin: Option<f64>,
    /// Revenue over total assets.
    pub asset_turnover: Option<f64>,
}

/// Direction of the ROIC trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    /// ROIC rose over the window.
    Improving,
    /// ROIC fell more than five points.
    Declining,
    /// Neither.
    Stable,
}

impl TrendDirection {
    /// Classifies a change in ROIC (percentage points).
    #[must_use]
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Improving
        } else if change < -DECLINE_TOLERANCE {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Improving => "Improving",
            Self::Declining => "Declining",
            Self::Stable => "Stable",
        })
    }
}

/// Verdict on how consistently ROIC stayed high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsistencyAssessment {
    /// More than 80% of years above the high-quality mark.
    ConsistentlyHigh,
    /// More than half.
    GenerallyGood,
    /// Anything less.
    Concerns,
}

impl ConsistencyAssessment {
    /// Classifies a consistency percentage.
    #[must_use]
    pub fn from_consistency(consistency: f64) -> Self {
        if consistency > 80.0 {
            Self::ConsistentlyHigh
        } else if consistency > 50.0 {
            Self::GenerallyGood
        } else {
            Self::Concerns
        }
    }
}

impl fmt::Display for ConsistencyAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConsistentlyHigh => "Consistently High Quality",
            Self::GenerallyGood => "Generally Good Quality",
            Self::Concerns => "Quality Concerns",
        })
    }
}

/// Summary over the years with a known ROIC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoicTrend {
    /// Years with a known ROIC.
    pub years: usize,
    /// Mean ROIC.
    pub average: f64,
    /// Most recent ROIC.
    pub latest: f64,
    /// Latest minus earliest ROIC.
    pub change: f64,
    /// Direction of the change.
    pub direction: TrendDirection,
    /// Share of years above the high-quality mark, in percent.
    pub consistency: f64,
    /// Verdict on the consistency.
    pub assessment: ConsistencyAssessment,
}

impl RoicTrend {
    /// Summarises ROIC values in ascending year order. `None` when empty.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first, &latest) = (values.first()?, values.last()?);
        let years = values.len();
        let average = values.iter().sum::<f64>() / years as f64;
        let change = latest - first;
        let high = values.iter().filter(|r| **r > HIGH_QUALITY_ROIC).count();
        let consistency = high as f64 / years as f64 * 100.0;

        Some(Self {
            years,
            average,
            latest,
            change,
            direction: TrendDirection::from_change(change),
            consistency,
            assessment: ConsistencyAssessment::from_consistency(consistency),
        })
    }
}

/// Output format for [`RoicHistory::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of row objects.
    Json,
}

impl FromStr for ExportFormat {
    type Err = RoicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(RoicError::invalid_argument(format!(
                "unknown export format '{other}', expected csv or json"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
        })
    }
}

/// Annual ROIC history for one company, oldest year first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoicHistory {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Rows in ascending year order.
    pub rows: Vec<HistoricalRow>,
}

impl RoicHistory {
    /// ROIC values in ascending year order, skipping unknown years.
    #[must_use]
    pub fn roic_values(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.roic).collect()
    }

    /// Trend summary, absent when no year has a known ROIC.
    #[must_use]
    pub fn trend(&self) -> Option<RoicTrend> {
        RoicTrend::from_values(&self.roic_values())
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows as a DataFrame, one column per field.
    ///
    /// # Errors
    ///
    /// Returns [`RoicError::Export`] if the frame cannot be built.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let column = |f: fn(&HistoricalRow) -> Option<f64>| -> Vec<Option<f64>> {
            self.rows.iter().map(f).collect()
        };
        let years: Vec<Option<i32>> = self.rows.iter().map(|r| r.year).collect();

        df! {
            "year" => years,
            "revenue" => column(|r| r.revenue),
            "operating_income" => column(|r| r.operating_income),
            "net_income" => column(|r| r.net_income),
            "total_assets" => column(|r| r.total_assets),
            "current_liabilities" => column(|r| r.current_liabilities),
            "roic" => column(|r| r.roic),
            "profit_margin" => column(|r| r.profit_margin),
            "asset_turnover" => column(|r| r.asset_turnover),
        }
        .map_err(|e| RoicError::Export(e.to_string()))
    }

    /// Writes the rows to `writer` in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`RoicError::Export`] if serialization or writing fails.
    pub fn export<W: Write>(&self, writer: &mut W, format: ExportFormat) -> Result<()> {
        let mut df = self.to_dataframe()?;
        match format {
            ExportFormat::Csv => CsvWriter::new(writer)
                .include_header(true)
                .finish(&mut df),
            ExportFormat::Json => JsonWriter::new(writer)
                .with_json_format(JsonFormat::Json)
                .finish(&mut df),
        }
        .map_err(|e| RoicError::Export(e.to_string()))
    }

    /// Writes the rows to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn export_to_path(&self, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        let path = path.as_ref();
        let mut file = std::fs::File::create(path)?;
        self.export(&mut file, format)?;
        tracing::info!(path = %path.display(), %format, rows = self.rows.len(), "exported ROIC history");
        Ok(())
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>, scale: f64) -> Option<f64> {
    let denominator = denominator.filter(|d| *d != 0.0)?;
    Some(numerator? / denominator * scale)
}

impl QualityCalculator {
    /// Builds the annual ROIC history of `company`.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement holds a non-finite figure.
    pub fn history(&self, company: &CompanyFundamentals) -> Result<RoicHistory> {
        let mut rows = company
            .annual
            .iter()
            .map(|period| {
                let snapshot = period.snapshot(self.tax_rate())?;
                Ok(HistoricalRow {
                    year: period.year(),
                    revenue: period.revenue,
                    operating_income: period.operating_income,
                    net_income: period.net_income,
                    total_assets: period.total_assets,
                    current_liabilities: period.current_liabilities,
                    roic: self.compute_roic(&snapshot),
                    profit_margin: ratio(period.net_income, period.revenue, 100.0),
                    asset_turnover: ratio(period.revenue, period.total_assets, 1.0),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by_key(|row| row.year);

        Ok(RoicHistory {
            symbol: company.symbol.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roic_traits::AnnualFundamentals;

    fn period(year: i32, oi: f64, revenue: f64, net: f64) -> AnnualFundamentals {
        AnnualFundamentals {
            fiscal_year: Some(year),
            revenue: Some(revenue),
            operating_income: Some(oi),
            net_income: Some(net),
            total_assets: Some(1200.0),
            current_liabilities: Some(200.0),
            ..Default::default()
        }
    }

    fn company() -> CompanyFundamentals {
        CompanyFundamentals {
            symbol: "ACME".into(),
            annual: vec![
                // ROIC 30, 22.5, 15
                period(2024, 400.0, 2000.0, 300.0),
                period(2023, 300.0, 1800.0, 180.0),
                period(2022, 200.0, 1600.0, 80.0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_history_rows_sorted_with_ratios() {
        let history = QualityCalculator::default().history(&company()).unwrap();
        let years: Vec<_> = history.rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(2022), Some(2023), Some(2024)]);

        let latest = &history.rows[2];
        assert_relative_eq!(latest.roic.unwrap(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(latest.profit_margin.unwrap(), 15.0, epsilon = 1e-9);
        assert_relative_eq!(latest.asset_turnover.unwrap(), 2000.0 / 1200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trend_summary() {
        let trend = QualityCalculator::default()
            .history(&company())
            .unwrap()
            .trend()
            .unwrap();
        assert_eq!(trend.years, 3);
        assert_relative_eq!(trend.average, 22.5, epsilon = 1e-9);
        assert_relative_eq!(trend.latest, 30.0, epsilon = 1e-9);
        assert_relative_eq!(trend.change, 15.0, epsilon = 1e-9);
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert_relative_eq!(trend.consistency, 200.0 / 3.0, epsilon = 1e-9);
        assert_eq!(trend.assessment, ConsistencyAssessment::GenerallyGood);
    }

    #[test]
    fn test_trend_direction_thresholds() {
        assert_eq!(TrendDirection::from_change(0.1), TrendDirection::Improving);
        assert_eq!(TrendDirection::from_change(0.0), TrendDirection::Stable);
        assert_eq!(TrendDirection::from_change(-5.0), TrendDirection::Stable);
        assert_eq!(TrendDirection::from_change(-5.1), TrendDirection::Declining);
    }

    #[test]
    fn test_trend_skips_unknown_years() {
        let mut company = company();
        company.annual[1].total_assets = Some(100.0);
        let history = QualityCalculator::default().history(&company).unwrap();
        assert!(history.rows[1].roic.is_none());
        assert_eq!(history.trend().unwrap().years, 2);
    }

    #[test]
    fn test_empty_history_has_no_trend() {
        let history = QualityCalculator::default()
            .history(&CompanyFundamentals::new("NONE"))
            .unwrap();
        assert!(history.is_empty());
        assert!(history.trend().is_none());
    }

    #[test]
    fn test_zero_revenue_has_no_ratios() {
        let mut company = company();
        company.annual[0].revenue = Some(0.0);
        let history = QualityCalculator::default().history(&company).unwrap();
        assert!(history.rows[2].profit_margin.is_none());
        assert_relative_eq!(history.rows[2].asset_turnover.unwrap(), 0.0);
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_csv() {
        let history = QualityCalculator::default().history(&company()).unwrap();
        let mut buf = Vec::new();
        history.export(&mut buf, ExportFormat::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("year,revenue,operating_income"));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn test_export_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let history = QualityCalculator::default().history(&company()).unwrap();
        history.export_to_path(&path, ExportFormat::Json).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["year"], 2022);
    }
}
