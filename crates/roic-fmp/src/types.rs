//! Data types for FMP API responses.
//!
//! Every figure is optional: FMP omits or nulls fields it has no value for,
//! and an unknown figure must stay unknown rather than turn into zero.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Reporting period for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Annual reports (10-K filings).
    #[default]
    Annual,
    /// Quarterly reports (10-Q filings).
    Quarter,
}

impl Period {
    /// Get the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

/// FMP reports the fiscal year as a string on some endpoints and a number on others.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Income statement data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Period end date (YYYY-MM-DD).
    pub date: String,
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: String,
    /// Fiscal year.
    #[serde(default, deserialize_with = "lenient_year")]
    pub fiscal_year: Option<i32>,
    /// Reporting period (FY, Q1...).
    #[serde(default)]
    pub period: Option<String>,
    /// Total revenue.
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Operating income.
    #[serde(default)]
    pub operating_income: Option<f64>,
    /// Net income.
    #[serde(default)]
    pub net_income: Option<f64>,
}

impl IncomeStatement {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Balance sheet data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Period end date (YYYY-MM-DD).
    pub date: String,
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: String,
    /// Fiscal year.
    #[serde(default, deserialize_with = "lenient_year")]
    pub fiscal_year: Option<i32>,
    /// Total assets.
    #[serde(default)]
    pub total_assets: Option<f64>,
    /// Total current liabilities.
    #[serde(default)]
    pub total_current_liabilities: Option<f64>,
    /// Total stockholders' equity.
    #[serde(default)]
    pub total_stockholders_equity: Option<f64>,
}

impl BalanceSheet {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Real-time quote data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    #[serde(default)]
    pub name: Option<String>,
    /// Current price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Market cap.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// EPS.
    #[serde(default)]
    pub eps: Option<f64>,
    /// P/E ratio.
    #[serde(default)]
    pub pe: Option<f64>,
    /// 52-week high.
    #[serde(default)]
    pub year_high: Option<f64>,
    /// 52-week low.
    #[serde(default)]
    pub year_low: Option<f64>,
}

impl Quote {
    /// P/E as reported, else derived from price and EPS.
    #[must_use]
    pub fn pe_ratio(&self) -> Option<f64> {
        self.pe.or_else(|| {
            let eps = self.eps.filter(|e| *e != 0.0)?;
            Some(self.price? / eps)
        })
    }
}

/// Analyst price-target consensus from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTargetConsensus {
    /// Ticker symbol.
    pub symbol: String,
    /// Highest target.
    #[serde(default)]
    pub target_high: Option<f64>,
    /// Lowest target.
    #[serde(default)]
    pub target_low: Option<f64>,
    /// Consensus target.
    #[serde(default)]
    pub target_consensus: Option<f64>,
    /// Median target.
    #[serde(default)]
    pub target_median: Option<f64>,
}

/// Everything fetched for one symbol.
#[derive(Debug, Clone, Default)]
pub struct FundamentalData {
    /// Ticker symbol.
    pub symbol: String,
    /// Income statements (most recent first).
    pub income_statements: Vec<IncomeStatement>,
    /// Balance sheets (most recent first).
    pub balance_sheets: Vec<BalanceSheet>,
    /// Current quote.
    pub quote: Option<Quote>,
    /// Analyst consensus.
    pub price_target: Option<PriceTargetConsensus>,
}

impl FundamentalData {
    /// Whether nothing at all was returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.income_statements.is_empty()
            && self.balance_sheets.is_empty()
            && self.quote.is_none()
            && self.price_target.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_income_statement_nulls_stay_absent() {
        let income: IncomeStatement = serde_json::from_str(
            r#"{"date": "2024-09-28", "symbol": "AAPL", "fiscalYear": "2024",
                "revenue": 391035000000, "operatingIncome": null}"#,
        )
        .unwrap();
        assert_eq!(income.fiscal_year, Some(2024));
        assert_eq!(income.parsed_date(), NaiveDate::from_ymd_opt(2024, 9, 28));
        assert!(income.revenue.is_some());
        assert!(income.operating_income.is_none());
        assert!(income.net_income.is_none());
    }

    #[test]
    fn test_numeric_fiscal_year() {
        let balance: BalanceSheet =
            serde_json::from_str(r#"{"date": "2023-12-31", "fiscalYear": 2023}"#).unwrap();
        assert_eq!(balance.fiscal_year, Some(2023));
        assert!(balance.total_assets.is_none());
    }

    #[test]
    fn test_quote_pe_fallback() {
        let quote: Quote =
            serde_json::from_str(r#"{"symbol": "AAPL", "price": 200.0, "eps": 8.0}"#).unwrap();
        assert_relative_eq!(quote.pe_ratio().unwrap(), 25.0);

        let reported = Quote {
            pe: Some(30.0),
            ..quote
        };
        assert_relative_eq!(reported.pe_ratio().unwrap(), 30.0);
    }
}
