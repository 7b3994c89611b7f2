//! [`FundamentalsSource`] implementation backed by FMP.

use crate::{
    client::FmpClient,
    types::{BalanceSheet, FundamentalData, IncomeStatement},
};
use async_trait::async_trait;
use roic_traits::{AnnualFundamentals, CompanyFundamentals, FundamentalsSource};
use std::collections::BTreeMap;

/// Joins income statements and balance sheets on their period end date.
///
/// Periods present in only one of the inputs are kept with the other side's
/// figures absent. The result is ordered most recent first.
#[must_use]
pub fn merge_statements(
    income: &[IncomeStatement],
    balance: &[BalanceSheet],
) -> Vec<AnnualFundamentals> {
    let mut periods: BTreeMap<&str, AnnualFundamentals> = BTreeMap::new();

    for stmt in income {
        let period = periods.entry(stmt.date.as_str()).or_default();
        period.period_ending = stmt.parsed_date();
        period.fiscal_year = stmt.fiscal_year;
        period.revenue = stmt.revenue;
        period.operating_income = stmt.operating_income;
        period.net_income = stmt.net_income;
    }

    for sheet in balance {
        let period = periods.entry(sheet.date.as_str()).or_default();
        period.period_ending = period.period_ending.or_else(|| sheet.parsed_date());
        period.fiscal_year = period.fiscal_year.or(sheet.fiscal_year);
        period.total_assets = sheet.total_assets;
        period.current_liabilities = sheet.total_current_liabilities;
    }

    periods.into_values().rev().collect()
}

impl From<FundamentalData> for CompanyFundamentals {
    fn from(data: FundamentalData) -> Self {
        let annual = merge_statements(&data.income_statements, &data.balance_sheets);
        let quote = data.quote.as_ref();
        Self {
            current_price: quote.and_then(|q| q.price),
            pe_ratio: quote.and_then(|q| q.pe_ratio()),
            market_cap: quote.and_then(|q| q.market_cap),
            analyst_target: data.price_target.and_then(|t| t.target_consensus),
            annual,
            symbol: data.symbol,
        }
    }
}

#[async_trait]
impl FundamentalsSource for FmpClient {
    fn name(&self) -> &str {
        "fmp"
    }

    async fn company(&self, symbol: &str, periods: u32) -> roic_traits::Result<CompanyFundamentals> {
        let data = self.fundamental_data(symbol, periods).await?;
        let company = CompanyFundamentals::from(data);
        tracing::debug!(
            symbol = %company.symbol,
            periods = company.annual.len(),
            price = ?company.current_price,
            "fetched fundamentals from FMP"
        );
        Ok(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PriceTargetConsensus, Quote};

    fn income(date: &str, oi: f64) -> IncomeStatement {
        IncomeStatement {
            date: date.into(),
            operating_income: Some(oi),
            revenue: Some(oi * 4.0),
            ..Default::default()
        }
    }

    fn balance(date: &str, ta: f64) -> BalanceSheet {
        BalanceSheet {
            date: date.into(),
            total_assets: Some(ta),
            total_current_liabilities: Some(ta / 5.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_matches_dates_most_recent_first() {
        let merged = merge_statements(
            &[income("2024-12-31", 300.0), income("2023-12-31", 250.0)],
            &[balance("2023-12-31", 900.0), balance("2024-12-31", 1000.0)],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].year(), Some(2024));
        assert_eq!(merged[0].operating_income, Some(300.0));
        assert_eq!(merged[0].total_assets, Some(1000.0));
        assert_eq!(merged[1].current_liabilities, Some(180.0));
    }

    #[test]
    fn test_merge_keeps_unmatched_periods() {
        let merged = merge_statements(&[income("2024-12-31", 300.0)], &[balance("2022-12-31", 800.0)]);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].total_assets.is_none());
        assert!(merged[1].operating_income.is_none());
        assert_eq!(merged[1].year(), Some(2022));
    }

    #[test]
    fn test_into_company() {
        let data = FundamentalData {
            symbol: "AAPL".into(),
            income_statements: vec![income("2024-09-28", 120.0)],
            balance_sheets: vec![balance("2024-09-28", 360.0)],
            quote: Some(Quote {
                symbol: "AAPL".into(),
                price: Some(200.0),
                pe: Some(31.0),
                market_cap: Some(3.0e12),
                ..Default::default()
            }),
            price_target: Some(PriceTargetConsensus {
                symbol: "AAPL".into(),
                target_consensus: Some(240.0),
                ..Default::default()
            }),
        };
        let company = CompanyFundamentals::from(data);
        assert_eq!(company.symbol, "AAPL");
        assert_eq!(company.current_price, Some(200.0));
        assert_eq!(company.pe_ratio, Some(31.0));
        assert_eq!(company.analyst_target, Some(240.0));
        assert_eq!(company.annual.len(), 1);
    }

    #[test]
    fn test_into_company_without_quote() {
        let data = FundamentalData {
            symbol: "XYZ".into(),
            income_statements: vec![income("2024-12-31", 1.0)],
            ..Default::default()
        };
        let company = CompanyFundamentals::from(data);
        assert!(company.current_price.is_none());
        assert!(company.pe_ratio.is_none());
        assert!(company.analyst_target.is_none());
    }
}
