//! Quality-versus-valuation scoring and multi-symbol comparison.

use crate::calculator::QualityCalculator;
use roic_traits::{
    CompanyFundamentals, FundamentalsSource, QualityAssessment, Result, RoicError, Symbol,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Most symbols accepted by one comparison.
pub const MAX_COMPARE_SYMBOLS: usize = 10;

/// Longest symbol accepted.
const MAX_SYMBOL_LEN: usize = 20;

/// Weight of the quality score in the combined score.
pub const QUALITY_WEIGHT: f64 = 0.6;

/// Weight of the P/E score in the combined score.
pub const VALUATION_WEIGHT: f64 = 0.4;

/// Score given to a non-positive P/E.
const NEUTRAL_PE_SCORE: f64 = 50.0;

/// Valuation score in `[0, 100]`; lower P/E scores higher, 50 and above scores 0.
#[must_use]
pub fn pe_score(pe_ratio: f64) -> f64 {
    if pe_ratio > 0.0 {
        (100.0 - 2.0 * pe_ratio).max(0.0)
    } else {
        NEUTRAL_PE_SCORE
    }
}

/// `quality * 0.6 + pe_score * 0.4`, absent unless both inputs are known.
#[must_use]
pub fn combined_score(quality_score: Option<u8>, pe_ratio: Option<f64>) -> Option<f64> {
    let quality = f64::from(quality_score?);
    let pe = pe_ratio.filter(|pe| pe.is_finite())?;
    Some(quality * QUALITY_WEIGHT + pe_score(pe) * VALUATION_WEIGHT)
}

/// Market context reported next to the quality figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Last traded price.
    pub current_price: Option<f64>,
    /// Price to earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Latest annual revenue.
    pub revenue: Option<f64>,
    /// Latest net margin, in percent.
    pub profit_margin: Option<f64>,
}

/// Quality and valuation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteAnalysis {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Market context.
    pub market: MarketContext,
    /// Quality of the latest period.
    pub assessment: QualityAssessment,
    /// Price in one year at the implied growth.
    pub target_1y: Option<f64>,
    /// Price in three years at the implied growth.
    pub target_3y: Option<f64>,
    /// Quality-versus-valuation score.
    pub combined_score: Option<f64>,
}

impl QualityCalculator {
    /// Joins market context, quality and the combined score for `company`.
    ///
    /// # Errors
    ///
    /// Returns an error if the latest statement or the price is malformed.
    pub fn complete_analysis(&self, company: &CompanyFundamentals) -> Result<CompleteAnalysis> {
        let assessment = self.assess(&company.latest_snapshot(self.tax_rate())?);
        let latest = company.latest();
        let revenue = latest.and_then(|p| p.revenue);
        let net_income = latest.and_then(|p| p.net_income);

        let projection = company
            .current_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .map(|price| self.project_assessment(&assessment, price, 3))
            .transpose()?;

        Ok(CompleteAnalysis {
            symbol: company.symbol.clone(),
            market: MarketContext {
                current_price: company.current_price,
                pe_ratio: company.pe_ratio,
                market_cap: company.market_cap,
                revenue,
                profit_margin: revenue
                    .filter(|r| *r != 0.0)
                    .and_then(|r| net_income.map(|n| n / r * 100.0)),
            },
            target_1y: projection.as_ref().and_then(|p| p.target(1)),
            target_3y: projection.as_ref().and_then(|p| p.target(3)),
            combined_score: combined_score(assessment.quality_score, company.pe_ratio),
            assessment,
        })
    }
}

/// Trims and upper-cases a user-supplied symbol.
///
/// Accepts letters, digits and `.`, `-`, `^`, `=` (e.g. `BRK.B`, `600519.SS`,
/// `^GSPC`).
///
/// # Errors
///
/// Returns [`RoicError::InvalidArgument`] for an empty or malformed symbol.
pub fn normalise_symbol(raw: &str) -> Result<Symbol> {
    let symbol = raw.trim();
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if valid {
        Ok(symbol.to_ascii_uppercase())
    } else {
        Err(RoicError::invalid_argument(format!("invalid symbol '{raw}'")))
    }
}

/// Normalises and de-duplicates `symbols`, keeping the first occurrence.
///
/// The limit applies to the distinct symbols.
///
/// # Errors
///
/// Returns [`RoicError::InvalidArgument`] if the list is empty, holds a
/// malformed symbol, or names more than `limit` distinct symbols.
pub fn symbol_list(symbols: &[String], limit: usize) -> Result<Vec<Symbol>> {
    let mut unique: Vec<Symbol> = Vec::with_capacity(symbols.len());
    for raw in symbols {
        let symbol = normalise_symbol(raw)?;
        if !unique.contains(&symbol) {
            unique.push(symbol);
        }
    }

    if unique.is_empty() {
        return Err(RoicError::invalid_argument("at least one symbol is required"));
    }
    if unique.len() > limit {
        return Err(RoicError::invalid_argument(format!(
            "at most {limit} symbols can be compared, got {}",
            unique.len()
        )));
    }
    Ok(unique)
}

/// Analyses gathered for a set of symbols.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisBatch {
    /// One analysis per symbol that could be fetched, in request order.
    pub analyses: Vec<CompleteAnalysis>,
    /// Symbols the source did not know or could not fetch.
    pub skipped: Vec<Symbol>,
}

impl AnalysisBatch {
    /// Ranks the gathered analyses.
    #[must_use]
    pub fn comparison(&self) -> Comparison {
        Comparison::from_analyses(&self.analyses)
    }
}

impl QualityCalculator {
    /// Fetches and analyses each of `symbols` in turn.
    ///
    /// The list goes through [`symbol_list`] first. Symbols the source
    /// reports as unknown or fails to fetch are skipped with a warning; any
    /// other error aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid symbol list or a non-fetch failure.
    pub async fn analyse_symbols(
        &self,
        source: &dyn FundamentalsSource,
        symbols: &[String],
        periods: u32,
        limit: usize,
    ) -> Result<AnalysisBatch> {
        let symbols = symbol_list(symbols, limit)?;
        let mut batch = AnalysisBatch {
            analyses: Vec::with_capacity(symbols.len()),
            skipped: Vec::new(),
        };

        for symbol in symbols {
            let result = source
                .company(&symbol, periods)
                .await
                .and_then(|company| self.complete_analysis(&company));
            match result {
                Ok(analysis) => batch.analyses.push(analysis),
                Err(e @ (RoicError::SymbolNotFound(_) | RoicError::DataFetch(_))) => {
                    tracing::warn!(%symbol, error = %e, "skipping symbol");
                    batch.skipped.push(symbol);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(batch)
    }
}

/// One row of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// ROIC in percent.
    pub roic: Option<f64>,
    /// Quality score.
    pub quality_score: Option<u8>,
    /// Price to earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Quality-versus-valuation score.
    pub combined_score: Option<f64>,
}

impl From<&CompleteAnalysis> for ComparisonRow {
    fn from(analysis: &CompleteAnalysis) -> Self {
        Self {
            symbol: analysis.symbol.clone(),
            roic: analysis.assessment.roic,
            quality_score: analysis.assessment.quality_score,
            pe_ratio: analysis.market.pe_ratio,
            market_cap: analysis.market.market_cap,
            combined_score: analysis.combined_score,
        }
    }
}

/// Ranked comparison, best combined score first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Rows ranked by combined score, unscored rows last.
    pub rows: Vec<ComparisonRow>,
    /// Symbol of the first row.
    pub best_overall: Option<Symbol>,
}

impl Comparison {
    /// Ranks `rows` by combined score descending. The sort is stable, so
    /// ties and unscored rows keep their input order.
    #[must_use]
    pub fn rank(mut rows: Vec<ComparisonRow>) -> Self {
        rows.sort_by(|a, b| match (a.combined_score, b.combined_score) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        let best_overall = rows.first().map(|row| row.symbol.clone());
        Self { rows, best_overall }
    }

    /// Ranks a set of complete analyses.
    #[must_use]
    pub fn from_analyses<'a>(analyses: impl IntoIterator<Item = &'a CompleteAnalysis>) -> Self {
        Self::rank(analyses.into_iter().map(ComparisonRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roic_traits::{AnnualFundamentals, InMemorySource};

    fn row(symbol: &str, combined: Option<f64>) -> ComparisonRow {
        ComparisonRow {
            symbol: symbol.into(),
            roic: None,
            quality_score: None,
            pe_ratio: None,
            market_cap: None,
            combined_score: combined,
        }
    }

    #[test]
    fn test_pe_score() {
        assert_relative_eq!(pe_score(20.0), 60.0);
        assert_relative_eq!(pe_score(60.0), 0.0);
        assert_relative_eq!(pe_score(-8.0), 50.0);
        assert_relative_eq!(pe_score(0.0), 50.0);
    }

    #[test]
    fn test_combined_score() {
        // 85 * 0.6 + 60 * 0.4
        assert_relative_eq!(combined_score(Some(85), Some(20.0)).unwrap(), 75.0, epsilon = 1e-9);
        assert!(combined_score(None, Some(20.0)).is_none());
        assert!(combined_score(Some(85), None).is_none());
    }

    #[test]
    fn test_rank_puts_unscored_last() {
        let comparison = Comparison::rank(vec![
            row("A", None),
            row("B", Some(40.0)),
            row("C", Some(75.0)),
            row("D", None),
        ]);
        let order: Vec<_> = comparison.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "A", "D"]);
        assert_eq!(comparison.best_overall.as_deref(), Some("C"));
    }

    #[test]
    fn test_rank_empty() {
        let comparison = Comparison::rank(Vec::new());
        assert!(comparison.rows.is_empty());
        assert!(comparison.best_overall.is_none());
    }

    #[test]
    fn test_complete_analysis() {
        let company = CompanyFundamentals {
            symbol: "ACME".into(),
            current_price: Some(100.0),
            pe_ratio: Some(20.0),
            market_cap: Some(1e9),
            annual: vec![AnnualFundamentals {
                revenue: Some(2000.0),
                net_income: Some(200.0),
                operating_income: Some(300.0),
                total_assets: Some(1200.0),
                current_liabilities: Some(200.0),
                ..Default::default()
            }],
            ..Default::default()
        };
        let analysis = QualityCalculator::default().complete_analysis(&company).unwrap();
        assert_eq!(analysis.assessment.quality_score, Some(85));
        assert_relative_eq!(analysis.market.profit_margin.unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(analysis.target_1y.unwrap(), 115.0, epsilon = 1e-9);
        assert_relative_eq!(analysis.target_3y.unwrap(), 100.0 * 1.15_f64.powi(3), epsilon = 1e-9);
        assert_relative_eq!(analysis.combined_score.unwrap(), 75.0, epsilon = 1e-9);

        let comparison = Comparison::from_analyses([&analysis]);
        assert_eq!(comparison.best_overall.as_deref(), Some("ACME"));
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_normalise_symbol() {
        assert_eq!(normalise_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalise_symbol("600519.ss").unwrap(), "600519.SS");
        assert_eq!(normalise_symbol("^gspc").unwrap(), "^GSPC");
        assert!(normalise_symbol("").is_err());
        assert!(normalise_symbol("AA PL").is_err());
        assert!(normalise_symbol("A;B").is_err());
        assert!(normalise_symbol(&"X".repeat(MAX_SYMBOL_LEN + 1)).is_err());
    }

    #[test]
    fn test_symbol_list_dedupes_in_order() {
        let list = symbol_list(&symbols(&["msft", "AAPL", " Msft "]), 10).unwrap();
        assert_eq!(list, vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn test_symbol_list_limit_counts_distinct_symbols() {
        let mut many: Vec<String> = (0..MAX_COMPARE_SYMBOLS).map(|i| format!("S{i}")).collect();
        many.push("s0".into());
        assert_eq!(symbol_list(&many, MAX_COMPARE_SYMBOLS).unwrap().len(), MAX_COMPARE_SYMBOLS);

        many.push("EXTRA".into());
        let err = symbol_list(&many, MAX_COMPARE_SYMBOLS).unwrap_err();
        assert!(matches!(err, RoicError::InvalidArgument(msg) if msg.contains("got 11")));
    }

    #[test]
    fn test_symbol_list_rejects() {
        assert!(symbol_list(&[], 10).is_err());
        assert!(symbol_list(&symbols(&[" ", ""]), 10).is_err());
        assert!(symbol_list(&symbols(&["A", "B", "C"]), 2).is_err());
        assert!(matches!(
            symbol_list(&symbols(&["A", "A;B"]), 5),
            Err(RoicError::InvalidArgument(_))
        ));
    }

    #[derive(Debug)]
    struct Flaky;

    #[async_trait::async_trait]
    impl FundamentalsSource for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn company(&self, symbol: &str, _periods: u32) -> Result<CompanyFundamentals> {
            match symbol {
                "DOWN" => Err(RoicError::DataFetch("timeout".into())),
                "BAD" => Err(RoicError::invalid_argument("broken record")),
                _ => Err(RoicError::SymbolNotFound(symbol.into())),
            }
        }
    }

    fn acme() -> CompanyFundamentals {
        CompanyFundamentals {
            symbol: "ACME".into(),
            current_price: Some(100.0),
            pe_ratio: Some(20.0),
            annual: vec![AnnualFundamentals {
                operating_income: Some(300.0),
                total_assets: Some(1200.0),
                current_liabilities: Some(200.0),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_analyse_symbols_skips_unfetchable() {
        let source = InMemorySource::new().with_company(acme());
        let batch = QualityCalculator::default()
            .analyse_symbols(&source, &symbols(&["nope", "acme", "ACME"]), 5, 10)
            .await
            .unwrap();
        assert_eq!(batch.analyses.len(), 1);
        assert_eq!(batch.skipped, vec!["NOPE"]);
        assert_eq!(batch.comparison().best_overall.as_deref(), Some("ACME"));

        let batch = QualityCalculator::default()
            .analyse_symbols(&Flaky, &symbols(&["DOWN", "GONE"]), 5, 10)
            .await
            .unwrap();
        assert!(batch.analyses.is_empty());
        assert_eq!(batch.skipped, vec!["DOWN", "GONE"]);
        assert!(batch.comparison().best_overall.is_none());
    }

    #[tokio::test]
    async fn test_analyse_symbols_propagates_other_errors() {
        let calculator = QualityCalculator::default();
        let err = calculator
            .analyse_symbols(&Flaky, &symbols(&["DOWN", "BAD"]), 5, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, RoicError::InvalidArgument(msg) if msg == "broken record"));

        let err = calculator
            .analyse_symbols(&Flaky, &symbols(&["A;B"]), 5, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, RoicError::InvalidArgument(_)));
    }

    #[test]
    fn test_complete_analysis_without_data() {
        let analysis = QualityCalculator::default()
            .complete_analysis(&CompanyFundamentals::new("EMPTY"))
            .unwrap();
        assert!(analysis.assessment.roic.is_none());
        assert!(analysis.target_1y.is_none());
        assert!(analysis.combined_score.is_none());
    }
}
