//! Data-source abstraction for company fundamentals.
//!
//! The calculator never fetches anything itself. Outer surfaces (CLI, HTTP
//! service) obtain a [`CompanyFundamentals`] record through a
//! [`FundamentalsSource`] and hand the relevant figures to the calculator.

use crate::{CompanyFundamentals, Result, RoicError, Symbol};
use async_trait::async_trait;
use std::{collections::HashMap, fmt, path::Path};

/// A provider of per-symbol fundamentals and market context.
///
/// Implementations should return [`RoicError::SymbolNotFound`] for symbols
/// they have never heard of, and a record with absent fields when a symbol is
/// known but some figures are unavailable.
///
/// # Example
///
/// ```no_run
/// use roic_traits::{CompanyFundamentals, FundamentalsSource, Result};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct Fixed;
///
/// #[async_trait]
/// impl FundamentalsSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     async fn company(&self, symbol: &str, _periods: u32) -> Result<CompanyFundamentals> {
///         Ok(CompanyFundamentals::new(symbol.to_uppercase()))
///     }
/// }
/// ```
#[async_trait]
pub trait FundamentalsSource: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and responses.
    fn name(&self) -> &str;

    /// Fetches up to `periods` annual statements (most recent first) plus the
    /// current market context for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is unknown or retrieval fails.
    async fn company(&self, symbol: &str, periods: u32) -> Result<CompanyFundamentals>;
}

/// Symbol-keyed fixtures held in memory.
///
/// Useful for offline runs and tests. Symbols are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    companies: HashMap<Symbol, CompanyFundamentals>,
}

impl InMemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a company record.
    #[must_use]
    pub fn with_company(mut self, company: CompanyFundamentals) -> Self {
        self.insert(company);
        self
    }

    /// Adds or replaces a company record.
    pub fn insert(&mut self, mut company: CompanyFundamentals) {
        company.symbol = company.symbol.to_uppercase();
        self.companies.insert(company.symbol.clone(), company);
    }

    /// Parses a JSON array of company records.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let companies: Vec<CompanyFundamentals> = serde_json::from_str(json)?;
        Ok(companies
            .into_iter()
            .fold(Self::new(), |source, company| source.with_company(company)))
    }

    /// Loads a JSON array of company records from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Known symbols, sorted.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<_> = self.companies.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Number of companies held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Whether the source holds no companies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

#[async_trait]
impl FundamentalsSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn company(&self, symbol: &str, periods: u32) -> Result<CompanyFundamentals> {
        let key = symbol.to_uppercase();
        let mut company = self
            .companies
            .get(&key)
            .cloned()
            .ok_or(RoicError::SymbolNotFound(key))?;
        company.annual.truncate(periods as usize);
        tracing::debug!(
            symbol = %company.symbol,
            periods = company.annual.len(),
            "served fundamentals from memory"
        );
        Ok(company)
    }
}
