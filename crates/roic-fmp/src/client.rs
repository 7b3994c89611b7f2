//! FMP API client implementation.

use crate::{
    Result,
    error::FmpError,
    types::{BalanceSheet, FundamentalData, IncomeStatement, Period, PriceTargetConsensus, Quote},
};
use reqwest::Client;
use std::env;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["ROIC_FMP_API_KEY", "FMP_API_KEY"];

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: FMP_BASE_URL.to_string(),
        }
    }

    /// Create a new FMP client from `ROIC_FMP_API_KEY` or `FMP_API_KEY`.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if neither environment variable is set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| env::var(name).ok().filter(|key| !key.trim().is_empty()))
            .ok_or(FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Point the client at another deployment of the API.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        let base = &self.base_url;
        if endpoint.contains('?') {
            format!("{base}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{base}/{endpoint}?apikey={}", self.api_key)
        }
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        tracing::debug!(endpoint, "FMP request");
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;

        // Error bodies come back with a 200 status
        if text.contains("\"Error Message\"") || text.contains("\"error\"") {
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Get income statements for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Stock ticker symbol (e.g., "AAPL")
    /// * `period` - Annual or quarterly
    /// * `limit` - Number of periods to return (most recent first)
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<IncomeStatement>> {
        let endpoint = statement_endpoint("income-statement", symbol, period, limit);
        self.get(&endpoint).await
    }

    /// Get balance sheets for a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn balance_sheet(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<BalanceSheet>> {
        let endpoint = statement_endpoint("balance-sheet-statement", symbol, period, limit);
        self.get(&endpoint).await
    }

    /// Get real-time quote for a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::SymbolNotFound`] if FMP returns no quote.
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        let endpoint = format!("quote?symbol={}", symbol.to_uppercase());
        let quotes: Vec<Quote> = self.get(&endpoint).await?;
        quotes
            .into_iter()
            .next()
            .ok_or_else(|| FmpError::SymbolNotFound(symbol.to_uppercase()))
    }

    /// Get the analyst price-target consensus for a symbol.
    ///
    /// Returns `None` when no analyst covers the symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn price_target_consensus(&self, symbol: &str) -> Result<Option<PriceTargetConsensus>> {
        let endpoint = format!("price-target-consensus?symbol={}", symbol.to_uppercase());
        let targets: Vec<PriceTargetConsensus> = self.get(&endpoint).await?;
        Ok(targets.into_iter().next())
    }

    /// Get the statements, quote and analyst consensus for a symbol.
    ///
    /// The four requests run concurrently. Only the analyst consensus is
    /// optional: a failed consensus request is logged and treated as absent,
    /// while statement and quote failures are returned so callers can tell a
    /// rate limit or outage from a company that has no filings.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::SymbolNotFound`] when FMP knows nothing about the
    /// symbol, or the first statement or quote request error.
    pub async fn fundamental_data(&self, symbol: &str, periods: u32) -> Result<FundamentalData> {
        let symbol = symbol.to_uppercase();
        let (income, balance, quote, target) = tokio::join!(
            self.income_statement(&symbol, Period::Annual, Some(periods)),
            self.balance_sheet(&symbol, Period::Annual, Some(periods)),
            self.quote(&symbol),
            self.price_target_consensus(&symbol),
        );

        let income_statements = income?;
        let balance_sheets = balance?;
        let quote = match quote {
            Ok(quote) => Some(quote),
            Err(FmpError::SymbolNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        let price_target = target.unwrap_or_else(|e| {
            tracing::warn!(%symbol, error = %e, "price target consensus unavailable");
            None
        });

        let data = FundamentalData {
            symbol,
            income_statements,
            balance_sheets,
            quote,
            price_target,
        };

        if data.is_empty() {
            return Err(FmpError::SymbolNotFound(data.symbol));
        }

        Ok(data)
    }
}

fn statement_endpoint(path: &str, symbol: &str, period: Period, limit: Option<u32>) -> String {
    let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
    format!(
        "{path}?symbol={}&period={}{limit_param}",
        symbol.to_uppercase(),
        period.as_str(),
    )
}
