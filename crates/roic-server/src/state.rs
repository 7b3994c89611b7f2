//! Shared state handed to every handler.

use roic_quality::QualityCalculator;
use roic_traits::{CompanyFundamentals, FundamentalsSource};
use std::{fmt, sync::Arc, time::Instant};

/// Annual periods fetched per symbol unless configured otherwise.
pub const DEFAULT_PERIODS: u32 = 5;

/// Shared application state.
///
/// Cheap to clone: the data source and the calculator are reference counted.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn FundamentalsSource>,
    calculator: Arc<QualityCalculator>,
    periods: u32,
    started: Instant,
}

impl AppState {
    /// Creates state around a data source and a calculator.
    pub fn new(source: Arc<dyn FundamentalsSource>, calculator: QualityCalculator) -> Self {
        Self {
            source,
            calculator: Arc::new(calculator),
            periods: DEFAULT_PERIODS,
            started: Instant::now(),
        }
    }

    /// Sets the number of annual periods fetched per symbol.
    #[must_use]
    pub fn with_periods(mut self, periods: u32) -> Self {
        self.periods = periods.max(1);
        self
    }

    /// The calculator.
    pub fn calculator(&self) -> &QualityCalculator {
        &self.calculator
    }

    /// The data source.
    pub fn source(&self) -> &dyn FundamentalsSource {
        self.source.as_ref()
    }

    /// Annual periods fetched per symbol.
    pub const fn periods(&self) -> u32 {
        self.periods
    }

    /// Name of the data source.
    pub fn provider(&self) -> &str {
        self.source.name()
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Fetches fundamentals for an upper-cased symbol.
    ///
    /// # Errors
    ///
    /// Propagates the data source's error.
    pub async fn company(&self, symbol: &str) -> roic_traits::Result<CompanyFundamentals> {
        self.source.company(&symbol.to_uppercase(), self.periods).await
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("source", &self.source.name())
            .field("periods", &self.periods)
            .finish_non_exhaustive()
    }
}
